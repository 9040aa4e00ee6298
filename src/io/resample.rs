//! Sample-rate conversion using rubato
//!
//! Every feature threshold downstream assumes the analysis rate from
//! [`crate::AnalysisConfig::target_sample_rate`], so decoded audio is brought
//! to that rate before any framing happens.

use rubato::{FastFixedIn, PolynomialDegree, Resampler};

use crate::error::AnalysisError;

/// Resample a mono signal from `input_rate` to `output_rate`
///
/// Returns a copy when the rates already match.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a zero rate and
/// `AnalysisError::ProcessingError` if rubato rejects the conversion.
pub fn resample_mono(
    samples: &[f32],
    input_rate: u32,
    output_rate: u32,
) -> Result<Vec<f32>, AnalysisError> {
    if input_rate == 0 || output_rate == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid sample rates: {} -> {}",
            input_rate, output_rate
        )));
    }

    if input_rate == output_rate || samples.is_empty() {
        log::debug!("Sample rate already at {} Hz, skipping resample", output_rate);
        return Ok(samples.to_vec());
    }

    log::debug!(
        "Resampling {} samples from {} Hz to {} Hz",
        samples.len(),
        input_rate,
        output_rate
    );

    let ratio = output_rate as f64 / input_rate as f64;
    let mut resampler = FastFixedIn::<f32>::new(
        ratio,
        1.0, // fixed ratio
        PolynomialDegree::Septic,
        samples.len(),
        1,
    )
    .map_err(|e| AnalysisError::ProcessingError(format!("Failed to create resampler: {}", e)))?;

    let input = vec![samples.to_vec()];
    let mut output = resampler
        .process(&input, None)
        .map_err(|e| AnalysisError::ProcessingError(format!("Resampling failed: {}", e)))?;

    let resampled = output.pop().unwrap_or_default();

    log::debug!(
        "Resampled {} input samples to {} output samples",
        samples.len(),
        resampled.len()
    );

    Ok(resampled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resample_identity() {
        let samples = vec![0.1f32, -0.2, 0.3];
        let out = resample_mono(&samples, 22050, 22050).unwrap();
        assert_eq!(out, samples);
    }

    #[test]
    fn test_resample_invalid_rate() {
        assert!(resample_mono(&[0.0; 10], 0, 22050).is_err());
        assert!(resample_mono(&[0.0; 10], 44100, 0).is_err());
    }

    #[test]
    fn test_resample_halves_length() {
        let samples: Vec<f32> = (0..44100)
            .map(|i| (i as f32 * 220.0 * 2.0 * std::f32::consts::PI / 44100.0).sin() * 0.5)
            .collect();
        let out = resample_mono(&samples, 44100, 22050).unwrap();
        let expected = samples.len() / 2;
        assert!(
            (out.len() as i64 - expected as i64).abs() < 64,
            "expected ~{} samples, got {}",
            expected,
            out.len()
        );
        let peak = out.iter().fold(0.0f32, |m, &x| m.max(x.abs()));
        assert!(peak > 0.3 && peak < 0.7, "amplitude should survive resampling, peak={}", peak);
    }
}
