//! Autocorrelation-based tempo estimation
//!
//! Finds periodicity in the onset-strength envelope using FFT-accelerated
//! autocorrelation, then picks the lag that maximises
//!
//! `ln(1 + 1e6 * strength(lag)) + log_prior(bpm(lag))`
//!
//! `strength` is the ACF mass in a three-lag window around `lag`, normalised
//! by the same window at lag 0, so a beat period that falls between two
//! frames is not split in half. The prior is log-normal around `prior_bpm`
//! (one octave wide by default) and resolves the octave ambiguity that a
//! click train's autocorrelation cannot resolve on its own.
//!
//! # Reference
//!
//! Ellis, D. P. W. (2007). Beat Tracking by Dynamic Programming.
//! *Journal of New Music Research*, 36(1), 51-60.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use super::TempoEstimate;
use crate::error::AnalysisError;

const EPSILON: f32 = 1e-10;

/// Tempo search parameters
#[derive(Debug, Clone, Copy)]
pub struct TempoSearch {
    /// Minimum BPM to consider
    pub min_bpm: f32,
    /// Maximum BPM to consider
    pub max_bpm: f32,
    /// Centre of the log-normal prior
    pub prior_bpm: f32,
    /// Prior width in octaves
    pub prior_std_octaves: f32,
}

/// Estimate tempo from an onset-strength envelope
///
/// # Arguments
///
/// * `novelty` - Onset-strength envelope, one value per STFT frame
/// * `sample_rate` - Sample rate in Hz
/// * `hop_size` - Hop size of the STFT the envelope came from
/// * `search` - BPM range and prior
///
/// # Returns
///
/// Best estimate; `bpm == 0.0` when the envelope carries no periodicity
/// (silence, too short for the lag range).
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for zero rates or an invalid BPM range.
pub fn estimate_tempo_from_novelty(
    novelty: &[f32],
    sample_rate: u32,
    hop_size: usize,
    search: TempoSearch,
) -> Result<TempoEstimate, AnalysisError> {
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput("Invalid sample rate: 0".to_string()));
    }
    if hop_size == 0 {
        return Err(AnalysisError::InvalidInput("Invalid hop size: 0".to_string()));
    }
    if search.min_bpm <= 0.0 || search.max_bpm <= search.min_bpm {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid BPM range: [{:.1}, {:.1}]",
            search.min_bpm, search.max_bpm
        )));
    }

    log::debug!(
        "Estimating tempo: {} novelty frames, {} Hz, hop={}, range=[{:.1}, {:.1}] BPM",
        novelty.len(),
        sample_rate,
        hop_size,
        search.min_bpm,
        search.max_bpm
    );

    let frames_per_minute = 60.0 * sample_rate as f32 / hop_size as f32;

    let acf = compute_autocorrelation_fft(novelty);
    if acf.is_empty() || acf[0] <= EPSILON {
        log::debug!("Onset envelope has no energy, tempo undetermined");
        return Ok(TempoEstimate::undetermined());
    }

    let lag_min = (frames_per_minute / search.max_bpm).ceil().max(1.0) as usize;
    let lag_max = ((frames_per_minute / search.min_bpm).floor() as usize).min(acf.len() - 1);

    if lag_min >= lag_max {
        log::warn!(
            "Onset envelope too short for tempo range: lags [{}, {}], ACF length {}",
            lag_min,
            lag_max,
            acf.len()
        );
        return Ok(TempoEstimate::undetermined());
    }

    let norm = window_mass(&acf, 0);
    let prior_std = search.prior_std_octaves.max(EPSILON);
    let log_prior_centre = search.prior_bpm.max(EPSILON).log2();

    let mut best: Option<(usize, f32)> = None;
    for lag in lag_min..=lag_max {
        let strength = window_mass(&acf, lag) / norm;
        let bpm = frames_per_minute / lag as f32;
        let z = (bpm.log2() - log_prior_centre) / prior_std;
        let score = (1.0 + 1e6 * strength).ln() - 0.5 * z * z;
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((lag, score));
        }
    }

    let Some((lag, _)) = best else {
        return Ok(TempoEstimate::undetermined());
    };

    let refined_lag = refine_lag(&acf, local_peak(&acf, lag));
    let bpm = frames_per_minute / refined_lag;
    let confidence = (window_mass(&acf, lag) / norm).clamp(0.0, 1.0);

    log::debug!(
        "Tempo estimate: lag={} (refined {:.2}), {:.2} BPM, confidence={:.3}",
        lag,
        refined_lag,
        bpm,
        confidence
    );

    Ok(TempoEstimate { bpm, confidence })
}

/// ACF mass over `lag - 1 ..= lag + 1` (mirrored at lag 0)
fn window_mass(acf: &[f32], lag: usize) -> f32 {
    let centre = acf[lag];
    let right = acf.get(lag + 1).copied().unwrap_or(0.0);
    let left = if lag == 0 { right } else { acf[lag - 1] };
    left + centre + right
}

/// Highest ACF value among `lag - 1 ..= lag + 1`
fn local_peak(acf: &[f32], lag: usize) -> usize {
    let start = lag.saturating_sub(1).max(1);
    let end = (lag + 1).min(acf.len() - 1);
    (start..=end)
        .max_by(|&a, &b| acf[a].partial_cmp(&acf[b]).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or(lag)
}

/// Parabolic interpolation of an ACF peak for sub-frame lag precision
fn refine_lag(acf: &[f32], lag: usize) -> f32 {
    if lag == 0 || lag + 1 >= acf.len() {
        return lag as f32;
    }
    let (a, b, c) = (acf[lag - 1], acf[lag], acf[lag + 1]);
    let denom = a - 2.0 * b + c;
    if denom.abs() <= EPSILON {
        return lag as f32;
    }
    let delta = (0.5 * (a - c) / denom).clamp(-0.5, 0.5);
    lag as f32 + delta
}

/// Compute autocorrelation of a mean-removed signal using FFT acceleration
///
/// Uses the identity: ACF = IFFT(|FFT(signal)|²)
///
/// # Returns
///
/// Autocorrelation function (same length as input), negative lobes clipped to 0
fn compute_autocorrelation_fft(signal: &[f32]) -> Vec<f32> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    let mean = signal.iter().sum::<f32>() / n as f32;

    // FFT size: next power of 2 >= 2*n (for zero-padding)
    let fft_size = (2 * n).next_power_of_two();

    let mut fft_input: Vec<Complex<f32>> =
        signal.iter().map(|&x| Complex::new(x - mean, 0.0)).collect();
    fft_input.resize(fft_size, Complex::new(0.0, 0.0));

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut fft_input);

    for x in &mut fft_input {
        *x = *x * x.conj();
    }

    let ifft = planner.plan_fft_inverse(fft_size);
    ifft.process(&mut fft_input);

    let scale = 1.0 / (fft_size as f32);
    fft_input[..n]
        .iter()
        .map(|x| (x.re * scale).max(0.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH: TempoSearch = TempoSearch {
        min_bpm: 30.0,
        max_bpm: 320.0,
        prior_bpm: 120.0,
        prior_std_octaves: 1.0,
    };

    /// Impulse envelope with one onset every `period` frames
    fn pulse_envelope(n_frames: usize, period: f32) -> Vec<f32> {
        let mut env = vec![0.0f32; n_frames];
        let mut t = 0.0f32;
        while (t as usize) < n_frames {
            env[t as usize] = 1.0;
            t += period;
        }
        env
    }

    #[test]
    fn test_tempo_from_pulse_120bpm() {
        // 120 BPM at 22050 Hz / 512 hop: 21.53 frames per beat
        let frames_per_beat = 60.0 / 120.0 * 22050.0 / 512.0;
        let env = pulse_envelope(1300, frames_per_beat);
        let est = estimate_tempo_from_novelty(&env, 22050, 512, SEARCH).unwrap();
        assert!((est.bpm - 120.0).abs() < 4.0, "expected ~120 BPM, got {:.2}", est.bpm);
        assert!(est.confidence > 0.0);
    }

    #[test]
    fn test_tempo_from_pulse_90bpm() {
        let frames_per_beat = 60.0 / 90.0 * 22050.0 / 512.0;
        let env = pulse_envelope(1300, frames_per_beat);
        let est = estimate_tempo_from_novelty(&env, 22050, 512, SEARCH).unwrap();
        assert!((est.bpm - 90.0).abs() < 4.0, "expected ~90 BPM, got {:.2}", est.bpm);
    }

    #[test]
    fn test_tempo_silent_envelope() {
        let env = vec![0.0f32; 500];
        let est = estimate_tempo_from_novelty(&env, 22050, 512, SEARCH).unwrap();
        assert_eq!(est.bpm, 0.0);
    }

    #[test]
    fn test_tempo_envelope_too_short() {
        let env = vec![1.0f32, 0.0, 1.0, 0.0];
        let est = estimate_tempo_from_novelty(&env, 22050, 512, SEARCH).unwrap();
        assert_eq!(est.bpm, 0.0);
    }

    #[test]
    fn test_tempo_invalid_params() {
        let env = vec![0.0f32; 100];
        assert!(estimate_tempo_from_novelty(&env, 0, 512, SEARCH).is_err());
        assert!(estimate_tempo_from_novelty(&env, 22050, 0, SEARCH).is_err());
        let bad = TempoSearch {
            min_bpm: 200.0,
            max_bpm: 100.0,
            ..SEARCH
        };
        assert!(estimate_tempo_from_novelty(&env, 22050, 512, bad).is_err());
    }

    #[test]
    fn test_compute_autocorrelation_fft() {
        let signal = vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        let acf = compute_autocorrelation_fft(&signal);
        assert_eq!(acf.len(), signal.len());
        assert!(acf[2] > acf[1], "period-2 signal should peak at lag 2");
        assert!(acf[0] >= acf[2]);
    }

    #[test]
    fn test_window_mass_mirrors_at_zero() {
        let acf = vec![4.0, 1.0, 0.5];
        assert!((window_mass(&acf, 0) - 6.0).abs() < 1e-6);
        assert!((window_mass(&acf, 1) - 5.5).abs() < 1e-6);
        assert!((window_mass(&acf, 2) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_local_peak() {
        let acf = vec![5.0, 0.0, 1.0, 3.0, 2.0];
        assert_eq!(local_peak(&acf, 2), 3);
        assert_eq!(local_peak(&acf, 4), 3);
        assert_eq!(local_peak(&acf, 1), 2);
    }

    #[test]
    fn test_refine_lag_symmetric_split() {
        let acf = vec![1.0, 0.0, 0.5, 0.5, 0.0];
        let refined = refine_lag(&acf, 2);
        assert!((refined - 2.5).abs() < 1e-4);
    }
}
