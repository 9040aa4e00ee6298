//! Octave-band spectral contrast
//!
//! For each octave band, contrast is the level difference between the
//! spectral peaks and valleys in that band:
//!
//! `contrast = dB(mean(top q% of band)) - dB(mean(bottom q% of band))`
//!
//! Band edges are `[0, fmin, 2·fmin, .., 2^n_bands·fmin]`; the top band is
//! extended up to Nyquist. High contrast means clear harmonic peaks over a
//! quiet floor, low contrast means noise-like spectra.
//!
//! # Reference
//!
//! Jiang, D. N., Lu, L., Zhang, H. J., Tao, J. H., & Cai, L. H. (2002).
//! Music Type Classification by Spectral Contrast Feature.
//! *Proceedings of the IEEE International Conference on Multimedia and Expo*, 113-116.

use crate::error::AnalysisError;
use crate::features::spectrum::{fft_frequencies, mean, power_to_db, std_dev};

/// Spectral contrast parameters
#[derive(Debug, Clone, Copy)]
pub struct ContrastParams {
    /// Number of octave bands above `fmin` (yields `n_bands + 1` rows)
    pub n_bands: usize,
    /// Upper edge of the lowest band in Hz
    pub fmin: f32,
    /// Fraction of each band averaged for peak and valley
    pub quantile: f32,
}

/// Compute spectral contrast from a magnitude spectrogram
///
/// # Arguments
///
/// * `magnitude` - `n_frames × (frame_size / 2 + 1)` magnitudes
/// * `sample_rate` - Sample rate in Hz
/// * `frame_size` - FFT frame size
/// * `params` - Band layout and quantile
///
/// # Returns
///
/// `(n_bands + 1) × n_frames` contrast values in dB
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for invalid parameters or if a band
/// edge lies above Nyquist.
pub fn spectral_contrast(
    magnitude: &[Vec<f32>],
    sample_rate: u32,
    frame_size: usize,
    params: ContrastParams,
) -> Result<Vec<Vec<f32>>, AnalysisError> {
    if params.fmin <= 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Contrast fmin must be positive, got {}",
            params.fmin
        )));
    }
    if params.n_bands == 0 {
        return Err(AnalysisError::InvalidInput("Contrast needs at least one band".to_string()));
    }
    if !(params.quantile > 0.0 && params.quantile < 1.0) {
        return Err(AnalysisError::InvalidInput(format!(
            "Contrast quantile must be in (0, 1), got {}",
            params.quantile
        )));
    }

    let nyquist = sample_rate as f32 / 2.0;
    let mut edges = vec![0.0f32];
    edges.extend((0..=params.n_bands).map(|i| params.fmin * 2f32.powi(i as i32)));
    if edges[..edges.len() - 1].iter().any(|&f| f >= nyquist) {
        return Err(AnalysisError::InvalidInput(format!(
            "Contrast band edge exceeds Nyquist ({} Hz): reduce fmin or n_bands",
            nyquist
        )));
    }

    let freqs = fft_frequencies(sample_rate, frame_size);
    if let Some(frame) = magnitude.iter().find(|f| f.len() != freqs.len()) {
        return Err(AnalysisError::InvalidInput(format!(
            "Spectrogram has {} bins, expected {}",
            frame.len(),
            freqs.len()
        )));
    }

    let n_frames = magnitude.len();
    let n_rows = params.n_bands + 1;
    let mut peaks = vec![vec![0.0f32; n_frames]; n_rows];
    let mut valleys = vec![vec![0.0f32; n_frames]; n_rows];

    let mut sorted = Vec::new();
    for (k, pair) in edges.windows(2).enumerate() {
        let (bins, alpha) = band_bins(&freqs, pair[0], pair[1], k, params);
        if bins.is_empty() {
            log::warn!("Contrast band {} ({:.0}-{:.0} Hz) has no bins", k, pair[0], pair[1]);
            continue;
        }
        let alpha = alpha.min(bins.len());

        for (t, frame) in magnitude.iter().enumerate() {
            sorted.clear();
            sorted.extend(bins.iter().map(|&b| frame[b]));
            sorted.sort_unstable_by(|a, b| a.total_cmp(b));
            valleys[k][t] = mean(&sorted[..alpha]);
            peaks[k][t] = mean(&sorted[sorted.len() - alpha..]);
        }
    }

    power_to_db(&mut peaks);
    power_to_db(&mut valleys);

    let contrast: Vec<Vec<f32>> = peaks
        .iter()
        .zip(&valleys)
        .map(|(p, v)| p.iter().zip(v).map(|(p, v)| p - v).collect())
        .collect();

    log::debug!("Spectral contrast: {} bands × {} frames", n_rows, n_frames);

    Ok(contrast)
}

/// Bins belonging to band `k` and the number of values averaged for peak/valley
///
/// A band includes the bin just below its lower edge (except the first band);
/// the top band runs to Nyquist. Every band but the top one then drops its
/// highest bin.
fn band_bins(
    freqs: &[f32],
    low: f32,
    high: f32,
    k: usize,
    params: ContrastParams,
) -> (Vec<usize>, usize) {
    let mut in_band: Vec<bool> = freqs.iter().map(|&f| f >= low && f <= high).collect();
    let first = in_band.iter().position(|&b| b);
    let last = in_band.iter().rposition(|&b| b);

    if let (Some(first), Some(last)) = (first, last) {
        if k > 0 && first > 0 {
            in_band[first - 1] = true;
        }
        if k == params.n_bands {
            in_band[last + 1..].iter_mut().for_each(|b| *b = true);
        }
    }

    let count = in_band.iter().filter(|&&b| b).count();
    let mut bins: Vec<usize> = (0..freqs.len()).filter(|&i| in_band[i]).collect();
    if k < params.n_bands {
        bins.pop();
    }

    let alpha = (params.quantile * count as f32).round().max(1.0) as usize;
    (bins, alpha)
}

/// Mean and population standard deviation over every band/frame cell
pub fn contrast_statistics(contrast: &[Vec<f32>]) -> (f32, f32) {
    let cells: Vec<f32> = contrast.iter().flatten().copied().collect();
    (mean(&cells), std_dev(&cells))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::spectrum::compute_stft;

    const PARAMS: ContrastParams = ContrastParams {
        n_bands: 6,
        fmin: 200.0,
        quantile: 0.02,
    };

    #[test]
    fn test_contrast_shape() {
        let magnitude = vec![vec![1.0f32; 1025]; 5];
        let contrast = spectral_contrast(&magnitude, 22050, 2048, PARAMS).unwrap();
        assert_eq!(contrast.len(), 7);
        assert!(contrast.iter().all(|row| row.len() == 5));
        // Flat spectrum has no contrast
        assert!(contrast.iter().flatten().all(|v| v.abs() < 1e-4));
    }

    #[test]
    fn test_tone_has_more_contrast_than_flat() {
        let sr = 22050;
        let tone: Vec<f32> = (0..22050)
            .map(|i| (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / sr as f32).sin())
            .collect();
        let magnitude = compute_stft(&tone, 2048, 512).unwrap();
        let contrast = spectral_contrast(&magnitude, sr, 2048, PARAMS).unwrap();
        let (tone_mean, _) = contrast_statistics(&contrast);

        let flat = vec![vec![1.0f32; 1025]; magnitude.len()];
        let (flat_mean, flat_std) =
            contrast_statistics(&spectral_contrast(&flat, sr, 2048, PARAMS).unwrap());

        assert!(tone_mean > flat_mean);
        assert!(flat_std.abs() < 1e-4);
    }

    #[test]
    fn test_band_bins_edges() {
        let freqs = fft_frequencies(22050, 2048);
        // First band starts at DC and drops its top bin
        let (bins, alpha) = band_bins(&freqs, 0.0, 200.0, 0, PARAMS);
        assert_eq!(bins.first(), Some(&0));
        assert!(freqs[*bins.last().unwrap()] <= 200.0);
        assert_eq!(alpha, 1);

        // Top band runs to Nyquist
        let (bins, _) = band_bins(&freqs, 6400.0, 12800.0, 6, PARAMS);
        assert_eq!(bins.last(), Some(&1024));
    }

    #[test]
    fn test_contrast_invalid_params() {
        let magnitude = vec![vec![1.0f32; 1025]];
        let bad_fmin = ContrastParams { fmin: 0.0, ..PARAMS };
        assert!(spectral_contrast(&magnitude, 22050, 2048, bad_fmin).is_err());
        let bad_q = ContrastParams { quantile: 1.5, ..PARAMS };
        assert!(spectral_contrast(&magnitude, 22050, 2048, bad_q).is_err());
        let too_high = ContrastParams { n_bands: 8, ..PARAMS };
        assert!(spectral_contrast(&magnitude, 22050, 2048, too_high).is_err());
    }

    #[test]
    fn test_contrast_statistics_empty() {
        assert_eq!(contrast_statistics(&[]), (0.0, 0.0));
    }
}
