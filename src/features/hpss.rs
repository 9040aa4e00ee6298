//! Harmonic-percussive source separation (HPSS)
//!
//! Separates a magnitude spectrogram by median filtering:
//!
//! - Harmonic estimate `H`: median along time for each frequency bin
//!   (sustained partials are horizontal lines)
//! - Percussive estimate `P`: median along frequency for each frame
//!   (transients are vertical lines)
//!
//! The harmonic part is recovered with a soft mask
//! `M_H = H^p / (H^p + P^p)` with `p = 2`, applied to the input magnitudes.
//!
//! # Reference
//!
//! Fitzgerald, D. (2010). Harmonic/Percussive Separation using Median Filtering.
//! *Proceedings of the 13th International Conference on Digital Audio Effects (DAFx-10)*.

use crate::error::AnalysisError;

const EPSILON: f32 = 1e-10;

/// Mask exponent
const MASK_POWER: i32 = 2;

/// Harmonic and percussive magnitude spectrograms
#[derive(Debug, Clone)]
pub struct HpssOutput {
    /// Harmonic component, `n_frames × n_bins`
    pub harmonic: Vec<Vec<f32>>,

    /// Percussive component, `n_frames × n_bins`
    pub percussive: Vec<Vec<f32>>,
}

/// Decompose a magnitude spectrogram into harmonic and percussive parts
///
/// # Arguments
///
/// * `magnitude` - `n_frames × n_bins` magnitude spectrogram
/// * `kernel_size` - Median filter length in frames (harmonic) and bins (percussive)
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a zero kernel or ragged frames.
pub fn hpss(magnitude: &[Vec<f32>], kernel_size: usize) -> Result<HpssOutput, AnalysisError> {
    if kernel_size == 0 {
        return Err(AnalysisError::InvalidInput("HPSS kernel size must be > 0".to_string()));
    }
    if magnitude.is_empty() {
        return Ok(HpssOutput {
            harmonic: Vec::new(),
            percussive: Vec::new(),
        });
    }

    let n_frames = magnitude.len();
    let n_bins = magnitude[0].len();
    if magnitude.iter().any(|frame| frame.len() != n_bins) {
        return Err(AnalysisError::InvalidInput(
            "Inconsistent spectrogram frame lengths".to_string(),
        ));
    }

    log::debug!(
        "HPSS: {} frames × {} bins, kernel={}",
        n_frames,
        n_bins,
        kernel_size
    );

    // Harmonic: filter each bin across time
    let mut harmonic_filtered = vec![vec![0.0f32; n_bins]; n_frames];
    let mut column = vec![0.0f32; n_frames];
    for bin in 0..n_bins {
        for (t, frame) in magnitude.iter().enumerate() {
            column[t] = frame[bin];
        }
        let filtered = median_filter(&column, kernel_size);
        for (t, value) in filtered.into_iter().enumerate() {
            harmonic_filtered[t][bin] = value;
        }
    }

    // Percussive: filter each frame across frequency
    let percussive_filtered: Vec<Vec<f32>> = magnitude
        .iter()
        .map(|frame| median_filter(frame, kernel_size))
        .collect();

    let mut harmonic = vec![vec![0.0f32; n_bins]; n_frames];
    let mut percussive = vec![vec![0.0f32; n_bins]; n_frames];
    for t in 0..n_frames {
        for k in 0..n_bins {
            let mask_h = soft_mask(harmonic_filtered[t][k], percussive_filtered[t][k]);
            harmonic[t][k] = magnitude[t][k] * mask_h;
            percussive[t][k] = magnitude[t][k] * (1.0 - mask_h);
        }
    }

    Ok(HpssOutput {
        harmonic,
        percussive,
    })
}

/// Soft mask `x^p / (x^p + y^p)`; 0 when both are negligible
fn soft_mask(x: f32, y: f32) -> f32 {
    let xp = x.powi(MASK_POWER);
    let yp = y.powi(MASK_POWER);
    let total = xp + yp;
    if total <= EPSILON {
        0.0
    } else {
        xp / total
    }
}

/// Sliding median with symmetric (half-sample) reflection at the edges
///
/// Even kernel lengths take the upper median.
fn median_filter(values: &[f32], kernel_size: usize) -> Vec<f32> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let half = (kernel_size / 2) as isize;
    let mut window = Vec::with_capacity(kernel_size);
    let mut out = Vec::with_capacity(n);

    for i in 0..n as isize {
        window.clear();
        for offset in -half..(kernel_size as isize - half) {
            window.push(values[reflect_index(i + offset, n)]);
        }
        let mid = window.len() / 2;
        let (_, median, _) = window.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
        out.push(*median);
    }

    out
}

/// Map an out-of-range index back into `0..n` by mirroring (`d c b a | a b c d | d c b a`)
fn reflect_index(index: isize, n: usize) -> usize {
    let n = n as isize;
    let period = 2 * n;
    let mut i = index.rem_euclid(period);
    if i >= n {
        i = period - 1 - i;
    }
    i as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_index() {
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-2, 4), 1);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(5, 4), 2);
        assert_eq!(reflect_index(2, 4), 2);
        assert_eq!(reflect_index(-1, 1), 0);
        assert_eq!(reflect_index(3, 1), 0);
    }

    #[test]
    fn test_median_filter_removes_spike() {
        let values = vec![1.0, 1.0, 9.0, 1.0, 1.0];
        assert_eq!(median_filter(&values, 3), vec![1.0; 5]);
    }

    #[test]
    fn test_median_filter_preserves_step() {
        let values = vec![0.0, 0.0, 0.0, 5.0, 5.0, 5.0];
        assert_eq!(median_filter(&values, 3), values);
    }

    #[test]
    fn test_hpss_separates_line_from_click() {
        // Sustained partial at bin 4, broadband click at frame 10
        let n_frames = 21;
        let n_bins = 16;
        let mut spec = vec![vec![0.0f32; n_bins]; n_frames];
        for frame in spec.iter_mut() {
            frame[4] = 1.0;
        }
        for value in spec[10].iter_mut() {
            *value += 1.0;
        }

        let out = hpss(&spec, 5).unwrap();

        assert!(out.harmonic[3][4] > 0.99, "partial should stay harmonic");
        assert!(out.harmonic[10][12] < 0.01, "click should not leak into harmonic");
        assert!(out.percussive[10][12] > 0.99);
    }

    #[test]
    fn test_hpss_silence_is_zero() {
        let spec = vec![vec![0.0f32; 8]; 6];
        let out = hpss(&spec, 31).unwrap();
        assert!(out.harmonic.iter().flatten().all(|&v| v == 0.0));
        assert!(out.percussive.iter().flatten().all(|&v| v == 0.0));
    }

    #[test]
    fn test_hpss_invalid() {
        assert!(hpss(&[vec![1.0]], 0).is_err());
        assert!(hpss(&[vec![1.0, 2.0], vec![1.0]], 3).is_err());
        assert!(hpss(&[], 3).unwrap().harmonic.is_empty());
    }
}
