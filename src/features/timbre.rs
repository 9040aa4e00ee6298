//! Mel-frequency cepstral coefficients (MFCC)
//!
//! Timbral texture is summarised by the cepstrum of the log-power mel
//! spectrogram: an orthonormal DCT-II over the mel bands, keeping the first
//! `n_mfcc` coefficients. Coefficient 0 tracks overall loudness, higher ones
//! the spectral envelope shape.

use crate::error::AnalysisError;
use crate::features::spectrum::{mean, std_dev};

/// Orthonormal DCT-II basis, `n_out × n_in`
fn dct_basis(n_in: usize, n_out: usize) -> Vec<Vec<f32>> {
    let n = n_in as f32;
    (0..n_out)
        .map(|k| {
            let scale = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
            (0..n_in)
                .map(|i| {
                    scale * (std::f32::consts::PI * k as f32 * (2.0 * i as f32 + 1.0) / (2.0 * n)).cos()
                })
                .collect()
        })
        .collect()
}

/// Compute MFCCs from a log-power (dB) mel spectrogram
///
/// # Arguments
///
/// * `mel_db_frames` - `n_frames × n_mels` values in dB
/// * `n_mfcc` - Number of coefficients to keep (at most `n_mels`)
///
/// # Returns
///
/// `n_frames × n_mfcc` coefficients
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `n_mfcc` is 0 or exceeds the band count.
pub fn mfcc(mel_db_frames: &[Vec<f32>], n_mfcc: usize) -> Result<Vec<Vec<f32>>, AnalysisError> {
    let Some(first) = mel_db_frames.first() else {
        return Ok(Vec::new());
    };
    let n_mels = first.len();
    if n_mfcc == 0 || n_mfcc > n_mels {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid MFCC count {} for {} mel bands",
            n_mfcc, n_mels
        )));
    }

    let basis = dct_basis(n_mels, n_mfcc);
    mel_db_frames
        .iter()
        .map(|frame| {
            if frame.len() != n_mels {
                return Err(AnalysisError::InvalidInput(format!(
                    "Mel frame has {} bands, expected {}",
                    frame.len(),
                    n_mels
                )));
            }
            Ok(basis
                .iter()
                .map(|row| row.iter().zip(frame).map(|(b, x)| b * x).sum())
                .collect())
        })
        .collect()
}

/// Per-coefficient mean and population standard deviation over frames
///
/// Empty input gives two empty vectors.
pub fn timbral_statistics(coefficients: &[Vec<f32>]) -> (Vec<f32>, Vec<f32>) {
    let n = coefficients.first().map_or(0, |f| f.len());
    let mut means = Vec::with_capacity(n);
    let mut stds = Vec::with_capacity(n);
    let mut column = Vec::with_capacity(coefficients.len());

    for c in 0..n {
        column.clear();
        column.extend(coefficients.iter().filter_map(|frame| frame.get(c)));
        means.push(mean(&column));
        stds.push(std_dev(&column));
    }

    (means, stds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dct_basis_orthonormal() {
        let basis = dct_basis(16, 16);
        for a in 0..16 {
            for b in 0..16 {
                let dot: f32 = basis[a].iter().zip(&basis[b]).map(|(x, y)| x * y).sum();
                let expected = if a == b { 1.0 } else { 0.0 };
                assert!((dot - expected).abs() < 1e-4, "<{}, {}> = {}", a, b, dot);
            }
        }
    }

    #[test]
    fn test_mfcc_constant_frame() {
        // Flat log spectrum puts all energy in coefficient 0
        let frames = vec![vec![-20.0f32; 128]; 3];
        let coeffs = mfcc(&frames, 20).unwrap();
        assert_eq!(coeffs.len(), 3);
        assert_eq!(coeffs[0].len(), 20);
        assert!((coeffs[0][0] - (-20.0 * 128f32.sqrt())).abs() < 1e-2);
        assert!(coeffs[0][1..].iter().all(|c| c.abs() < 1e-3));
    }

    #[test]
    fn test_mfcc_invalid() {
        let frames = vec![vec![0.0f32; 8]];
        assert!(mfcc(&frames, 0).is_err());
        assert!(mfcc(&frames, 9).is_err());
        assert!(mfcc(&[vec![0.0; 8], vec![0.0; 4]], 4).is_err());
        assert!(mfcc(&[], 20).unwrap().is_empty());
    }

    #[test]
    fn test_timbral_statistics() {
        let coeffs = vec![vec![1.0, 10.0], vec![3.0, 10.0]];
        let (means, stds) = timbral_statistics(&coeffs);
        assert_eq!(means, vec![2.0, 10.0]);
        assert_eq!(stds, vec![1.0, 0.0]);
        let (m, s) = timbral_statistics(&[]);
        assert!(m.is_empty() && s.is_empty());
    }
}
