//! Chroma vector extraction
//!
//! Maps each FFT bin onto the 12 pitch classes with a soft (gaussian)
//! assignment around its fractional pitch, so energy between two semitones is
//! shared instead of snapped. Pitch class 0 is C; the reference frequency
//! (A4 = 440 Hz by default) sits at class 9.

use crate::error::AnalysisError;
use crate::features::spectrum::{apply_filterbank, fft_frequencies};

/// Number of pitch classes
pub const N_CHROMA: usize = 12;

/// Bins below this frequency carry no usable pitch information
const MIN_PITCH_HZ: f32 = 20.0;

const EPSILON: f32 = 1e-10;

/// Build a `12 × n_bins` soft pitch-class filterbank
///
/// # Arguments
///
/// * `sample_rate` - Sample rate in Hz
/// * `frame_size` - FFT size the spectrogram was computed with
/// * `center_frequency` - Frequency of pitch class 9 (A) in Hz
/// * `sigma` - Spread of the assignment in semitones
///
/// # Returns
///
/// Filterbank rows per pitch class; each usable bin's weights sum to 1.
pub fn chroma_filterbank(
    sample_rate: u32,
    frame_size: usize,
    center_frequency: f32,
    sigma: f32,
) -> Vec<Vec<f32>> {
    let freqs = fft_frequencies(sample_rate, frame_size);
    let sigma = sigma.max(EPSILON);
    let mut weights = vec![vec![0.0f32; freqs.len()]; N_CHROMA];

    for (k, &freq) in freqs.iter().enumerate() {
        if freq < MIN_PITCH_HZ {
            continue;
        }
        let pitch = 12.0 * (freq / center_frequency).log2() + 9.0;

        let mut column = [0.0f32; N_CHROMA];
        for (class, slot) in column.iter_mut().enumerate() {
            // Circular distance in semitones, in [-6, 6)
            let d = (pitch - class as f32 + 6.0).rem_euclid(12.0) - 6.0;
            *slot = (-0.5 * (d / sigma).powi(2)).exp();
        }

        let total: f32 = column.iter().sum();
        if total > EPSILON {
            for (class, &w) in column.iter().enumerate() {
                weights[class][k] = w / total;
            }
        }
    }

    weights
}

/// Extract chroma vectors from a power spectrogram
///
/// # Arguments
///
/// * `power` - `n_frames × (frame_size / 2 + 1)` power spectrogram
/// * `sample_rate` - Sample rate in Hz
/// * `frame_size` - FFT frame size
/// * `center_frequency` - Reference frequency for pitch class A
/// * `sigma` - Soft mapping spread in semitones
///
/// # Returns
///
/// One 12-element chroma vector per frame, L1-normalised (all zeros for
/// silent frames)
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the spectrogram does not match `frame_size`.
pub fn extract_chroma(
    power: &[Vec<f32>],
    sample_rate: u32,
    frame_size: usize,
    center_frequency: f32,
    sigma: f32,
) -> Result<Vec<Vec<f32>>, AnalysisError> {
    let n_bins = frame_size / 2 + 1;
    if let Some(frame) = power.iter().find(|f| f.len() != n_bins) {
        return Err(AnalysisError::InvalidInput(format!(
            "Spectrogram has {} bins, expected {} for frame size {}",
            frame.len(),
            n_bins,
            frame_size
        )));
    }
    if center_frequency <= 0.0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid chroma reference frequency: {}",
            center_frequency
        )));
    }

    log::debug!(
        "Extracting chroma: {} frames at {} Hz, ref={:.1} Hz",
        power.len(),
        sample_rate,
        center_frequency
    );

    let filterbank = chroma_filterbank(sample_rate, frame_size, center_frequency, sigma);
    let mut chroma = apply_filterbank(power, &filterbank);

    for frame in chroma.iter_mut() {
        let sum: f32 = frame.iter().sum();
        if sum > EPSILON {
            frame.iter_mut().for_each(|x| *x /= sum);
        } else {
            frame.iter_mut().for_each(|x| *x = 0.0);
        }
    }

    Ok(chroma)
}
