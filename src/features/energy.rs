//! Frame-wise RMS energy
//!
//! Frames are centered like the STFT frames (zero padding of `frame_size / 2`
//! on both sides), so the energy curve lines up with the spectral features.

use crate::error::AnalysisError;
use crate::features::spectrum::mean;

/// Root-mean-square energy per frame
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `frame_size` - Frame length in samples (default: 2048)
/// * `hop_size` - Hop between frames (default: 512)
///
/// # Returns
///
/// `1 + len / hop_size` RMS values
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for empty input or zero sizes.
pub fn rms_frames(
    samples: &[f32],
    frame_size: usize,
    hop_size: usize,
) -> Result<Vec<f32>, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::InvalidInput("Empty audio samples".to_string()));
    }
    if frame_size == 0 || hop_size == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid RMS parameters: frame={}, hop={}",
            frame_size, hop_size
        )));
    }

    let pad = frame_size / 2;
    let n_frames = 1 + samples.len() / hop_size;

    let rms = (0..n_frames)
        .map(|i| {
            // Frame covers padded[i*hop .. i*hop + frame_size], i.e. samples offset by -pad
            let start = (i * hop_size) as isize - pad as isize;
            let lo = start.max(0) as usize;
            let hi = ((start + frame_size as isize).max(0) as usize).min(samples.len());
            let energy: f32 = if lo < hi {
                samples[lo..hi].iter().map(|&x| x * x).sum()
            } else {
                0.0
            };
            (energy / frame_size as f32).sqrt()
        })
        .collect();

    Ok(rms)
}

/// Mean RMS energy of a signal
///
/// # Errors
///
/// Same as [`rms_frames`].
pub fn rms_energy(samples: &[f32], frame_size: usize, hop_size: usize) -> Result<f32, AnalysisError> {
    let frames = rms_frames(samples, frame_size, hop_size)?;
    let energy = mean(&frames);
    log::debug!("RMS energy: {:.4} over {} frames", energy, frames.len());
    Ok(energy)
}
