//! Onset-strength (novelty) envelope for tempo estimation
//!
//! The envelope is the mean, over mel bands, of the half-wave rectified
//! first difference of the log-power mel spectrogram:
//!
//! `novelty[t] = mean_m(max(0, S[t][m] - S[t-1][m]))`
//!
//! Frame 0 has no predecessor and is set to 0 so the envelope stays aligned
//! with the STFT frames.
//!
//! # Reference
//!
//! Klapuri, A., Eronen, A., & Astola, J. (2006). Analysis of the Meter of Audio Signals.
//! *IEEE Transactions on Audio, Speech, and Language Processing*, 14(1), 342-355.

use crate::error::AnalysisError;

/// Compute the onset-strength envelope from a log-power mel spectrogram
///
/// # Arguments
///
/// * `mel_db_frames` - `n_frames × n_mels` log-power values (dB)
///
/// # Returns
///
/// One novelty value per frame (`n_frames` values, first one 0)
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if frames have inconsistent lengths.
pub fn onset_strength(mel_db_frames: &[Vec<f32>]) -> Result<Vec<f32>, AnalysisError> {
    if mel_db_frames.is_empty() {
        return Ok(Vec::new());
    }

    let n_mels = mel_db_frames[0].len();
    if n_mels == 0 {
        return Err(AnalysisError::InvalidInput("Empty mel frames".to_string()));
    }

    for (i, frame) in mel_db_frames.iter().enumerate() {
        if frame.len() != n_mels {
            return Err(AnalysisError::InvalidInput(format!(
                "Inconsistent frame lengths: frame 0 has {} bands, frame {} has {} bands",
                n_mels,
                i,
                frame.len()
            )));
        }
    }

    let mut novelty = Vec::with_capacity(mel_db_frames.len());
    novelty.push(0.0f32);

    for pair in mel_db_frames.windows(2) {
        let rise: f32 = pair[1]
            .iter()
            .zip(&pair[0])
            .map(|(&curr, &prev)| (curr - prev).max(0.0))
            .sum();
        novelty.push(rise / n_mels as f32);
    }

    log::debug!(
        "Onset strength: {} frames, max={:.4}",
        novelty.len(),
        novelty.iter().copied().fold(0.0f32, f32::max)
    );

    Ok(novelty)
}
