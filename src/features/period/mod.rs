//! Period estimation modules
//!
//! Convert an onset-strength envelope into a tempo estimate:
//! - Onset-strength envelope from the log-power mel spectrogram
//! - Autocorrelation with a log-normal tempo prior
//! - Half-tempo correction

pub mod autocorrelation;
pub mod novelty;

use serde::{Deserialize, Serialize};

use self::autocorrelation::{estimate_tempo_from_novelty, TempoSearch};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

/// Tempo estimate with confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoEstimate {
    /// BPM estimate (0.0 when undetermined)
    pub bpm: f32,

    /// Normalised autocorrelation strength at the chosen period (0.0-1.0)
    pub confidence: f32,
}

impl TempoEstimate {
    /// Estimate for signals without detectable periodicity
    pub fn undetermined() -> Self {
        Self {
            bpm: 0.0,
            confidence: 0.0,
        }
    }
}

/// Double a tempo that falls below `threshold`
///
/// Autocorrelation on sparse material tends to lock onto every other beat.
/// Estimates under the threshold are treated as half-tempo detections.
/// A zero (undetermined) tempo stays zero.
pub fn correct_half_tempo(bpm: f32, threshold: f32) -> f32 {
    if bpm > 0.0 && bpm < threshold {
        bpm * 2.0
    } else {
        bpm
    }
}

/// Estimate tempo from a log-power mel spectrogram
///
/// Runs onset-strength extraction and autocorrelation with the tempo range and
/// prior from `config`. The estimate is raw: callers apply
/// [`correct_half_tempo`].
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for malformed frames or parameters.
pub fn estimate_tempo(
    mel_db_frames: &[Vec<f32>],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<TempoEstimate, AnalysisError> {
    let envelope = novelty::onset_strength(mel_db_frames)?;
    let search = TempoSearch {
        min_bpm: config.min_bpm,
        max_bpm: config.max_bpm,
        prior_bpm: config.prior_bpm,
        prior_std_octaves: config.prior_std_octaves,
    };
    estimate_tempo_from_novelty(&envelope, sample_rate, config.hop_size, search)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_half_tempo() {
        assert_eq!(correct_half_tempo(80.0, 100.0), 160.0);
        assert_eq!(correct_half_tempo(99.9, 100.0), 199.8);
        assert_eq!(correct_half_tempo(100.0, 100.0), 100.0);
        assert_eq!(correct_half_tempo(120.0, 100.0), 120.0);
        assert_eq!(correct_half_tempo(0.0, 100.0), 0.0);
    }

    #[test]
    fn test_estimate_tempo_flat_spectrogram() {
        let frames = vec![vec![-40.0f32; 16]; 400];
        let est = estimate_tempo(&frames, 22050, &AnalysisConfig::default()).unwrap();
        assert_eq!(est, TempoEstimate::undetermined());
    }
}
