//! # Stratum Mood
//!
//! Music mood classification from acoustic features and lyric sentiment.
//!
//! ## Features
//!
//! - **Acoustic features**: tempo, tonal centroid, RMS energy, spectral
//!   contrast and MFCC timbre statistics, computed natively from one STFT
//! - **Lyric sentiment**: Genius lyrics lookup scored with VADER polarity
//! - **Mood rules**: a deterministic rule set mapping features and sentiment
//!   to one of eight labels
//!
//! ## Quick Start
//!
//! ```no_run
//! use stratum_mood::{analysis::classifier::classify_features, extract_features, AnalysisConfig};
//!
//! // Mono samples at the analysis rate
//! let samples: Vec<f32> = vec![0.0; 22050 * 30];
//! let config = AnalysisConfig::default();
//!
//! let features = extract_features(&samples, config.target_sample_rate, &config)?;
//! let mood = classify_features(&features, 0.0);
//!
//! println!("Tempo: {:.1} BPM, energy {:.3} -> {}", features.tempo, features.energy, mood);
//! # Ok::<(), stratum_mood::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! File → Decode → Resample → Feature Extraction ─┐
//!                                                ├→ Classifier → MoodReport
//! File name → Identity → Lyrics → Sentiment ─────┘
//! ```
//!
//! [`MoodPipeline`] runs this for one file; [`driver`] runs it for a folder
//! on a background worker.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod driver;
pub mod error;
pub mod features;
pub mod io;
pub mod lyrics;
pub mod pipeline;
pub mod preprocessing;

// Re-export main types
pub use analysis::classifier::{classify, classify_features};
pub use analysis::identity::TrackIdentity;
pub use analysis::result::{DerivedScalars, FeatureSet, MoodLabel, MoodReport};
pub use config::{AnalysisConfig, LyricsConfig};
pub use error::AnalysisError;
pub use lyrics::{LyricsError, LyricsProvider, SentimentOutcome};
pub use pipeline::{AudioFeatureExtractor, FeatureExtractor, MoodPipeline};

use features::chroma::extractor::extract_chroma;
use features::chroma::tonnetz::mean_tonal_centroid;
use features::contrast::{contrast_statistics, spectral_contrast, ContrastParams};
use features::energy::rms_energy;
use features::hpss::hpss;
use features::period::{correct_half_tempo, estimate_tempo};
use features::spectrum::{apply_filterbank, compute_stft, mel_filterbank, power_spectrogram, power_to_db};
use features::timbre::{mfcc, timbral_statistics};

/// Main feature extraction function
///
/// Computes every descriptor of a [`FeatureSet`] from one mono signal. The
/// STFT is computed once and shared by all spectral features.
///
/// # Arguments
///
/// * `samples` - Mono audio samples, normalized to [-1.0, 1.0]
/// * `sample_rate` - Sample rate in Hz (normally `config.target_sample_rate`)
/// * `config` - Analysis configuration parameters
///
/// # Returns
///
/// `FeatureSet` with the half-tempo correction already applied to `tempo`
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for empty input, a zero sample rate
/// or invalid configuration.
///
/// # Example
///
/// ```no_run
/// use stratum_mood::{extract_features, AnalysisConfig};
///
/// let samples = vec![0.0f32; 22050 * 30]; // 30 seconds of silence
/// let features = extract_features(&samples, 22050, &AnalysisConfig::default())?;
/// assert_eq!(features.tempo, 0.0);
/// # Ok::<(), stratum_mood::AnalysisError>(())
/// ```
pub fn extract_features(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<FeatureSet, AnalysisError> {
    use std::time::Instant;
    let start_time = Instant::now();

    log::debug!("Starting feature extraction: {} samples at {} Hz", samples.len(), sample_rate);

    if samples.is_empty() {
        return Err(AnalysisError::InvalidInput("Empty audio samples".to_string()));
    }

    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput("Invalid sample rate".to_string()));
    }

    // Shared spectral front end
    let magnitude = compute_stft(samples, config.frame_size, config.hop_size)?;
    let power = power_spectrogram(&magnitude);
    let mel_basis = mel_filterbank(sample_rate, config.frame_size, config.n_mels);
    let mut mel_db = apply_filterbank(&power, &mel_basis);
    power_to_db(&mut mel_db);

    // Tempo
    let raw_tempo = estimate_tempo(&mel_db, sample_rate, config)?;
    let tempo = correct_half_tempo(raw_tempo.bpm, config.half_tempo_threshold);
    if tempo != raw_tempo.bpm {
        log::debug!("Half-tempo correction: {:.2} -> {:.2} BPM", raw_tempo.bpm, tempo);
    }

    // Timbre
    let coefficients = mfcc(&mel_db, config.n_mfcc)?;
    let (timbral_mean, timbral_std) = timbral_statistics(&coefficients);

    // Spectral contrast
    let contrast = spectral_contrast(
        &magnitude,
        sample_rate,
        config.frame_size,
        ContrastParams {
            n_bands: config.contrast_bands,
            fmin: config.contrast_fmin,
            quantile: config.contrast_quantile,
        },
    )?;
    let (spectral_contrast_mean, spectral_contrast_std) = contrast_statistics(&contrast);

    // Energy
    let energy = rms_energy(samples, config.frame_size, config.hop_size)?;

    // Harmonic content
    let separated = hpss(&magnitude, config.hpss_kernel_size)?;
    let harmonic_power = power_spectrogram(&separated.harmonic);
    let chroma = extract_chroma(
        &harmonic_power,
        sample_rate,
        config.frame_size,
        config.center_frequency,
        config.soft_mapping_sigma,
    )?;
    let tonal_centroid = mean_tonal_centroid(&chroma)?;

    let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;
    log::debug!(
        "Feature extraction complete in {:.1} ms: tempo={:.2}, energy={:.4}, contrast={:.2}±{:.2}",
        processing_time_ms,
        tempo,
        energy,
        spectral_contrast_mean,
        spectral_contrast_std
    );

    Ok(FeatureSet {
        tempo,
        tonal_centroid,
        energy,
        spectral_contrast_mean,
        spectral_contrast_std,
        timbral_mean,
        timbral_std,
    })
}
