//! Per-file mood pipeline
//!
//! For one file:
//!
//! 1. Parse artist and title from the file name
//! 2. Extract acoustic features (decode, resample, analyse); errors propagate
//! 3. Look the lyrics up once and score their sentiment; every failure here
//!    is absorbed and recorded as a [`SentimentOutcome`] with score 0
//! 4. Classify
//!
//! Features come first so an unreadable file never costs a network request.

use std::path::Path;

use crate::analysis::classifier::classify_features;
use crate::analysis::identity::TrackIdentity;
use crate::analysis::result::{DerivedScalars, FeatureSet, MoodReport};
use crate::config::{AnalysisConfig, LyricsConfig, GENIUS_TOKEN_ENV};
use crate::error::AnalysisError;
use crate::io::decoder::decode_audio;
use crate::io::resample::resample_mono;
use crate::lyrics::genius::GeniusClient;
use crate::lyrics::sentiment::{SentimentScorer, VaderScorer};
use crate::lyrics::{LyricsError, LyricsProvider, SentimentOutcome};

/// Source of acoustic features for a file
pub trait FeatureExtractor: Send {
    /// Extract the features of the audio file at `path`
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError` if the file cannot be read, decoded or analysed.
    fn extract(&self, path: &Path) -> Result<FeatureSet, AnalysisError>;
}

/// Decode with Symphonia, resample to the analysis rate, extract features
#[derive(Debug, Clone, Default)]
pub struct AudioFeatureExtractor {
    config: AnalysisConfig,
}

impl AudioFeatureExtractor {
    /// Create an extractor with the given analysis parameters
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }
}

impl FeatureExtractor for AudioFeatureExtractor {
    fn extract(&self, path: &Path) -> Result<FeatureSet, AnalysisError> {
        let audio = decode_audio(path)?;
        log::debug!(
            "Decoded {}: {:.2}s at {} Hz, {} channel(s)",
            path.display(),
            audio.duration_seconds(),
            audio.sample_rate,
            audio.channels
        );

        let rate = self.config.target_sample_rate;
        let samples = resample_mono(&audio.samples, audio.sample_rate, rate)?;
        crate::extract_features(&samples, rate, &self.config)
    }
}

/// Orchestrates feature extraction, sentiment lookup and classification
pub struct MoodPipeline {
    extractor: Box<dyn FeatureExtractor>,
    lyrics: Option<Box<dyn LyricsProvider>>,
    scorer: Box<dyn SentimentScorer>,
}

impl MoodPipeline {
    /// Create a pipeline without lyric lookup
    pub fn new(extractor: Box<dyn FeatureExtractor>, scorer: Box<dyn SentimentScorer>) -> Self {
        Self {
            extractor,
            lyrics: None,
            scorer,
        }
    }

    /// Enable lyric lookup through `provider`
    pub fn with_lyrics(mut self, provider: Box<dyn LyricsProvider>) -> Self {
        self.lyrics = Some(provider);
        self
    }

    /// Build the standard pipeline: Symphonia features, Genius lyrics, VADER sentiment
    ///
    /// Without a Genius token the pipeline runs with lyrics disabled and every
    /// track gets a neutral sentiment.
    pub fn from_config(analysis: AnalysisConfig, lyrics: &LyricsConfig) -> Self {
        let pipeline = Self::new(
            Box::new(AudioFeatureExtractor::new(analysis)),
            Box::new(VaderScorer::new()),
        );

        if !lyrics.has_token() {
            log::info!("Lyrics lookup disabled: {} is not set", GENIUS_TOKEN_ENV);
            return pipeline;
        }

        match GeniusClient::new(lyrics) {
            Ok(client) => pipeline.with_lyrics(Box::new(client)),
            Err(e) => {
                log::info!("Lyrics lookup disabled: {}", e);
                pipeline
            }
        }
    }

    /// Whether a lyrics provider is configured
    pub fn has_lyrics(&self) -> bool {
        self.lyrics.is_some()
    }

    /// Analyse one file
    ///
    /// # Errors
    ///
    /// Propagates feature extraction errors. Lyric failures never surface here.
    pub fn analyze(&self, path: &Path) -> Result<MoodReport, AnalysisError> {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let identity = TrackIdentity::from_path(path);

        log::info!("Analyzing {}", file);

        let features = self.extractor.extract(path)?;
        let sentiment = self.lookup_sentiment(&identity);
        let scalars = DerivedScalars::from_features(&features);
        let label = classify_features(&features, sentiment.score());

        log::info!(
            "{}: tempo={:.1} BPM, energy={:.4}, brightness={:.3}, variability={:.3}, \
             key_centrality={:.3}, sentiment={:.3} -> {}",
            file,
            features.tempo,
            features.energy,
            scalars.brightness,
            scalars.variability,
            scalars.key_centrality,
            sentiment.score(),
            label
        );

        Ok(MoodReport {
            file,
            identity,
            sentiment,
            features,
            scalars,
            label,
        })
    }

    /// Look up and score the lyrics of a track, at most one request chain
    pub fn lookup_sentiment(&self, identity: &TrackIdentity) -> SentimentOutcome {
        let Some(provider) = self.lyrics.as_ref() else {
            return SentimentOutcome::Skipped;
        };
        if !identity.is_complete() {
            log::debug!("No artist/title in file name, skipping lyrics for {:?}", identity.title);
            return SentimentOutcome::Skipped;
        }

        match provider.search_lyrics(&identity.title, &identity.artist) {
            Ok(Some(text)) if !text.trim().is_empty() => SentimentOutcome::Scored {
                score: self.scorer.score_polarity(&text),
            },
            Ok(_) | Err(LyricsError::NotFound) => {
                log::info!("No lyrics found for {}", identity.title);
                SentimentOutcome::NotFound
            }
            Err(e) => {
                log::warn!("Lyrics fetch failed for {}: {}", identity.title, e);
                SentimentOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
