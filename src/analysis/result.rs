//! Analysis result types

use std::fmt;

use serde::{Deserialize, Serialize};

use super::identity::TrackIdentity;
use crate::lyrics::SentimentOutcome;

/// Acoustic descriptors of one decoded track
///
/// Produced once per track by [`crate::extract_features`] and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Tempo in BPM, after half-tempo correction (0.0 when undetermined)
    pub tempo: f32,

    /// Mean tonal-centroid (tonnetz) components of the harmonic part (6 values)
    pub tonal_centroid: Vec<f32>,

    /// Mean frame RMS energy
    pub energy: f32,

    /// Mean spectral contrast over bands and frames (dB)
    pub spectral_contrast_mean: f32,

    /// Population standard deviation of spectral contrast (dB)
    pub spectral_contrast_std: f32,

    /// Per-coefficient MFCC mean
    pub timbral_mean: Vec<f32>,

    /// Per-coefficient MFCC population standard deviation
    pub timbral_std: Vec<f32>,
}

/// Discrete mood label
///
/// Variants are declared in tie-break priority order: when several rules
/// fire, the earliest variant wins. `Neutral` is the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MoodLabel {
    /// Low energy, slow, not negative
    Calm,
    /// Loud, fast, timbrally varied
    Energetic,
    /// Positive and moderately fast
    Uplifting,
    /// Positive with some energy
    Happy,
    /// Sub-140 BPM and quiet, with strong sentiment either way
    Melancholic,
    /// Negative, quiet and slow
    Sad,
    /// Negative with a dull timbre
    Dark,
    /// No rule fired
    Neutral,
}

impl MoodLabel {
    /// Every label, in priority order (`Neutral` last)
    pub const ALL: [MoodLabel; 8] = [
        MoodLabel::Calm,
        MoodLabel::Energetic,
        MoodLabel::Uplifting,
        MoodLabel::Happy,
        MoodLabel::Melancholic,
        MoodLabel::Sad,
        MoodLabel::Dark,
        MoodLabel::Neutral,
    ];

    /// English display name
    ///
    /// # Example
    ///
    /// ```
    /// use stratum_mood::MoodLabel;
    ///
    /// assert_eq!(MoodLabel::Melancholic.name(), "Melancholic");
    /// ```
    pub fn name(&self) -> &'static str {
        match self {
            MoodLabel::Calm => "Calm",
            MoodLabel::Energetic => "Energetic",
            MoodLabel::Uplifting => "Uplifting",
            MoodLabel::Happy => "Happy",
            MoodLabel::Melancholic => "Melancholic",
            MoodLabel::Sad => "Sad",
            MoodLabel::Dark => "Dark",
            MoodLabel::Neutral => "Neutral",
        }
    }

    /// Parse a display name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|label| label.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scalars the classifier derives from a [`FeatureSet`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedScalars {
    /// Mean of the per-coefficient MFCC means
    pub brightness: f32,

    /// Mean of the per-coefficient MFCC standard deviations
    pub variability: f32,

    /// Mean of the tonal centroid; reported only, no rule reads it
    pub key_centrality: f32,
}

/// Complete per-file result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodReport {
    /// File name (without directory)
    pub file: String,

    /// Artist and title parsed from the file name
    pub identity: TrackIdentity,

    /// How the sentiment score was obtained
    pub sentiment: SentimentOutcome,

    /// Acoustic descriptors
    pub features: FeatureSet,

    /// Derived scalars used by the rules
    pub scalars: DerivedScalars,

    /// Final label
    pub label: MoodLabel,
}
