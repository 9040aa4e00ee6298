//! Rule-based mood classification
//!
//! Every rule is evaluated and the labels of the rules that fire form a
//! candidate set. The winner is the candidate with the highest priority
//! (`Calm > Energetic > Uplifting > Happy > Melancholic > Sad > Dark`, the
//! declaration order of [`MoodLabel`]); an empty set gives `Neutral`.
//!
//! Rules with `s` = sentiment, `e` = energy, `t` = tempo,
//! `b` = brightness, `v` = variability:
//!
//! | branch | condition | label |
//! |---|---|---|
//! | `s < -0.2` | `e < 0.3 ∧ t < 130` | Sad |
//! | `s < -0.2` | `e ≥ 0.1 ∧ b < 2` | Dark |
//! | `s < -0.2` | `e > 0.25 ∧ t > 110 ∧ v > 4` | Energetic |
//! | `s < -0.2` | `t < 140 ∧ e < 0.4` | Melancholic |
//! | `s > 0.2` | `e > 0.15 ∧ t ≥ 90` | Happy |
//! | `s > 0.2` | `e > 0.2 ∧ t ≥ 110` | Uplifting |
//! | `s > 0.2` | `e > 0.25 ∧ t > 110 ∧ v > 4` | Energetic |
//! | `s > 0.2` | `t < 140 ∧ e < 0.4` | Melancholic |
//! | any | `e < 0.15 ∧ t < 110 ∧ s > -0.3` | Calm |
//!
//! Comparisons against NaN are false, so NaN inputs fall through to `Neutral`.
//!
//! # Example
//!
//! ```
//! use stratum_mood::analysis::classifier::classify;
//! use stratum_mood::MoodLabel;
//!
//! let label = classify(100.0, &[], 0.05, 0.0, 0.0, &[3.0], &[1.0], 0.5);
//! assert_eq!(label, MoodLabel::Calm);
//! ```

use super::result::{DerivedScalars, FeatureSet, MoodLabel};
use crate::features::spectrum::mean;

const NEGATIVE_SENTIMENT: f64 = -0.2;
const POSITIVE_SENTIMENT: f64 = 0.2;
const CALM_SENTIMENT_FLOOR: f64 = -0.3;

impl DerivedScalars {
    /// Derive brightness, variability and key centrality from raw descriptors
    pub fn from_descriptors(tonal_centroid: &[f32], timbral_mean: &[f32], timbral_std: &[f32]) -> Self {
        Self {
            brightness: mean(timbral_mean),
            variability: mean(timbral_std),
            key_centrality: mean(tonal_centroid),
        }
    }

    /// Derive the scalars of a [`FeatureSet`]
    pub fn from_features(features: &FeatureSet) -> Self {
        Self::from_descriptors(
            &features.tonal_centroid,
            &features.timbral_mean,
            &features.timbral_std,
        )
    }
}

/// Labels of every rule that fires, in priority order
///
/// # Arguments
///
/// * `tempo` - Corrected tempo in BPM
/// * `energy` - Mean RMS energy
/// * `scalars` - Brightness and variability (key centrality is ignored)
/// * `sentiment` - Lyric polarity in [-1, 1]
pub fn candidates(tempo: f32, energy: f32, scalars: &DerivedScalars, sentiment: f64) -> Vec<MoodLabel> {
    let DerivedScalars {
        brightness,
        variability,
        ..
    } = *scalars;

    let mut labels = Vec::new();
    let energetic = energy > 0.25 && tempo > 110.0 && variability > 4.0;
    let melancholic = tempo < 140.0 && energy < 0.4;

    if sentiment < NEGATIVE_SENTIMENT {
        if energy < 0.3 && tempo < 130.0 {
            labels.push(MoodLabel::Sad);
        }
        if energy >= 0.1 && brightness < 2.0 {
            labels.push(MoodLabel::Dark);
        }
        if energetic {
            labels.push(MoodLabel::Energetic);
        }
        if melancholic {
            labels.push(MoodLabel::Melancholic);
        }
    }

    if sentiment > POSITIVE_SENTIMENT {
        if energy > 0.15 && tempo >= 90.0 {
            labels.push(MoodLabel::Happy);
        }
        if energy > 0.2 && tempo >= 110.0 {
            labels.push(MoodLabel::Uplifting);
        }
        if energetic {
            labels.push(MoodLabel::Energetic);
        }
        if melancholic {
            labels.push(MoodLabel::Melancholic);
        }
    }

    if energy < 0.15 && tempo < 110.0 && sentiment > CALM_SENTIMENT_FLOOR {
        labels.push(MoodLabel::Calm);
    }

    labels.sort();
    labels.dedup();
    labels
}

/// Classify a track's mood
///
/// Pure and total: always returns one label, `Neutral` when no rule fires.
/// `tonal_centroid` and the spectral contrast statistics are accepted for
/// completeness but no rule reads them.
#[allow(clippy::too_many_arguments)]
pub fn classify(
    tempo: f32,
    tonal_centroid: &[f32],
    energy: f32,
    spectral_contrast_mean: f32,
    spectral_contrast_std: f32,
    timbral_mean: &[f32],
    timbral_std: &[f32],
    sentiment: f64,
) -> MoodLabel {
    let scalars = DerivedScalars::from_descriptors(tonal_centroid, timbral_mean, timbral_std);
    let fired = candidates(tempo, energy, &scalars, sentiment);

    log::debug!(
        "Classifying: tempo={:.1}, energy={:.4}, contrast={:.2}±{:.2}, brightness={:.3}, \
         variability={:.3}, key_centrality={:.3}, sentiment={:.3} -> candidates {:?}",
        tempo,
        energy,
        spectral_contrast_mean,
        spectral_contrast_std,
        scalars.brightness,
        scalars.variability,
        scalars.key_centrality,
        sentiment,
        fired
    );

    fired.first().copied().unwrap_or(MoodLabel::Neutral)
}

/// Classify a [`FeatureSet`] with a sentiment score
pub fn classify_features(features: &FeatureSet, sentiment: f64) -> MoodLabel {
    classify(
        features.tempo,
        &features.tonal_centroid,
        features.energy,
        features.spectral_contrast_mean,
        features.spectral_contrast_std,
        &features.timbral_mean,
        &features.timbral_std,
        sentiment,
    )
}
