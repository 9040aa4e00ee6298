//! Lyric sentiment scoring
//!
//! Polarity is VADER's compound score: a normalised sum of lexicon valences,
//! adjusted for negation, intensifiers and punctuation, in [-1, 1].
//!
//! # Reference
//!
//! Hutto, C. J., & Gilbert, E. (2014). VADER: A Parsimonious Rule-based Model
//! for Sentiment Analysis of Social Media Text. *Proceedings of the 8th
//! International AAAI Conference on Weblogs and Social Media*.

/// Text to polarity scoring
pub trait SentimentScorer: Send {
    /// Polarity of `text` in [-1, 1]; 0 for neutral or empty text
    fn score_polarity(&self, text: &str) -> f64;
}

/// VADER compound polarity
#[derive(Debug, Clone, Copy, Default)]
pub struct VaderScorer;

impl VaderScorer {
    /// Create a scorer
    pub fn new() -> Self {
        Self
    }
}

impl SentimentScorer for VaderScorer {
    fn score_polarity(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }

        let analyzer = vader_sentiment::SentimentIntensityAnalyzer::new();
        let scores = analyzer.polarity_scores(text);
        let compound = scores.get("compound").copied().unwrap_or(0.0);

        log::debug!(
            "Sentiment over {} chars: compound={:.4}",
            text.len(),
            compound
        );

        if compound.is_finite() {
            compound.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_text() {
        let score = VaderScorer::new().score_polarity("I love this wonderful, happy, beautiful day!");
        assert!(score > 0.5, "score={}", score);
    }

    #[test]
    fn test_negative_text() {
        let score = VaderScorer::new().score_polarity("I hate this terrible, awful, miserable night.");
        assert!(score < -0.5, "score={}", score);
    }

    #[test]
    fn test_empty_text_is_neutral() {
        assert_eq!(VaderScorer::new().score_polarity(""), 0.0);
        assert_eq!(VaderScorer::new().score_polarity("  \n "), 0.0);
    }

    #[test]
    fn test_score_in_range() {
        let text = "love love love love love love love love love love great great great!!!";
        let score = VaderScorer::new().score_polarity(text);
        assert!((-1.0..=1.0).contains(&score));
    }
}
