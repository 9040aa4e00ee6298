//! Lyric retrieval and sentiment scoring
//!
//! Two seams, both injected into the pipeline:
//! - [`LyricsProvider`] looks up a song's lyrics (Genius implementation in [`genius`])
//! - [`sentiment::SentimentScorer`] turns text into a polarity in [-1, 1]
//!
//! Lookup failures never abort a track; the pipeline records them as a
//! [`SentimentOutcome`] with score 0.

pub mod genius;
pub mod sentiment;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lyric retrieval errors
#[derive(Debug, Error)]
pub enum LyricsError {
    /// No matching song or no lyric text
    #[error("Lyrics not found")]
    NotFound,

    /// Network failure (DNS, connect, timeout, TLS)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status
    #[error("HTTP status {0}")]
    Status(u16),

    /// Response body could not be interpreted
    #[error("Unexpected response: {0}")]
    Parse(String),

    /// No API token configured
    #[error("No Genius API token configured")]
    MissingToken,
}

impl From<ureq::Error> for LyricsError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(404, _) => LyricsError::NotFound,
            ureq::Error::Status(code, _) => LyricsError::Status(code),
            ureq::Error::Transport(transport) => LyricsError::Transport(transport.to_string()),
        }
    }
}

/// Source of song lyrics
pub trait LyricsProvider: Send {
    /// Look up the lyrics of `title` by `artist`
    ///
    /// # Returns
    ///
    /// `Ok(Some(text))` with the lyrics, `Ok(None)` when the song exists but
    /// carries no lyric text.
    ///
    /// # Errors
    ///
    /// `LyricsError::NotFound` when no song matches; other variants for
    /// transport or response failures.
    fn search_lyrics(&self, title: &str, artist: &str) -> Result<Option<String>, LyricsError>;
}

/// How a track's sentiment score was obtained
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SentimentOutcome {
    /// Lyrics found and scored
    Scored {
        /// Compound polarity in [-1, 1]
        score: f64,
    },
    /// No lookup: artist or title missing, or lyrics disabled
    Skipped,
    /// No lyrics for this track
    NotFound,
    /// Lookup failed
    Failed {
        /// Error description
        reason: String,
    },
}

impl SentimentOutcome {
    /// Score fed to the classifier; 0 unless lyrics were scored
    pub fn score(&self) -> f64 {
        match self {
            SentimentOutcome::Scored { score } => *score,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_score() {
        assert_eq!(SentimentOutcome::Scored { score: -0.7 }.score(), -0.7);
        assert_eq!(SentimentOutcome::Skipped.score(), 0.0);
        assert_eq!(SentimentOutcome::NotFound.score(), 0.0);
        assert_eq!(
            SentimentOutcome::Failed {
                reason: "timeout".to_string()
            }
            .score(),
            0.0
        );
    }

    #[test]
    fn test_outcome_json_shape() {
        let json = serde_json::to_value(SentimentOutcome::Scored { score: 0.5 }).unwrap();
        assert_eq!(json["status"], "scored");
        assert_eq!(json["score"], 0.5);
        let json = serde_json::to_value(SentimentOutcome::Skipped).unwrap();
        assert_eq!(json["status"], "skipped");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(LyricsError::Status(503).to_string(), "HTTP status 503");
        assert_eq!(LyricsError::NotFound.to_string(), "Lyrics not found");
    }
}
