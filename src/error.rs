//! Error types for the mood analysis engine

use thiserror::Error;

/// Errors that can occur while turning an audio file into a mood report
///
/// Lyric retrieval has its own error type ([`crate::lyrics::LyricsError`]);
/// those failures are absorbed by the pipeline and never surface here.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Audio decoding error (corrupt, unreadable or unsupported file)
    #[error("Decoding error: {0}")]
    DecodingError(String),

    /// Processing error during feature extraction
    #[error("Processing error: {0}")]
    ProcessingError(String),

    /// Filesystem error (opening files, listing folders)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    /// True when the error came from the decoder rather than from analysis
    pub fn is_decoding(&self) -> bool {
        matches!(self, AnalysisError::DecodingError(_))
    }
}
