//! Chroma and tonal-centroid extraction
//!
//! Describe the harmonic content of a track:
//! - Chroma vectors (12 pitch classes) from a power spectrogram
//! - Tonal centroid (tonnetz) projection of chroma onto fifths and thirds

pub mod extractor;
pub mod tonnetz;
