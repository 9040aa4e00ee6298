//! Feature extraction modules
//!
//! This module contains the acoustic descriptors behind mood classification:
//! - Shared STFT and mel utilities
//! - Period estimation (tempo)
//! - Harmonic-percussive separation
//! - Chroma and tonal centroid
//! - RMS energy
//! - Spectral contrast
//! - Timbre (MFCC)

pub mod chroma;
pub mod contrast;
pub mod energy;
pub mod hpss;
pub mod period;
pub mod spectrum;
pub mod timbre;
