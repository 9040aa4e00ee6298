//! Audio I/O modules
//!
//! Audio decoding using Symphonia and sample-rate conversion using rubato.

pub mod decoder;
pub mod resample;
