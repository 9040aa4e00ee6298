//! Classification and result types
//!
//! Turns extracted features plus a sentiment score into a mood:
//! - Track identity parsing
//! - Rule-based classifier
//! - Result types

pub mod classifier;
pub mod identity;
pub mod result;
