//! Tonal centroid (tonnetz) features
//!
//! Projects each L1-normalised chroma vector onto three circles in a 6-D
//! space:
//!
//! - circle of fifths (radius 1)
//! - circle of minor thirds (radius 1)
//! - circle of major thirds (radius 0.5)
//!
//! # Reference
//!
//! Harte, C., Sandler, M., & Gasser, M. (2006). Detecting Harmonic Change in
//! Musical Audio. *Proceedings of the 1st ACM Workshop on Audio and Music
//! Computing Multimedia*, 21-26.

use super::extractor::N_CHROMA;
use crate::error::AnalysisError;

/// Dimensions of the tonal centroid
pub const N_TONNETZ: usize = 6;

/// Angular step per pitch class (in units of π) for each dimension
const SCALE: [f32; N_TONNETZ] = [7.0 / 6.0, 7.0 / 6.0, 3.0 / 2.0, 3.0 / 2.0, 2.0 / 3.0, 2.0 / 3.0];

/// Circle radius for each dimension
const RADIUS: [f32; N_TONNETZ] = [1.0, 1.0, 1.0, 1.0, 0.5, 0.5];

/// Tonnetz projection matrix (`6 × 12`)
///
/// Even rows are the sine components, odd rows the cosine components.
pub fn tonnetz_basis() -> [[f32; N_CHROMA]; N_TONNETZ] {
    let mut basis = [[0.0f32; N_CHROMA]; N_TONNETZ];
    for (i, row) in basis.iter_mut().enumerate() {
        let phase = if i % 2 == 0 { 0.5 } else { 0.0 };
        for (j, slot) in row.iter_mut().enumerate() {
            *slot = RADIUS[i] * (std::f32::consts::PI * (SCALE[i] * j as f32 - phase)).cos();
        }
    }
    basis
}

/// Project chroma frames onto the tonnetz basis
///
/// # Arguments
///
/// * `chroma` - 12-element chroma vectors, L1-normalised
///
/// # Returns
///
/// One 6-element tonal-centroid vector per frame
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if a frame does not have 12 bins.
pub fn tonnetz(chroma: &[Vec<f32>]) -> Result<Vec<[f32; N_TONNETZ]>, AnalysisError> {
    if let Some(frame) = chroma.iter().find(|f| f.len() != N_CHROMA) {
        return Err(AnalysisError::InvalidInput(format!(
            "Chroma frame has {} bins, expected {}",
            frame.len(),
            N_CHROMA
        )));
    }

    let basis = tonnetz_basis();
    Ok(chroma
        .iter()
        .map(|frame| {
            let mut centroid = [0.0f32; N_TONNETZ];
            for (value, row) in centroid.iter_mut().zip(&basis) {
                *value = row.iter().zip(frame).map(|(b, c)| b * c).sum();
            }
            centroid
        })
        .collect())
}

/// Average tonal centroid over all frames
///
/// Returns a zero vector for empty input.
///
/// # Errors
///
/// Same as [`tonnetz`].
pub fn mean_tonal_centroid(chroma: &[Vec<f32>]) -> Result<Vec<f32>, AnalysisError> {
    let frames = tonnetz(chroma)?;
    let mut mean = vec![0.0f32; N_TONNETZ];
    if frames.is_empty() {
        return Ok(mean);
    }

    for frame in &frames {
        for (acc, v) in mean.iter_mut().zip(frame) {
            *acc += v;
        }
    }
    let n = frames.len() as f32;
    mean.iter_mut().for_each(|v| *v /= n);

    log::debug!("Tonal centroid over {} frames: {:?}", frames.len(), mean);

    Ok(mean)
}
