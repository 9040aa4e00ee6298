//! Channel mixing utilities (multi-channel to mono conversion)

/// Average interleaved multi-channel samples down to mono
///
/// # Arguments
///
/// * `samples` - Interleaved samples `[c0, c1, .., c0, c1, ..]`
/// * `channels` - Number of interleaved channels
///
/// # Returns
///
/// One sample per frame. A trailing partial frame is dropped; `channels <= 1`
/// returns the input unchanged.
pub fn interleaved_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    let scale = 1.0 / channels as f32;
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect()
}
