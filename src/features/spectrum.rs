//! Short-time Fourier transform and mel-scale utilities
//!
//! Every spectral feature in the crate is computed from the same centered,
//! Hann-windowed STFT:
//!
//! 1. Zero-pad the signal by `frame_size / 2` on both sides
//! 2. Slice frames every `hop_size` samples (`1 + len / hop_size` frames)
//! 3. Window with a periodic Hann window and take the FFT magnitude
//!
//! # Example
//!
//! ```no_run
//! use stratum_mood::features::spectrum::compute_stft;
//!
//! let samples = vec![0.0f32; 22050];
//! let frames = compute_stft(&samples, 2048, 512)?;
//! assert_eq!(frames[0].len(), 1025);
//! # Ok::<(), stratum_mood::AnalysisError>(())
//! ```

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::AnalysisError;

/// Floor applied before taking logarithms of power values
pub const AMIN: f32 = 1e-10;

/// Dynamic range kept by [`power_to_db`]
pub const TOP_DB: f32 = 80.0;

/// Periodic Hann window of length `n`
pub fn hann_window(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / n as f32).cos())
        .collect()
}

/// Compute the magnitude STFT of a mono signal
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `frame_size` - FFT size (typically 2048)
/// * `hop_size` - Hop between frames (typically 512)
///
/// # Returns
///
/// Spectrogram as `n_frames × (frame_size / 2 + 1)` magnitudes
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for empty input or zero sizes.
pub fn compute_stft(
    samples: &[f32],
    frame_size: usize,
    hop_size: usize,
) -> Result<Vec<Vec<f32>>, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::InvalidInput("Empty audio samples".to_string()));
    }
    if frame_size == 0 || hop_size == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "Invalid STFT parameters: frame={}, hop={}",
            frame_size, hop_size
        )));
    }

    let pad = frame_size / 2;
    let mut padded = vec![0.0f32; samples.len() + 2 * pad];
    padded[pad..pad + samples.len()].copy_from_slice(samples);

    let n_frames = 1 + samples.len() / hop_size;
    let n_bins = frame_size / 2 + 1;
    let window = hann_window(frame_size);

    log::debug!(
        "Computing STFT: {} samples, frame={}, hop={}, {} frames",
        samples.len(),
        frame_size,
        hop_size,
        n_frames
    );

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(frame_size);
    let mut buffer = vec![Complex::new(0.0f32, 0.0); frame_size];
    let mut frames = Vec::with_capacity(n_frames);

    for i in 0..n_frames {
        let start = i * hop_size;
        for (j, slot) in buffer.iter_mut().enumerate() {
            let x = padded.get(start + j).copied().unwrap_or(0.0);
            *slot = Complex::new(x * window[j], 0.0);
        }
        fft.process(&mut buffer);
        frames.push(buffer[..n_bins].iter().map(|c| c.norm()).collect());
    }

    Ok(frames)
}

/// Square every magnitude in a spectrogram
pub fn power_spectrogram(magnitude: &[Vec<f32>]) -> Vec<Vec<f32>> {
    magnitude
        .iter()
        .map(|frame| frame.iter().map(|&m| m * m).collect())
        .collect()
}

/// Centre frequency of each FFT bin in Hz
pub fn fft_frequencies(sample_rate: u32, frame_size: usize) -> Vec<f32> {
    let n_bins = frame_size / 2 + 1;
    (0..n_bins)
        .map(|k| k as f32 * sample_rate as f32 / frame_size as f32)
        .collect()
}

/// Convert Hz to mels (Slaney scale: linear below 1 kHz, logarithmic above)
pub fn hz_to_mel(hz: f32) -> f32 {
    const F_SP: f32 = 200.0 / 3.0;
    const MIN_LOG_HZ: f32 = 1000.0;
    const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;
    let logstep = 6.4f32.ln() / 27.0;

    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / logstep
    } else {
        hz / F_SP
    }
}

/// Convert mels back to Hz (inverse of [`hz_to_mel`])
pub fn mel_to_hz(mel: f32) -> f32 {
    const F_SP: f32 = 200.0 / 3.0;
    const MIN_LOG_HZ: f32 = 1000.0;
    const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;
    let logstep = 6.4f32.ln() / 27.0;

    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (logstep * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// Build a Slaney-normalised triangular mel filterbank
///
/// # Returns
///
/// `n_mels × (frame_size / 2 + 1)` weights spanning 0 Hz to Nyquist
pub fn mel_filterbank(sample_rate: u32, frame_size: usize, n_mels: usize) -> Vec<Vec<f32>> {
    let fft_freqs = fft_frequencies(sample_rate, frame_size);
    let mel_max = hz_to_mel(sample_rate as f32 / 2.0);

    let mel_points: Vec<f32> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_max * i as f32 / (n_mels + 1) as f32))
        .collect();

    let mut weights = vec![vec![0.0f32; fft_freqs.len()]; n_mels];
    for (m, row) in weights.iter_mut().enumerate() {
        let (lo, centre, hi) = (mel_points[m], mel_points[m + 1], mel_points[m + 2]);
        let enorm = 2.0 / (hi - lo).max(f32::EPSILON);
        for (k, &f) in fft_freqs.iter().enumerate() {
            let lower = (f - lo) / (centre - lo).max(f32::EPSILON);
            let upper = (hi - f) / (hi - centre).max(f32::EPSILON);
            row[k] = lower.min(upper).max(0.0) * enorm;
        }
    }

    weights
}

/// Project a power spectrogram onto a filterbank
///
/// # Returns
///
/// `n_frames × n_filters` band energies
pub fn apply_filterbank(power: &[Vec<f32>], filterbank: &[Vec<f32>]) -> Vec<Vec<f32>> {
    power
        .iter()
        .map(|frame| {
            filterbank
                .iter()
                .map(|weights| weights.iter().zip(frame).map(|(w, p)| w * p).sum())
                .collect()
        })
        .collect()
}

/// Convert power values to decibels in place, clamped to `TOP_DB` below the peak
///
/// `10 * log10(max(AMIN, x))`, then every value is raised to at least
/// `max - TOP_DB` across the whole matrix.
pub fn power_to_db(values: &mut [Vec<f32>]) {
    let mut peak = f32::NEG_INFINITY;
    for row in values.iter_mut() {
        for v in row.iter_mut() {
            *v = 10.0 * v.max(AMIN).log10();
            peak = peak.max(*v);
        }
    }

    let floor = peak - TOP_DB;
    for row in values.iter_mut() {
        for v in row.iter_mut() {
            *v = v.max(floor);
        }
    }
}

/// Arithmetic mean; 0 for an empty slice
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

/// Population standard deviation; 0 for an empty slice
pub fn std_dev(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|&x| (x - m) * (x - m)).sum::<f32>() / values.len() as f32;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let n = (seconds * sample_rate as f32) as usize;
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_stft_shape() {
        let samples = vec![0.0f32; 22050];
        let frames = compute_stft(&samples, 2048, 512).unwrap();
        assert_eq!(frames.len(), 1 + 22050 / 512);
        assert!(frames.iter().all(|f| f.len() == 1025));
    }

    #[test]
    fn test_stft_short_signal_is_padded() {
        let samples = vec![0.5f32; 100];
        let frames = compute_stft(&samples, 2048, 512).unwrap();
        assert_eq!(frames.len(), 1);
        assert!(frames[0][0] > 0.0);
    }

    #[test]
    fn test_stft_invalid() {
        assert!(compute_stft(&[], 2048, 512).is_err());
        assert!(compute_stft(&[0.0; 10], 0, 512).is_err());
        assert!(compute_stft(&[0.0; 10], 2048, 0).is_err());
    }

    #[test]
    fn test_stft_sine_peak_bin() {
        let sr = 22050;
        let samples = sine(1000.0, sr, 1.0);
        let frames = compute_stft(&samples, 2048, 512).unwrap();
        let mid = &frames[frames.len() / 2];
        let (peak_bin, _) = mid
            .iter()
            .enumerate()
            .fold((0, 0.0f32), |acc, (i, &m)| if m > acc.1 { (i, m) } else { acc });
        let expected = (1000.0 * 2048.0 / sr as f32).round() as usize;
        assert!((peak_bin as i64 - expected as i64).abs() <= 1);
    }

    #[test]
    fn test_mel_roundtrip_points() {
        for hz in [0.0f32, 500.0, 1000.0, 4000.0, 11025.0] {
            let back = mel_to_hz(hz_to_mel(hz));
            assert!((back - hz).abs() < 0.5, "{} -> {}", hz, back);
        }
    }

    #[test]
    fn test_mel_filterbank_shape_and_coverage() {
        let fb = mel_filterbank(22050, 2048, 128);
        assert_eq!(fb.len(), 128);
        assert!(fb.iter().all(|row| row.len() == 1025));
        assert!(fb.iter().all(|row| row.iter().any(|&w| w > 0.0)));
    }

    #[test]
    fn test_power_to_db_clamps_range() {
        let mut values = vec![vec![1.0f32, 1e-12, 0.0], vec![100.0, 1e-3, 1.0]];
        power_to_db(&mut values);
        assert!((values[1][0] - 20.0).abs() < 1e-4);
        assert!((values[0][0] - 0.0).abs() < 1e-4);
        // Peak is 20 dB, so nothing falls below -60 dB
        assert!(values.iter().flatten().all(|&v| v >= -60.0 - 1e-4));
    }

    #[test]
    fn test_mean_and_std() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
        assert!((mean(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-6);
        assert!((std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.0).abs() < 1e-6);
    }
}
