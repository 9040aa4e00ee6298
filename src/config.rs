//! Configuration parameters for feature extraction and lyric retrieval

use std::time::Duration;

/// Environment variable holding the Genius API access token
pub const GENIUS_TOKEN_ENV: &str = "GENIUS_API_TOKEN";

/// Default Genius API endpoint
pub const GENIUS_API_BASE: &str = "https://api.genius.com";

/// Analysis configuration parameters
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    // Signal
    /// Sample rate the decoded signal is resampled to (default: 22050)
    pub target_sample_rate: u32,

    // STFT parameters
    /// Frame size for STFT (default: 2048)
    pub frame_size: usize,

    /// Hop size for STFT (default: 512)
    pub hop_size: usize,

    // Tempo estimation
    /// Minimum BPM to consider (default: 30.0)
    pub min_bpm: f32,

    /// Maximum BPM to consider (default: 320.0)
    pub max_bpm: f32,

    /// Centre of the log-normal tempo prior (default: 120.0)
    pub prior_bpm: f32,

    /// Width of the tempo prior in octaves (default: 1.0)
    pub prior_std_octaves: f32,

    /// Raw estimates below this are treated as half-tempo detections and doubled (default: 100.0)
    pub half_tempo_threshold: f32,

    // Harmonic content
    /// Median filter length for harmonic/percussive separation (default: 31)
    pub hpss_kernel_size: usize,

    /// Reference frequency for pitch-class mapping (default: 440.0 Hz, A4)
    pub center_frequency: f32,

    /// Soft chroma mapping standard deviation in semitones (default: 0.5)
    pub soft_mapping_sigma: f32,

    // Spectral contrast
    /// Number of octave bands (default: 6, yielding 7 contrast rows)
    pub contrast_bands: usize,

    /// Lower edge of the first octave band in Hz (default: 200.0)
    pub contrast_fmin: f32,

    /// Fraction of each band used for peak/valley estimation (default: 0.02)
    pub contrast_quantile: f32,

    // Timbre
    /// Number of mel bands (default: 128)
    pub n_mels: usize,

    /// Number of cepstral coefficients (default: 20)
    pub n_mfcc: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: 22050,
            frame_size: 2048,
            hop_size: 512,
            min_bpm: 30.0,
            max_bpm: 320.0,
            prior_bpm: 120.0,
            prior_std_octaves: 1.0,
            half_tempo_threshold: 100.0,
            hpss_kernel_size: 31,
            center_frequency: 440.0,
            soft_mapping_sigma: 0.5,
            contrast_bands: 6,
            contrast_fmin: 200.0,
            contrast_quantile: 0.02,
            n_mels: 128,
            n_mfcc: 20,
        }
    }
}

/// Lyric retrieval configuration
///
/// The access token is never compiled in; it comes from the process
/// environment or the command line.
#[derive(Debug, Clone)]
pub struct LyricsConfig {
    /// Genius API access token
    pub token: Option<String>,

    /// API base URL (default: `https://api.genius.com`)
    pub base_url: String,

    /// Per-request timeout (default: 15s)
    pub timeout: Duration,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: GENIUS_API_BASE.to_string(),
            timeout: Duration::from_secs(15),
            user_agent: format!("stratum-mood/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl LyricsConfig {
    /// Build a configuration with the token read from `GENIUS_API_TOKEN`
    ///
    /// Blank values are treated as absent.
    pub fn from_env() -> Self {
        let token = std::env::var(GENIUS_TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty());
        Self {
            token,
            ..Self::default()
        }
    }

    /// True when a non-blank token is configured
    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_analysis_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.target_sample_rate, 22050);
        assert_eq!(config.frame_size, 2048);
        assert_eq!(config.hop_size, 512);
        assert_eq!(config.half_tempo_threshold, 100.0);
        assert!(config.min_bpm < config.prior_bpm && config.prior_bpm < config.max_bpm);
    }

    #[test]
    fn test_lyrics_config_from_env() {
        std::env::set_var(GENIUS_TOKEN_ENV, "  ");
        assert_eq!(LyricsConfig::from_env().token, None);

        std::env::set_var(GENIUS_TOKEN_ENV, "abc123");
        let config = LyricsConfig::from_env();
        assert_eq!(config.token.as_deref(), Some("abc123"));
        assert_eq!(config.base_url, GENIUS_API_BASE);

        std::env::remove_var(GENIUS_TOKEN_ENV);
        assert!(!LyricsConfig::from_env().has_token());
    }

    #[test]
    fn test_lyrics_config_token_presence() {
        let mut config = LyricsConfig::default();
        assert!(!config.has_token());

        config.token = Some("   ".to_string());
        assert!(!config.has_token());

        config.token = Some("abc123".to_string());
        assert!(config.has_token());
    }
}
