//! Track identity parsed from file names
//!
//! Files follow the `"<artist> - <title>.<ext>"` convention. The stem is split
//! on the first `-`; anything after it, further dashes included, is the title.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Artist and title of a track
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackIdentity {
    /// Artist (empty when the name has no `-`)
    pub artist: String,

    /// Title
    pub title: String,
}

impl TrackIdentity {
    /// Parse a file stem (no extension)
    ///
    /// # Example
    ///
    /// ```
    /// use stratum_mood::TrackIdentity;
    ///
    /// let id = TrackIdentity::from_stem("Artist Name - Song Title");
    /// assert_eq!(id.artist, "Artist Name");
    /// assert_eq!(id.title, "Song Title");
    ///
    /// let solo = TrackIdentity::from_stem("SoloTrack");
    /// assert_eq!(solo.artist, "");
    /// assert_eq!(solo.title, "SoloTrack");
    /// ```
    pub fn from_stem(stem: &str) -> Self {
        match stem.split_once('-') {
            Some((artist, title)) => Self {
                artist: artist.trim().to_string(),
                title: title.trim().to_string(),
            },
            None => Self {
                artist: String::new(),
                title: stem.trim().to_string(),
            },
        }
    }

    /// Parse the file name of a path, ignoring its directory and extension
    pub fn from_path(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        Self::from_stem(&stem)
    }

    /// Whether both artist and title are present, i.e. a lyric lookup is possible
    pub fn is_complete(&self) -> bool {
        !self.artist.is_empty() && !self.title.is_empty()
    }
}
