//! Genius lyrics client
//!
//! Two requests per track:
//!
//! 1. `GET {base}/search?q=<title> <artist>` with the bearer token; the
//!    best song hit is chosen by [`select_hit`]
//! 2. `GET <song page url>`; the lyrics are scraped from the page's
//!    `data-lyrics-container` blocks by [`extract_lyrics`]
//!
//! Section headers such as `[Chorus]` are removed, and hits whose titles
//! mark them as non-songs (tracklists, credits, skits, ..) are ignored.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Deserialize;

use super::{LyricsError, LyricsProvider};
use crate::config::LyricsConfig;

static NON_SONG_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(track\s?list|album art(work)?|liner notes|booklet|credits|interview|skit|instrumental|setlist)\b",
    )
    .expect("valid non-song pattern")
});

static LYRICS_CONTAINER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<div\b[^>]*data-lyrics-container="true"[^>]*>"#)
        .expect("valid container pattern")
});

static DIV_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?div\b[^>]*>").expect("valid div pattern"));

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid br pattern"));

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#([xX]?)([0-9a-fA-F]+);").expect("valid entity pattern"));

static SECTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]\n]*\]").expect("valid header pattern"));

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    response: SearchBody,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

/// One entry of a Genius search response
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    /// Hit type (`"song"` for songs)
    #[serde(rename = "type")]
    pub kind: String,

    /// Song metadata
    #[serde(default)]
    pub result: SongResult,
}

/// Song metadata from a search hit
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SongResult {
    /// Song title
    pub title: String,

    /// Song page URL
    pub url: String,

    /// `"complete"` when lyrics are transcribed
    pub lyrics_state: Option<String>,

    /// Marked instrumental by Genius
    pub instrumental: bool,

    /// Main credited artist
    pub primary_artist: ArtistRef,
}

/// Artist reference in a search hit
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArtistRef {
    /// Artist name
    pub name: String,
}

/// Blocking Genius API client
pub struct GeniusClient {
    agent: ureq::Agent,
    token: String,
    base_url: String,
}

impl GeniusClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns `LyricsError::MissingToken` if no token is configured.
    pub fn new(config: &LyricsConfig) -> Result<Self, LyricsError> {
        let token = config
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(LyricsError::MissingToken)?
            .to_string();

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();

        Ok(Self {
            agent,
            token,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Run a search query
    ///
    /// # Errors
    ///
    /// Transport, status and JSON errors.
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>, LyricsError> {
        log::debug!("Genius search: {:?}", query);
        let body = self
            .agent
            .get(&format!("{}/search", self.base_url))
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/json")
            .query("q", query)
            .call()?
            .into_string()
            .map_err(|e| LyricsError::Transport(format!("Failed to read search response: {}", e)))?;
        parse_search_response(&body)
    }

    /// Download a song page
    ///
    /// # Errors
    ///
    /// Transport and status errors.
    pub fn fetch_page(&self, url: &str) -> Result<String, LyricsError> {
        log::debug!("Fetching lyrics page: {}", url);
        self.agent
            .get(url)
            .call()?
            .into_string()
            .map_err(|e| LyricsError::Transport(format!("Failed to read lyrics page: {}", e)))
    }
}

impl LyricsProvider for GeniusClient {
    fn search_lyrics(&self, title: &str, artist: &str) -> Result<Option<String>, LyricsError> {
        let hits = self.search(&format!("{} {}", title, artist))?;
        let song = select_hit(&hits, artist).ok_or(LyricsError::NotFound)?;
        log::info!(
            "Matched \"{}\" by {} -> {}",
            song.title,
            song.primary_artist.name,
            song.url
        );
        let html = self.fetch_page(&song.url)?;
        Ok(extract_lyrics(&html))
    }
}

/// Parse the body of a `/search` response
///
/// # Errors
///
/// Returns `LyricsError::Parse` if the body is not a search envelope.
pub fn parse_search_response(body: &str) -> Result<Vec<SearchHit>, LyricsError> {
    serde_json::from_str::<SearchEnvelope>(body)
        .map(|envelope| envelope.response.hits)
        .map_err(|e| LyricsError::Parse(format!("Invalid search response: {}", e)))
}

/// Pick the song to fetch lyrics for
///
/// Only hits of type `song` with a page URL, transcribed lyrics and a title
/// that does not mark a non-song are considered. The first one whose primary
/// artist matches `artist` wins; otherwise the first acceptable hit.
pub fn select_hit<'a>(hits: &'a [SearchHit], artist: &str) -> Option<&'a SongResult> {
    let wanted = normalize_name(artist);
    let mut songs = hits
        .iter()
        .filter(|hit| hit.kind == "song")
        .map(|hit| &hit.result)
        .filter(|song| !song.url.is_empty() && is_lyrical(song))
        .peekable();

    let first = songs.peek().copied();
    songs
        .find(|song| {
            let name = normalize_name(&song.primary_artist.name);
            !wanted.is_empty() && !name.is_empty() && (name.contains(&wanted) || wanted.contains(&name))
        })
        .or(first)
}

fn is_lyrical(song: &SongResult) -> bool {
    if song.instrumental || NON_SONG_TITLE.is_match(&song.title) {
        return false;
    }
    song.lyrics_state.as_deref().map_or(true, |state| state == "complete")
}

/// Lowercase alphanumerics only, for loose artist comparison
fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Extract plain-text lyrics from a Genius song page
///
/// # Returns
///
/// Lyrics with section headers and blank lines removed, or `None` when the
/// page has no lyric text.
pub fn extract_lyrics(html: &str) -> Option<String> {
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while let Some(open) = LYRICS_CONTAINER.find_at(html, cursor) {
        let content_start = open.end();
        let mut content_end = html.len();
        let mut depth = 1usize;

        for tag in DIV_TAG.find_iter(&html[content_start..]) {
            if tag.as_str().starts_with("</") {
                depth -= 1;
                if depth == 0 {
                    content_end = content_start + tag.start();
                    break;
                }
            } else {
                depth += 1;
            }
        }

        blocks.push(html_to_text(&html[content_start..content_end]));
        cursor = content_end;
    }

    let text = blocks.join("\n");
    let without_headers = SECTION_HEADER.replace_all(&text, "");
    let lyrics = without_headers
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if lyrics.is_empty() {
        None
    } else {
        Some(lyrics)
    }
}

fn html_to_text(fragment: &str) -> String {
    let with_breaks = LINE_BREAK.replace_all(fragment, "\n");
    let stripped = ANY_TAG.replace_all(&with_breaks, "");
    decode_entities(&stripped)
}

fn decode_entities(text: &str) -> String {
    let numeric = NUMERIC_ENTITY.replace_all(text, |caps: &Captures| {
        let radix = if caps[1].is_empty() { 10 } else { 16 };
        u32::from_str_radix(&caps[2], radix)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    numeric
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::mpsc::{self, Receiver};
    use std::time::Duration;

    /// Minimal HTTP/1.1 server answering by path prefix
    ///
    /// `routes` gets the server's base URL and the request path. Returns the
    /// base URL and a receiver with the head of every request.
    fn serve(routes: impl Fn(&str, &str) -> (u16, String) + Send + 'static) -> (String, Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();
        let server_base = base_url.clone();

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut head = String::new();
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).unwrap_or(0) <= 2 {
                        break;
                    }
                    head.push_str(&line);
                }
                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, body) = routes(&server_base, &path);
                let _ = tx.send(head);
                let _ = write!(
                    stream,
                    "HTTP/1.1 {} Test\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
            }
        });

        (base_url, rx)
    }

    fn client_for(base_url: &str) -> GeniusClient {
        GeniusClient::new(&LyricsConfig {
            token: Some("secret".to_string()),
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(5),
            ..LyricsConfig::default()
        })
        .unwrap()
    }

    const SEARCH_BODY: &str = r#"{
        "meta": {"status": 200},
        "response": {"hits": [
            {"type": "song", "result": {
                "title": "Song Title (Tracklist)",
                "url": "https://genius.com/a-tracklist",
                "lyrics_state": "complete",
                "primary_artist": {"name": "Artist Name"}}},
            {"type": "song", "result": {
                "title": "Song Title",
                "url": "https://genius.com/other-artist-song-title-lyrics",
                "lyrics_state": "complete",
                "primary_artist": {"name": "Other Artist"}}},
            {"type": "song", "result": {
                "title": "Song Title",
                "url": "https://genius.com/artist-name-song-title-lyrics",
                "lyrics_state": "complete",
                "primary_artist": {"name": "Artist Name"}}}
        ]}
    }"#;

    #[test]
    fn test_parse_search_response() {
        let hits = parse_search_response(SEARCH_BODY).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[2].result.primary_artist.name, "Artist Name");
        assert!(parse_search_response("<html>").is_err());
    }

    #[test]
    fn test_parse_search_response_without_hits() {
        let hits = parse_search_response(r#"{"response": {}}"#).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_select_hit_prefers_artist_and_skips_non_songs() {
        let hits = parse_search_response(SEARCH_BODY).unwrap();
        let song = select_hit(&hits, "artist name").unwrap();
        assert_eq!(song.url, "https://genius.com/artist-name-song-title-lyrics");
    }

    #[test]
    fn test_select_hit_falls_back_to_first_song() {
        let hits = parse_search_response(SEARCH_BODY).unwrap();
        let song = select_hit(&hits, "Nobody").unwrap();
        assert_eq!(song.primary_artist.name, "Other Artist");
    }

    #[test]
    fn test_select_hit_skips_untranscribed() {
        let body = r#"{"response": {"hits": [
            {"type": "song", "result": {"title": "Tune", "url": "u", "lyrics_state": "unreleased",
             "primary_artist": {"name": "Band"}}},
            {"type": "album", "result": {"title": "Tune", "url": "v"}}
        ]}}"#;
        let hits = parse_search_response(body).unwrap();
        assert!(select_hit(&hits, "Band").is_none());
    }

    #[test]
    fn test_extract_lyrics() {
        let html = r#"<html><body>
            <div class="x" data-lyrics-container="true">[Verse 1]<br/>I&#x27;m <a href="/a"><span>walking</span></a> home<br>
            Rain &amp; <i>shine</i><br><div class="inner">ad</div></div>
            <div>Not lyrics</div>
            <div data-lyrics-container="true" class="y">[Chorus]<br/>Tell me &quot;why&quot;</div>
            </body></html>"#;
        let lyrics = extract_lyrics(html).unwrap();
        assert_eq!(lyrics, "I'm walking home\nRain & shine\nad\nTell me \"why\"");
        assert!(!lyrics.contains("Not lyrics"));
    }

    #[test]
    fn test_extract_lyrics_missing() {
        assert_eq!(extract_lyrics("<html><div>nothing here</div></html>"), None);
        assert_eq!(
            extract_lyrics(r#"<div data-lyrics-container="true">[Instrumental]</div>"#),
            None
        );
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("&#39;a&#x2019;&lt;b&gt; &amp;amp;"), "'a\u{2019}<b> &amp;");
    }

    #[test]
    fn test_search_lyrics_fetches_and_scrapes_page() {
        let (base_url, requests) = serve(|base, path| {
            if path.starts_with("/search") {
                let body = format!(
                    r#"{{"response": {{"hits": [{{"type": "song", "result": {{
                        "title": "Tune", "url": "{}/songs/band-tune-lyrics",
                        "lyrics_state": "complete", "primary_artist": {{"name": "Band"}}}}}}]}}}}"#,
                    base
                );
                (200, body)
            } else if path == "/songs/band-tune-lyrics" {
                let page = r#"<html><div data-lyrics-container="true">[Verse]<br>First line<br>Second line</div></html>"#;
                (200, page.to_string())
            } else {
                (404, String::new())
            }
        });

        let lyrics = client_for(&base_url).search_lyrics("Tune", "Band").unwrap();
        assert_eq!(lyrics.as_deref(), Some("First line\nSecond line"));

        let search_head = requests.recv().unwrap();
        assert!(search_head.starts_with("GET /search?q="), "{}", search_head);
        assert!(search_head.contains("Bearer secret"));
        let page_head = requests.recv().unwrap();
        assert!(page_head.starts_with("GET /songs/band-tune-lyrics"));
    }

    #[test]
    fn test_search_lyrics_without_matching_song_is_not_found() {
        let (base_url, _requests) = serve(|_, _| (200, r#"{"response": {"hits": []}}"#.to_string()));
        let result = client_for(&base_url).search_lyrics("Tune", "Band");
        assert!(matches!(result, Err(LyricsError::NotFound)));
    }

    #[test]
    fn test_search_404_is_not_found() {
        let (base_url, _requests) = serve(|_, _| (404, "missing".to_string()));
        let result = client_for(&base_url).search_lyrics("Tune", "Band");
        assert!(matches!(result, Err(LyricsError::NotFound)));
    }

    #[test]
    fn test_search_500_is_status_error() {
        let (base_url, _requests) = serve(|_, _| (500, "boom".to_string()));
        let result = client_for(&base_url).search_lyrics("Tune", "Band");
        assert!(matches!(result, Err(LyricsError::Status(500))));
    }

    #[test]
    fn test_search_invalid_json_is_parse_error() {
        let (base_url, _requests) = serve(|_, _| (200, "<html>maintenance</html>".to_string()));
        let result = client_for(&base_url).search_lyrics("Tune", "Band");
        assert!(matches!(result, Err(LyricsError::Parse(_))));
    }

    #[test]
    fn test_refused_connection_is_transport_error() {
        let base_url = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            format!("http://{}", listener.local_addr().unwrap())
        };
        let result = client_for(&base_url).search_lyrics("Tune", "Band");
        assert!(matches!(result, Err(LyricsError::Transport(_))));
    }

    #[test]
    fn test_client_requires_token() {
        let config = LyricsConfig::default();
        assert!(matches!(GeniusClient::new(&config), Err(LyricsError::MissingToken)));

        let config = LyricsConfig {
            token: Some("secret".to_string()),
            ..LyricsConfig::default()
        };
        assert!(GeniusClient::new(&config).is_ok());
    }
}
