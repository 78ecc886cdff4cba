// URL classifier - decides the provider of a source URL and extracts its ID
//
// Host patterns are checked on the raw string (scheme and `www.` optional).
// Identifier extraction parses the URL; a parse failure means "no ID" and is
// never propagated.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use super::errors::StartupHalt;
use super::models::{Provider, ProviderKind, VideoIdentifier, VideoSource};

lazy_static! {
    static ref YOUTUBE_RE: Regex =
        Regex::new(r"(?i)^(https?://)?(www\.)?(youtube\.com|youtu\.be)/").unwrap();
    static ref VIMEO_RE: Regex = Regex::new(r"(?i)^(https?://)?(www\.)?vimeo\.com/").unwrap();
    static ref NUMERIC_RE: Regex = Regex::new(r"^[0-9]+$").unwrap();
}

/// Path segments that precede the ID in `/embed/ID`, `/shorts/ID`, `/live/ID`
const YOUTUBE_ID_MARKERS: [&str; 3] = ["embed", "shorts", "live"];

pub fn is_youtube(url: &str) -> bool {
    YOUTUBE_RE.is_match(url)
}

pub fn is_vimeo(url: &str) -> bool {
    VIMEO_RE.is_match(url)
}

/// Non-empty path segments of a parsed URL
fn path_parts(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

/// Extract the YouTube video ID.
///
/// Supports `youtu.be/ID`, `watch?v=ID`, `/embed/ID`, `/shorts/ID`,
/// `/live/ID`, and falls back to the last path segment.
/// Returns `None` when the URL does not parse or nothing usable is found.
pub fn extract_youtube_id(url: &str) -> Option<VideoIdentifier> {
    let parsed = Url::parse(url).ok()?;

    let id = if parsed.host_str().unwrap_or("").contains("youtu.be") {
        path_parts(&parsed).first().map(|s| s.to_string())
    } else if let Some(v) = parsed
        .query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
    {
        Some(v)
    } else {
        let parts = path_parts(&parsed);
        let after_marker = parts
            .iter()
            .position(|p| YOUTUBE_ID_MARKERS.contains(p))
            .and_then(|idx| parts.get(idx + 1));

        after_marker.or_else(|| parts.last()).map(|s| s.to_string())
    };

    id.filter(|id| !id.is_empty()).map(VideoIdentifier::new)
}

/// Extract the numeric Vimeo video ID from the last path segment.
///
/// Covers `vimeo.com/ID` and `vimeo.com/manage/videos/ID`; any other final
/// segment yields `None`.
pub fn extract_vimeo_id(url: &str) -> Option<VideoIdentifier> {
    let parsed = Url::parse(url).ok()?;
    let parts = path_parts(&parsed);

    parts
        .last()
        .filter(|last| NUMERIC_RE.is_match(last))
        .map(|last| VideoIdentifier::new(*last))
}

/// Classify a source into a playable [`VideoSource`].
///
/// Anything that is neither YouTube nor Vimeo is a direct file whose ID is
/// the whole URL. A provider match without an ID halts startup.
pub fn identify(url: &str) -> Result<VideoSource, StartupHalt> {
    if is_youtube(url) {
        extract_youtube_id(url)
            .map(VideoSource::YouTube)
            .ok_or(StartupHalt::UnresolvedIdentifier(Provider::YouTube))
    } else if is_vimeo(url) {
        extract_vimeo_id(url)
            .map(VideoSource::Vimeo)
            .ok_or(StartupHalt::UnresolvedIdentifier(Provider::Vimeo))
    } else {
        Ok(VideoSource::DirectFile(VideoIdentifier::new(url)))
    }
}

/// Total classification: always returns a kind, `Unresolved` on failure.
pub fn classify(url: &str) -> ProviderKind {
    match identify(url) {
        Ok(source) => source.kind(),
        Err(_) => ProviderKind::Unresolved,
    }
}
