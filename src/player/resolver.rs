// Embed resolver - turns a classified source into a playable target

use lazy_static::lazy_static;
use url::Url;

use super::models::{EmbedTarget, VideoIdentifier, VideoSource};

lazy_static! {
    static ref YOUTUBE_EMBED_BASE: Url = Url::parse("https://www.youtube.com/embed").unwrap();
    static ref VIMEO_EMBED_BASE: Url = Url::parse("https://player.vimeo.com/video").unwrap();
}

/// Fixed YouTube player parameters. `mute=1` is what lets autoplay start.
const YOUTUBE_PARAMS: [(&str, &str); 5] = [
    ("autoplay", "1"),
    ("playsinline", "1"),
    ("rel", "0"),
    ("modestbranding", "1"),
    ("mute", "1"),
];

/// Fixed Vimeo player parameters. `autopause=0` keeps other Vimeo embeds
/// from pausing this one.
const VIMEO_PARAMS: [(&str, &str); 7] = [
    ("autoplay", "1"),
    ("muted", "1"),
    ("autopause", "0"),
    ("playsinline", "1"),
    ("title", "0"),
    ("byline", "0"),
    ("portrait", "0"),
];

/// Append `id` as one percent-encoded path segment, then the player query.
///
/// Delimiters inside the id (`/`, `?`, `#`) stay inside its segment.
fn embed_url(base: &Url, id: &VideoIdentifier, params: &[(&str, &str)]) -> EmbedTarget {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(id.as_str());
    }
    url.query_pairs_mut().extend_pairs(params);
    EmbedTarget::new(String::from(url))
}

pub fn build_youtube_embed(id: &VideoIdentifier) -> EmbedTarget {
    embed_url(&YOUTUBE_EMBED_BASE, id, &YOUTUBE_PARAMS)
}

pub fn build_vimeo_embed(id: &VideoIdentifier) -> EmbedTarget {
    embed_url(&VIMEO_EMBED_BASE, id, &VIMEO_PARAMS)
}

/// Resolve a source into the URL its player surface loads.
///
/// Direct files are returned verbatim; they are not provider endpoints.
pub fn resolve_embed(source: &VideoSource) -> EmbedTarget {
    match source {
        VideoSource::YouTube(id) => build_youtube_embed(id),
        VideoSource::Vimeo(id) => build_vimeo_embed(id),
        VideoSource::DirectFile(url) => EmbedTarget::new(url.as_str()),
    }
}
