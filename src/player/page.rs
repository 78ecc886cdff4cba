// Page location helpers - reads the video source from the query string

use url::{form_urlencoded, Url};

/// Query parameter carrying the video source
pub const DEFAULT_SOURCE_PARAM: &str = "video";

/// Query part of a location: a full URL, a relative path with `?...`,
/// or a bare query string. The fragment is never part of it.
fn query_of(location: &str) -> String {
    if let Ok(url) = Url::parse(location) {
        return url.query().unwrap_or("").to_string();
    }

    let without_fragment = location.split('#').next().unwrap_or("");
    match without_fragment.split_once('?') {
        Some((_, query)) => query.to_string(),
        None if without_fragment.contains('=') => without_fragment.to_string(),
        None => String::new(),
    }
}

/// Value of `param` in `location`, first occurrence wins.
///
/// An empty value is the same as no value.
pub fn source_from_location(location: &str, param: &str) -> Option<String> {
    let query = query_of(location);
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == param)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
