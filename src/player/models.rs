// Common data models for the player pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::StartupHalt;
use super::surface::escape_html;

/// Iframe-backed video hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    YouTube,
    Vimeo,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::YouTube => "YouTube",
            Self::Vimeo => "Vimeo",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification result for a source URL.
///
/// `Unresolved` is terminal: the host matched a provider but no identifier
/// could be extracted. It is never a playable kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    YouTube,
    Vimeo,
    DirectFile,
    Unresolved,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::YouTube => write!(f, "youtube"),
            Self::Vimeo => write!(f, "vimeo"),
            Self::DirectFile => write!(f, "direct-file"),
            Self::Unresolved => write!(f, "unresolved"),
        }
    }
}

/// Provider-scoped video identifier (meaningless outside its kind)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoIdentifier(String);

impl VideoIdentifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A playable source: kind and identifier, paired so they cannot drift apart.
///
/// For `DirectFile` the identifier is the full original URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum VideoSource {
    YouTube(VideoIdentifier),
    Vimeo(VideoIdentifier),
    DirectFile(VideoIdentifier),
}

impl VideoSource {
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::YouTube(_) => ProviderKind::YouTube,
            Self::Vimeo(_) => ProviderKind::Vimeo,
            Self::DirectFile(_) => ProviderKind::DirectFile,
        }
    }

    pub fn id(&self) -> &VideoIdentifier {
        match self {
            Self::YouTube(id) | Self::Vimeo(id) | Self::DirectFile(id) => id,
        }
    }
}

/// Fully-qualified URL ready to hand to a player surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbedTarget(String);

impl EmbedTarget {
    pub(crate) fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EmbedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Autoplay recovery state of a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryState {
    /// Surface created, waiting for the deferred check
    AttemptingAutoplay,
    /// Playback confirmed, or retried from a user gesture
    Recovered,
    /// Manual-start affordance shown, waiting for one activation
    AwaitingUserGesture,
}

impl fmt::Display for RecoveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttemptingAutoplay => write!(f, "attempting-autoplay"),
            Self::Recovered => write!(f, "recovered"),
            Self::AwaitingUserGesture => write!(f, "awaiting-user-gesture"),
        }
    }
}

/// Observable playback state of a native media element
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub paused: bool,
    pub ended: bool,
    /// Playback position in seconds
    pub current_time: f64,
}

impl PlaybackSnapshot {
    /// Playing means: not paused, not ended, and advanced past zero
    pub fn is_playing(&self) -> bool {
        !self.paused && !self.ended && self.current_time > 0.0
    }
}

/// Element a fullscreen request is issued on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FullscreenTarget {
    /// `document.documentElement`
    DocumentRoot,
    /// The mounted media element
    Player,
}

/// Screen orientation lock requested after fullscreen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationLock {
    Landscape,
}

impl OrientationLock {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
        }
    }
}

/// Terminal content rendered into the container instead of a player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageMessage {
    /// No source given: explain the query parameter with examples
    Instructions { param: String },
    /// Source could not be turned into a player
    Failure(String),
}

impl PageMessage {
    /// Example sources shown on the instructions screen
    pub const EXAMPLE_SOURCES: [&'static str; 3] = [
        "https://youtu.be/VIDEO_ID",
        "https://vimeo.com/123456789",
        "https://example.com/clip.mp4",
    ];

    pub fn instructions(param: impl Into<String>) -> Self {
        Self::Instructions {
            param: param.into(),
        }
    }

    /// Plain-text rendering (what `textContent` would show)
    pub fn text(&self) -> String {
        match self {
            Self::Instructions { param } => {
                let mut text = format!(
                    "No video specified\n\
                     Append ?{}=<URL> with a YouTube/Vimeo/direct MP4 link.\n\
                     Examples:",
                    param
                );
                for example in Self::EXAMPLE_SOURCES {
                    text.push_str(&format!("\n?{}={}", param, example));
                }
                text
            }
            Self::Failure(message) => message.clone(),
        }
    }

    /// HTML rendering for the container
    pub fn to_html(&self) -> String {
        match self {
            Self::Instructions { param } => {
                let param = escape_html(param);
                let examples: Vec<String> = Self::EXAMPLE_SOURCES
                    .iter()
                    .map(|example| format!("<code>?{}={}</code>", param, escape_html(example)))
                    .collect();
                format!(
                    "<div class=\"player-message\"><div>\
                     <h1>No video specified</h1>\
                     <p>Append <code>?{}=&lt;URL&gt;</code> with a YouTube/Vimeo/direct MP4 link.</p>\
                     <p>Examples:</p>{}</div></div>",
                    param,
                    examples.join("<br/>")
                )
            }
            Self::Failure(message) => escape_html(message),
        }
    }
}

impl PageMessage {
    /// Message shown for a startup halt; `param` names the source parameter
    pub fn for_halt(halt: &StartupHalt, param: &str) -> Self {
        match halt {
            StartupHalt::MissingSource => Self::instructions(param),
            StartupHalt::UnresolvedIdentifier(_) => Self::Failure(halt.to_string()),
        }
    }
}
