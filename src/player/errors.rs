// Error types for source resolution and playback

use thiserror::Error;

use super::models::Provider;

/// Reasons the player page stops before any player surface is created.
///
/// Both cases are rendered in place of the player; neither is a crash.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartupHalt {
    /// No source parameter on the page (informational, not a failure)
    #[error("No video specified")]
    MissingSource,

    /// Host matched a provider but no video ID could be extracted
    #[error("Could not extract {0} video ID.")]
    UnresolvedIdentifier(Provider),
}

impl StartupHalt {
    /// Whether this halt is a genuine failure (as opposed to missing input)
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::UnresolvedIdentifier(_))
    }
}

/// Failure of an optional fullscreen / orientation-lock request.
///
/// An API missing from the host is reported as `Unsupported` and treated
/// exactly like a runtime rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnhancementError {
    /// Host environment does not expose the API
    #[error("{0} is not supported by this host")]
    Unsupported(&'static str),

    /// Host rejected the request (usually: no user gesture yet)
    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Rejection of a media-start request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// Autoplay policy refused to start playback
    #[error("play() not allowed: {0}")]
    NotAllowed(String),

    /// The media element cannot play this source
    #[error("media not supported: {0}")]
    Unsupported(String),
}
