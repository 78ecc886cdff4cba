// Player surfaces - the single element mounted into the container

use serde::Serialize;

use super::models::{EmbedTarget, VideoSource};

/// Permission list granted to provider iframes
pub const IFRAME_ALLOW: &str = "autoplay; fullscreen; picture-in-picture; accelerometer; gyroscope";

/// Class applied to the mounted element so it fills the container
pub const SURFACE_CLASS: &str = "player-container";

/// Iframe configured for a provider embed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IframeSurface {
    pub src: String,
    pub allow: &'static str,
    pub allow_fullscreen: bool,
    pub frame_border: u8,
    pub class_name: &'static str,
}

impl IframeSurface {
    pub fn new(target: &EmbedTarget) -> Self {
        Self {
            src: target.as_str().to_string(),
            allow: IFRAME_ALLOW,
            allow_fullscreen: true,
            frame_border: 0,
            class_name: SURFACE_CLASS,
        }
    }

    pub fn to_html(&self) -> String {
        format!(
            "<iframe src=\"{}\" frameborder=\"{}\" allow=\"{}\"{} class=\"{}\"></iframe>",
            escape_html(&self.src),
            self.frame_border,
            self.allow,
            if self.allow_fullscreen {
                " allowfullscreen=\"true\""
            } else {
                ""
            },
            self.class_name
        )
    }
}

/// Native media element for direct files.
///
/// Muted + inline is what mobile browsers require for autoplay; controls
/// stay visible as a manual fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaSurface {
    pub src: String,
    pub autoplay: bool,
    pub muted: bool,
    pub plays_inline: bool,
    pub controls: bool,
    pub class_name: &'static str,
}

impl MediaSurface {
    pub fn new(target: &EmbedTarget) -> Self {
        Self {
            src: target.as_str().to_string(),
            autoplay: true,
            muted: true,
            plays_inline: true,
            controls: true,
            class_name: SURFACE_CLASS,
        }
    }

    pub fn to_html(&self) -> String {
        let mut flags = String::new();
        for (enabled, name) in [
            (self.autoplay, "autoplay"),
            (self.muted, "muted"),
            (self.plays_inline, "playsinline"),
            (self.controls, "controls"),
        ] {
            if enabled {
                flags.push(' ');
                flags.push_str(name);
            }
        }
        format!(
            "<video src=\"{}\"{} class=\"{}\"></video>",
            escape_html(&self.src),
            flags,
            self.class_name
        )
    }
}

/// Exactly one surface exists per page load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerSurface {
    Iframe(IframeSurface),
    Media(MediaSurface),
}

impl PlayerSurface {
    /// Pick the surface for a source: iframes for providers, media otherwise
    pub fn for_source(source: &VideoSource, target: &EmbedTarget) -> Self {
        match source {
            VideoSource::YouTube(_) | VideoSource::Vimeo(_) => {
                Self::Iframe(IframeSurface::new(target))
            }
            VideoSource::DirectFile(_) => Self::Media(MediaSurface::new(target)),
        }
    }

    pub fn src(&self) -> &str {
        match self {
            Self::Iframe(frame) => &frame.src,
            Self::Media(media) => &media.src,
        }
    }

    pub fn to_html(&self) -> String {
        match self {
            Self::Iframe(frame) => frame.to_html(),
            Self::Media(media) => media.to_html(),
        }
    }
}

/// Escape text for use in HTML content and double-quoted attributes
pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
