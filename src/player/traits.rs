// Page seams injected into the playback supervisor

use async_trait::async_trait;
use std::sync::Arc;

use super::errors::{EnhancementError, PlaybackError};
use super::models::{FullscreenTarget, OrientationLock, PageMessage, PlaybackSnapshot};
use super::surface::{IframeSurface, MediaSurface};

/// Something the user can activate (click / tap)
#[async_trait]
pub trait Activatable: Send + Sync {
    /// Resolves on the next activation.
    ///
    /// Dropping the future detaches the listener; activations that happen
    /// while nobody is waiting are not queued.
    async fn activated(&self);
}

/// Mounted native media element
#[async_trait]
pub trait MediaElement: Send + Sync {
    /// Start playback; rejected on strict-autoplay hosts
    async fn play(&self) -> Result<(), PlaybackError>;

    /// Current paused / ended / position state
    fn snapshot(&self) -> PlaybackSnapshot;
}

/// The container the player is rendered into
pub trait PlayerContainer: Send + Sync {
    /// Replace the container content with a terminal message
    fn render_message(&self, message: &PageMessage);

    /// Append a provider iframe
    fn append_iframe(&self, frame: &IframeSurface);

    /// Append a native media element and hand back its playback handle
    fn append_media(&self, media: &MediaSurface) -> Arc<dyn MediaElement>;
}

/// Manual-start overlay (initially hidden, activatable itself)
pub trait Overlay: Activatable {
    fn show(&self);
    fn hide(&self);
}

/// Document-level fullscreen and screen-orientation APIs
#[async_trait]
pub trait Viewport: Send + Sync {
    /// Whether any element is currently fullscreen
    fn is_fullscreen(&self) -> bool;

    async fn request_fullscreen(&self, target: FullscreenTarget) -> Result<(), EnhancementError>;

    async fn lock_orientation(&self, lock: OrientationLock) -> Result<(), EnhancementError>;
}

/// The externally provided page handles the supervisor works with
#[derive(Clone)]
pub struct PageHandles {
    pub container: Arc<dyn PlayerContainer>,
    pub overlay: Arc<dyn Overlay>,
    pub start_control: Arc<dyn Activatable>,
    pub viewport: Arc<dyn Viewport>,
}
