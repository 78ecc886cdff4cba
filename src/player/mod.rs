// Player module - source resolution and autoplay recovery

pub mod classifier;
pub mod enhance;
pub mod errors;
pub mod headless;
pub mod models;
pub mod page;
pub mod resolver;
pub mod supervisor;
pub mod surface;
pub mod traits;

pub use errors::{EnhancementError, PlaybackError, StartupHalt};
pub use models::{
    EmbedTarget, FullscreenTarget, OrientationLock, PageMessage, PlaybackSnapshot, Provider,
    ProviderKind, RecoveryState, VideoIdentifier, VideoSource,
};
pub use supervisor::{PlaybackSession, PlaybackSupervisor, AUTOPLAY_CHECK_DELAY};
pub use surface::PlayerSurface;
pub use traits::{Activatable, MediaElement, Overlay, PageHandles, PlayerContainer, Viewport};
