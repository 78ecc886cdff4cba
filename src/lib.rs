pub mod config;
pub mod player;

pub use config::{ConfigError, PlayerConfig};
pub use player::{PageHandles, PlaybackSupervisor, RecoveryState, StartupHalt};

use player::page::source_from_location;

/// Run the player page: read the source from `location`, mount the player
/// into `page` and supervise autoplay until it settles.
pub async fn launch(
    page: PageHandles,
    location: &str,
    config: &PlayerConfig,
) -> Result<RecoveryState, StartupHalt> {
    let source = source_from_location(location, &config.source_param);
    PlaybackSupervisor::new(page)
        .with_source_param(config.source_param.as_str())
        .run(source.as_deref())
        .await
}
