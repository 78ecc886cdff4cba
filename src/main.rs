//! embed-autoplay - command line front end
//!
//! `resolve` classifies a source URL and prints the embed target.
//! `simulate` runs the full player page against a headless browser model
//! and prints the rendered DOM and every recovery state transition.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use embed_autoplay_lib::player::classifier::identify;
use embed_autoplay_lib::player::headless::{AutoplayPolicy, HeadlessPage};
use embed_autoplay_lib::player::page::source_from_location;
use embed_autoplay_lib::player::resolver::resolve_embed;
use embed_autoplay_lib::player::{
    EmbedTarget, PlaybackSupervisor, PlayerSurface, ProviderKind, RecoveryState, VideoIdentifier,
};
use embed_autoplay_lib::PlayerConfig;

/// Command-line arguments for embed-autoplay
#[derive(Parser, Debug)]
#[command(name = "embed-autoplay")]
#[command(about = "Resolve video links into autoplaying embeds")]
#[command(version)]
struct Args {
    /// Config file (default: <config dir>/embed-autoplay/config.toml)
    #[arg(long, global = true, env = "EMBED_AUTOPLAY_CONFIG")]
    config: Option<PathBuf>,

    /// Tracing filter used when RUST_LOG is unset (overrides the config file)
    #[arg(long, global = true)]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a source URL and print its embed target
    Resolve {
        /// YouTube, Vimeo or direct media URL
        url: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run the player page for a page location on a headless browser model
    Simulate(SimulateArgs),
}

#[derive(clap::Args, Debug)]
struct SimulateArgs {
    /// Page location, e.g. "https://host/player.html?video=..." or "?video=..."
    location: String,

    /// Reject play() until the user taps
    #[arg(long)]
    block_autoplay: bool,

    /// Reject fullscreen requests until the user taps
    #[arg(long)]
    block_fullscreen: bool,

    /// Host has no screen orientation lock API
    #[arg(long)]
    no_orientation_lock: bool,

    /// Tap the start control when the manual-start overlay appears
    #[arg(long)]
    tap: bool,
}

#[derive(Debug, Serialize)]
struct Resolution {
    source: String,
    kind: ProviderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<VideoIdentifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    embed: Option<EmbedTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    surface: Option<PlayerSurface>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn resolve(url: &str, json: bool) -> Result<()> {
    let resolution = match identify(url) {
        Ok(source) => {
            let embed = resolve_embed(&source);
            Resolution {
                source: url.to_string(),
                kind: source.kind(),
                id: Some(source.id().clone()),
                surface: Some(PlayerSurface::for_source(&source, &embed)),
                embed: Some(embed),
                error: None,
            }
        }
        Err(halt) => Resolution {
            source: url.to_string(),
            kind: ProviderKind::Unresolved,
            id: None,
            embed: None,
            surface: None,
            error: Some(halt.to_string()),
        },
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        println!("kind:  {}", resolution.kind);
        if let Some(id) = &resolution.id {
            println!("id:    {}", id);
        }
        if let Some(embed) = &resolution.embed {
            println!("embed: {}", embed);
        }
        if let Some(surface) = &resolution.surface {
            println!("html:  {}", surface.to_html());
        }
    }

    match resolution.error {
        Some(error) => Err(anyhow!(error)),
        None => Ok(()),
    }
}

async fn simulate(args: SimulateArgs, config: &PlayerConfig) -> Result<()> {
    let page = HeadlessPage::new(AutoplayPolicy {
        autoplay_allowed: !args.block_autoplay,
        fullscreen_without_gesture: !args.block_fullscreen,
        fullscreen_supported: true,
        orientation_lock_supported: !args.no_orientation_lock,
    });

    let source = source_from_location(&args.location, &config.source_param);
    let supervisor =
        PlaybackSupervisor::new(page.handles()).with_source_param(config.source_param.as_str());

    let session = match supervisor.start(source.as_deref()).await {
        Ok(session) => session,
        Err(halt) => {
            println!("{}", page.container.html());
            return if halt.is_failure() {
                Err(anyhow!(halt))
            } else {
                Ok(())
            };
        }
    };

    println!("state: {}", session.state());
    let mut states = session.subscribe();
    let supervision = tokio::spawn(session.supervise());

    while states.changed().await.is_ok() {
        let state = *states.borrow_and_update();
        println!("state: {}", state);

        match state {
            RecoveryState::AwaitingUserGesture if args.tap => {
                info!("Tapping start control");
                page.start_control.click();
            }
            RecoveryState::AwaitingUserGesture => {
                println!("overlay visible, waiting for a tap (rerun with --tap)");
                supervision.abort();
                break;
            }
            RecoveryState::Recovered => break,
            RecoveryState::AttemptingAutoplay => {}
        }
    }

    if *states.borrow() == RecoveryState::Recovered {
        supervision.await.context("supervisor task failed")?;
    }

    println!("{}", page.container.html());
    println!("overlay visible: {}", page.overlay.is_visible());
    println!("fullscreen: {:?}", page.viewport.fullscreen_element());
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = PlayerConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(filter) = args.log_filter {
        config = config.with_log_filter(filter);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Resolve { url, json } => resolve(&url, json),
        Command::Simulate(simulate_args) => simulate(simulate_args, &config).await,
    }
}
