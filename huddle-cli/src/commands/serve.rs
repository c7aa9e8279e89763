//! Huddle serve command for running a room hub
//!
//! The hub serves:
//! - WebSocket endpoint for room participants
//! - HTTP health endpoint

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use huddle_server::{HuddleServer, ServerConfig};
use tracing::info;

use crate::config::{ConfigLoader, HuddleConfig};

/// Arguments for the serve command
///
/// Flags left unset fall back to the configuration files.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Seconds a chat bubble stays visible
    #[arg(long)]
    pub message_ttl: Option<u64>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let server_config = server_config(&args, &config);

    info!("Starting huddle server on {}", server_config.addr());

    HuddleServer::new(server_config)
        .run()
        .await
        .context("huddle server failed")
}

/// Merge command-line flags over the loaded configuration
fn server_config(args: &ServeArgs, config: &HuddleConfig) -> ServerConfig {
    let mut room = config.room.to_room_config();
    if let Some(secs) = args.message_ttl {
        room.message_ttl = Duration::from_secs(secs);
    }

    ServerConfig::new(
        args.host.clone().unwrap_or_else(|| config.server.host.clone()),
        args.port.unwrap_or(config.server.port),
    )
    .with_room(room)
}
