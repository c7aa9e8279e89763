//! Huddle config command: inspect the merged configuration

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use huddle_client::endpoint_from_origin;

use crate::config::{ConfigLoader, HuddleConfig};

/// Arguments for the config command
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the hub, room and client settings after merging every layer
    Show,
    /// Print where settings are read from and the hub endpoint `join` would dial
    Path,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    match args.command {
        ConfigCommands::Show => {
            let rendered =
                toml::to_string_pretty(&config).context("Failed to render configuration")?;
            println!("{}", rendered.trim_end());
        }
        ConfigCommands::Path => {
            let user = ConfigLoader::user_config_path();
            let project = ConfigLoader::project_config_path();
            for line in describe_sources(user.as_deref(), &project, &config) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn describe_sources(user: Option<&Path>, project: &Path, config: &HuddleConfig) -> Vec<String> {
    let user = match user {
        Some(path) => layer_line(path),
        None => "(no config directory on this platform)".to_string(),
    };
    let endpoint = match endpoint_from_origin(&config.client.origin) {
        Ok(url) => url.to_string(),
        Err(e) => format!("(unusable: {})", e),
    };
    vec![
        format!("User config:    {}", user),
        format!("Project config: {}", layer_line(project)),
        format!("Hub endpoint:   {}", endpoint),
    ]
}

fn layer_line(path: &Path) -> String {
    let status = if path.exists() { "" } else { " (not present)" };
    format!("{}{}", path.display(), status)
}
