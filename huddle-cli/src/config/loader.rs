use super::types::{
    ClientSection, HuddleConfig, RawClientConfig, RawHuddleConfig, RawRoomConfig,
    RawServerConfig, RoomSection, ServerSection,
};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<HuddleConfig> {
        let user_path = Self::user_config_path();
        Self::load_layers(user_path.as_deref(), &Self::project_config_path())
    }

    /// Load and merge the given layers; missing files are skipped
    pub fn load_layers(user_path: Option<&Path>, project_path: &Path) -> Result<HuddleConfig> {
        let mut raw = RawHuddleConfig::default();

        // Layer 1: User config
        if let Some(user_path) = user_path
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read_raw(user_path)?);
        }

        // Layer 2: Project config
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(project_path)?);
        }

        Ok(Self::finalize(raw))
    }

    fn read_raw(path: &Path) -> Result<RawHuddleConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "huddle").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with HUDDLE_PROJECT_CONFIG_DIR env var
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("HUDDLE_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".huddle/config.toml")
        }
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawHuddleConfig, overlay: RawHuddleConfig) -> RawHuddleConfig {
        RawHuddleConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
            },
            room: RawRoomConfig {
                width: overlay.room.width.or(base.room.width),
                height: overlay.room.height.or(base.room.height),
                message_ttl_secs: overlay.room.message_ttl_secs.or(base.room.message_ttl_secs),
                position_interval_ms: overlay
                    .room
                    .position_interval_ms
                    .or(base.room.position_interval_ms),
                tick_interval_ms: overlay.room.tick_interval_ms.or(base.room.tick_interval_ms),
                max_chat_len: overlay.room.max_chat_len.or(base.room.max_chat_len),
                max_name_len: overlay.room.max_name_len.or(base.room.max_name_len),
            },
            client: RawClientConfig {
                origin: overlay.client.origin.or(base.client.origin),
                reconnect_delay_ms: overlay
                    .client
                    .reconnect_delay_ms
                    .or(base.client.reconnect_delay_ms),
                reconnect_multiplier: overlay
                    .client
                    .reconnect_multiplier
                    .or(base.client.reconnect_multiplier),
                reconnect_max_delay_ms: overlay
                    .client
                    .reconnect_max_delay_ms
                    .or(base.client.reconnect_max_delay_ms),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawHuddleConfig) -> HuddleConfig {
        let server = ServerSection::default();
        let room = RoomSection::default();
        let client = ClientSection::default();

        HuddleConfig {
            server: ServerSection {
                host: raw.server.host.unwrap_or(server.host),
                port: raw.server.port.unwrap_or(server.port),
            },
            room: RoomSection {
                width: raw.room.width.unwrap_or(room.width),
                height: raw.room.height.unwrap_or(room.height),
                message_ttl_secs: raw.room.message_ttl_secs.unwrap_or(room.message_ttl_secs),
                position_interval_ms: raw
                    .room
                    .position_interval_ms
                    .unwrap_or(room.position_interval_ms),
                tick_interval_ms: raw.room.tick_interval_ms.unwrap_or(room.tick_interval_ms),
                max_chat_len: raw.room.max_chat_len.unwrap_or(room.max_chat_len),
                max_name_len: raw.room.max_name_len.unwrap_or(room.max_name_len),
            },
            client: ClientSection {
                origin: raw.client.origin.unwrap_or(client.origin),
                reconnect_delay_ms: raw
                    .client
                    .reconnect_delay_ms
                    .unwrap_or(client.reconnect_delay_ms),
                reconnect_multiplier: raw
                    .client
                    .reconnect_multiplier
                    .unwrap_or(client.reconnect_multiplier),
                reconnect_max_delay_ms: raw
                    .client
                    .reconnect_max_delay_ms
                    .unwrap_or(client.reconnect_max_delay_ms),
            },
        }
    }
}
