use std::time::Duration;

use huddle_client::ReconnectConfig;
use huddle_core::RoomBounds;
use huddle_server::RoomConfig;
use serde::{Deserialize, Serialize};

pub use huddle_server::{DEFAULT_HOST, DEFAULT_PORT};

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawHuddleConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub room: RawRoomConfig,

    #[serde(default)]
    pub client: RawClientConfig,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRoomConfig {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub message_ttl_secs: Option<u64>,
    pub position_interval_ms: Option<u64>,
    pub tick_interval_ms: Option<u64>,
    pub max_chat_len: Option<usize>,
    pub max_name_len: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawClientConfig {
    pub origin: Option<String>,
    pub reconnect_delay_ms: Option<u64>,
    pub reconnect_multiplier: Option<f64>,
    pub reconnect_max_delay_ms: Option<u64>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HuddleConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub room: RoomSection,

    #[serde(default)]
    pub client: ClientSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    /// Address the hub binds to
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomSection {
    pub width: f64,
    pub height: f64,
    /// How long chat bubbles stay up
    pub message_ttl_secs: u64,
    /// Minimum spacing of applied moves per participant, 0 to disable
    pub position_interval_ms: u64,
    pub tick_interval_ms: u64,
    pub max_chat_len: usize,
    pub max_name_len: usize,
}

impl Default for RoomSection {
    fn default() -> Self {
        let room = RoomConfig::default();
        Self {
            width: room.bounds.width,
            height: room.bounds.height,
            message_ttl_secs: room.message_ttl.as_secs(),
            position_interval_ms: duration_ms(room.position_interval),
            tick_interval_ms: duration_ms(room.tick_interval),
            max_chat_len: room.max_chat_len,
            max_name_len: room.max_name_len,
        }
    }
}

impl RoomSection {
    pub fn bounds(&self) -> RoomBounds {
        RoomBounds::new(self.width, self.height)
    }

    pub fn to_room_config(&self) -> RoomConfig {
        RoomConfig {
            bounds: self.bounds(),
            message_ttl: Duration::from_secs(self.message_ttl_secs),
            position_interval: Duration::from_millis(self.position_interval_ms),
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            max_chat_len: self.max_chat_len,
            max_name_len: self.max_name_len,
            ..RoomConfig::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientSection {
    /// Origin the hub is served from; the WebSocket URL is derived from it
    pub origin: String,
    pub reconnect_delay_ms: u64,
    /// 1.0 keeps the delay fixed
    pub reconnect_multiplier: f64,
    pub reconnect_max_delay_ms: u64,
}

impl Default for ClientSection {
    fn default() -> Self {
        let reconnect = ReconnectConfig::default();
        Self {
            origin: format!("http://{}:{}", DEFAULT_HOST, DEFAULT_PORT),
            reconnect_delay_ms: duration_ms(reconnect.initial_delay),
            reconnect_multiplier: reconnect.multiplier,
            reconnect_max_delay_ms: duration_ms(reconnect.max_delay),
        }
    }
}

impl ClientSection {
    pub fn reconnect_config(&self) -> ReconnectConfig {
        ReconnectConfig {
            initial_delay: Duration::from_millis(self.reconnect_delay_ms),
            max_delay: Duration::from_millis(self.reconnect_max_delay_ms),
            multiplier: self.reconnect_multiplier,
            max_attempts: None,
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = HuddleConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.room.width, 1920.0);
        assert_eq!(config.room.height, 1080.0);
        assert_eq!(config.room.message_ttl_secs, 5);
        assert_eq!(config.room.position_interval_ms, 50);
        assert_eq!(config.room.max_chat_len, 280);
        assert_eq!(config.client.origin, "http://127.0.0.1:8080");
        assert_eq!(config.client.reconnect_delay_ms, 2000);
        assert_eq!(config.client.reconnect_multiplier, 1.0);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = HuddleConfig {
            server: ServerSection {
                host: "0.0.0.0".to_string(),
                port: 9000,
            },
            room: RoomSection {
                width: 800.0,
                message_ttl_secs: 10,
                ..Default::default()
            },
            ..Default::default()
        };

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: HuddleConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_raw_config_partial_parsing() {
        let toml_str = r#"
[server]
port = 9000

[room]
message_ttl_secs = 3
"#;
        let raw: RawHuddleConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(raw.server.port, Some(9000));
        assert!(raw.server.host.is_none());
        assert_eq!(raw.room.message_ttl_secs, Some(3));
        assert!(raw.room.width.is_none());
        assert!(raw.client.origin.is_none());
    }

    #[test]
    fn test_raw_config_empty_uses_none() {
        let raw: RawHuddleConfig = toml::from_str("").unwrap();
        assert!(raw.server.port.is_none());
        assert!(raw.room.max_name_len.is_none());
        assert!(raw.client.reconnect_delay_ms.is_none());
    }

    #[test]
    fn test_room_section_to_room_config() {
        let section = RoomSection {
            width: 640.0,
            height: 480.0,
            message_ttl_secs: 2,
            position_interval_ms: 0,
            ..Default::default()
        };
        let room = section.to_room_config();
        assert_eq!(room.bounds, RoomBounds::new(640.0, 480.0));
        assert_eq!(room.message_ttl, Duration::from_secs(2));
        assert_eq!(room.position_interval, Duration::ZERO);
        assert_eq!(room.broadcast_capacity, RoomConfig::default().broadcast_capacity);
    }

    #[test]
    fn test_client_section_reconnect_config() {
        let section = ClientSection {
            reconnect_delay_ms: 500,
            reconnect_multiplier: 2.0,
            reconnect_max_delay_ms: 4000,
            ..Default::default()
        };
        let reconnect = section.reconnect_config();
        assert_eq!(reconnect.delay_for_attempt(0), Duration::from_millis(500));
        assert_eq!(reconnect.delay_for_attempt(5), Duration::from_millis(4000));
    }
}
