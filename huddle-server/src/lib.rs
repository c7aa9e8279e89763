//! huddle-server - Room hub for huddle
//!
//! Holds the authoritative participant map for one room, merges each
//! client's messages into it and rebroadcasts the full snapshot to every
//! connected client after each change.

mod error;
pub mod http;
pub mod room;
mod state;
pub mod ws;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub use error::ServerError;
pub use http::create_router;
pub use room::{PositionUpdate, Room, RoomConfig};
pub use state::AppState;

/// The main huddle server
pub struct HuddleServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl HuddleServer {
    /// Create a new server with a fresh room
    pub fn new(config: ServerConfig) -> Self {
        let state = Arc::new(AppState::new(config.room.clone()));
        Self { config, state }
    }

    /// Create a server with custom state (for testing)
    pub fn with_state(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the shared application state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Run the server on the configured address until Ctrl-C
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        tracing::info!("huddle server listening on {}", addr);

        self.serve(listener, shutdown_signal()).await
    }

    /// Run the server on an already-bound listener until the process ends
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        self.serve(listener, std::future::pending()).await
    }

    /// Serve until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let maintenance = CancellationToken::new();
        self.start_maintenance(maintenance.clone());
        let _stop_maintenance = maintenance.drop_guard();

        let router = create_router(self.state);
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

        tracing::info!("huddle server stopped");
        Ok(())
    }

    /// Start the background task that applies pending positions and expires bubbles
    fn start_maintenance(&self, token: CancellationToken) {
        let room = Arc::clone(&self.state.room);
        let period = room.config().tick_interval.max(std::time::Duration::from_millis(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if room.tick(Instant::now()).await {
                            tracing::trace!("maintenance tick changed room state");
                        }
                    }
                }
            }
            tracing::debug!("Room maintenance stopped");
        });
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

/// Default port for the huddle server
pub const DEFAULT_PORT: u16 = 8080;
/// Default host for the huddle server
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Room tuning
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl ServerConfig {
    /// Create a new ServerConfig with the specified host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            room: RoomConfig::default(),
        }
    }

    #[must_use]
    pub fn with_room(mut self, room: RoomConfig) -> Self {
        self.room = room;
        self
    }

    /// Returns the socket address string (e.g., "127.0.0.1:8080")
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
