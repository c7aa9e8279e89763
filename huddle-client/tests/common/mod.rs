//! Shared test utilities for huddle-client integration tests

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use huddle_client::{ConnectionManager, ReconnectConfig, SessionClient};
use huddle_core::{ClientMessage, LocalView, RoomBounds, ServerMessage, decode_client_frame};
use huddle_server::{AppState, HuddleServer, ServerConfig};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};

/// Spawns a real hub on an ephemeral port, returns state and address
#[allow(dead_code)]
pub async fn spawn_hub() -> (Arc<AppState>, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(AppState::default());
    let server = HuddleServer::with_state(ServerConfig::default(), Arc::clone(&state));

    tokio::spawn(async move {
        let _ = server.run_with_listener(listener).await;
    });

    // Brief delay to ensure server is accepting connections
    tokio::time::sleep(Duration::from_millis(10)).await;

    (state, addr)
}

/// Reconnection fast enough for tests
#[allow(dead_code)]
pub fn fast_reconnect() -> ReconnectConfig {
    ReconnectConfig {
        initial_delay: Duration::from_millis(50),
        ..ReconnectConfig::default()
    }
}

/// A session pointed at `addr` with default room bounds
#[allow(dead_code)]
pub fn session_for(addr: SocketAddr) -> SessionClient {
    let manager = ConnectionManager::new(format!("ws://{}/ws", addr), fast_reconnect());
    SessionClient::new(manager, RoomBounds::default())
}

/// Wait until the published view satisfies `predicate`
#[allow(dead_code)]
pub async fn wait_for_view<F>(rx: &mut watch::Receiver<LocalView>, predicate: F) -> LocalView
where
    F: FnMut(&LocalView) -> bool,
{
    let view = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
        .await
        .expect("Timed out waiting for view")
        .expect("View sender dropped");
    view.clone()
}

/// Scripted hub for driving the client through exact frame sequences
#[allow(dead_code)]
pub struct FakeHub {
    listener: TcpListener,
    pub addr: SocketAddr,
}

#[allow(dead_code)]
impl FakeHub {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        Self { listener, addr }
    }

    pub fn url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Accept the next client connection
    pub async fn accept(&self) -> HubSide {
        let accept = async {
            let (stream, _) = self.listener.accept().await.unwrap();
            accept_async(stream).await.unwrap()
        };
        let ws = tokio::time::timeout(Duration::from_secs(5), accept)
            .await
            .expect("Timed out waiting for client connection");
        HubSide { ws }
    }
}

/// The hub's end of one client connection
#[allow(dead_code)]
pub struct HubSide {
    ws: WebSocketStream<TcpStream>,
}

#[allow(dead_code)]
impl HubSide {
    pub async fn send(&mut self, msg: &ServerMessage) {
        self.send_raw(&msg.encode().unwrap()).await;
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.ws
            .send(Message::Text(text.to_string().into()))
            .await
            .unwrap();
    }

    /// Receive the next client message, None if the client went away
    pub async fn recv(&mut self) -> Option<ClientMessage> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Some(decode_client_frame(text.as_str()).unwrap());
                }
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return None,
                Some(Ok(_)) => continue,
            }
        }
    }

    pub async fn recv_timeout(&mut self, duration: Duration) -> Option<ClientMessage> {
        tokio::time::timeout(duration, self.recv()).await.ok().flatten()
    }

    /// Drop the connection without a close handshake
    pub fn drop_connection(self) {
        drop(self.ws);
    }
}
