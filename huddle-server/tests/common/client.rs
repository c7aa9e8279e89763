//! WebSocket test client for protocol testing
//!
//! Provides both low-level WsConnection and high-level TestClient.

use std::net::SocketAddr;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use huddle_core::{ClientMessage, RoomSnapshot, ServerMessage, decode_server_frame};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Low-level WebSocket connection
pub struct WsConnection {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

impl WsConnection {
    /// Connect to WebSocket endpoint
    pub async fn connect(addr: SocketAddr) -> Self {
        let url = format!("ws://{}/ws", addr);
        let (ws, _) = tokio_tungstenite::connect_async(&url)
            .await
            .expect("Failed to connect");
        let (sink, stream) = ws.split();
        Self { sink, stream }
    }

    /// Send raw text message
    pub async fn send_raw(&mut self, msg: &str) {
        self.sink
            .send(Message::Text(msg.to_string().into()))
            .await
            .unwrap();
    }

    /// Send a typed client message
    pub async fn send(&mut self, msg: &ClientMessage) {
        let json = msg.encode().unwrap();
        self.send_raw(&json).await;
    }

    /// Receive raw text message
    pub async fn recv_raw(&mut self) -> String {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return text.to_string(),
                Some(Ok(_)) => continue,
                Some(Err(e)) => panic!("WebSocket error: {}", e),
                None => panic!("WebSocket closed"),
            }
        }
    }

    /// Receive and decode a server message
    pub async fn recv(&mut self) -> ServerMessage {
        let text = self.recv_raw().await;
        decode_server_frame(&text).expect("Failed to decode server frame")
    }

    /// Receive with timeout, returns None if timeout
    pub async fn recv_timeout(&mut self, duration: Duration) -> Option<String> {
        tokio::time::timeout(duration, self.recv_raw()).await.ok()
    }

    /// Close the connection
    pub async fn close(mut self) {
        let _ = self.sink.send(Message::Close(None)).await;
    }
}

/// High-level test client with helper methods
pub struct TestClient {
    pub conn: WsConnection,
    pub id: String,
}

impl TestClient {
    /// Connect to server (consumes the initial assignedId message)
    #[allow(dead_code)]
    pub async fn connect(addr: SocketAddr) -> Self {
        let mut conn = WsConnection::connect(addr).await;

        let id = match conn.recv().await {
            ServerMessage::AssignedId { id } => id,
            other => panic!("Expected assignedId on connect, got {:?}", other),
        };

        Self { conn, id }
    }

    /// Send a typed client message
    #[allow(dead_code)]
    pub async fn send(&mut self, msg: ClientMessage) {
        self.conn.send(&msg).await;
    }

    /// Receive the next snapshot
    #[allow(dead_code)]
    pub async fn next_snapshot(&mut self) -> RoomSnapshot {
        match self.conn.recv().await {
            ServerMessage::GameState(snapshot) => snapshot,
            other => panic!("Expected gameState, got {:?}", other),
        }
    }

    /// Receive snapshots until one satisfies `predicate`
    #[allow(dead_code)]
    pub async fn snapshot_where<F>(&mut self, predicate: F) -> RoomSnapshot
    where
        F: Fn(&RoomSnapshot) -> bool,
    {
        let wait = async {
            loop {
                let snapshot = self.next_snapshot().await;
                if predicate(&snapshot) {
                    return snapshot;
                }
            }
        };
        tokio::time::timeout(Duration::from_secs(5), wait)
            .await
            .expect("Timed out waiting for matching snapshot")
    }

    /// Assert no message received within duration
    #[allow(dead_code)]
    pub async fn expect_no_message(&mut self, duration: Duration) {
        assert!(
            self.conn.recv_timeout(duration).await.is_none(),
            "Expected no message but received one"
        );
    }

    /// Close the connection
    #[allow(dead_code)]
    pub async fn close(self) {
        self.conn.close().await;
    }
}
