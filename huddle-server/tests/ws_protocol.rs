//! WebSocket protocol integration tests
//!
//! These tests drive the hub over real sockets:
//! - Identity assignment on connect
//! - Merging of position, profile and chat updates
//! - Broadcast to every connected participant

mod common;

use std::time::Duration;

use common::client::{TestClient, WsConnection};
use huddle_core::{ClientMessage, Point, ServerMessage};
use huddle_server::RoomConfig;

#[tokio::test]
async fn assigned_id_precedes_first_snapshot() {
    let (_state, addr) = common::create_test_server().await;
    let mut conn = WsConnection::connect(addr).await;

    let id = match conn.recv().await {
        ServerMessage::AssignedId { id } => id,
        other => panic!("Expected assignedId, got {:?}", other),
    };
    match conn.recv().await {
        ServerMessage::GameState(snapshot) => assert!(snapshot.contains(&id)),
        other => panic!("Expected gameState, got {:?}", other),
    }
}

#[tokio::test]
async fn new_participant_gets_defaults() {
    let (_state, addr) = common::create_test_server().await;
    let mut client = TestClient::connect(addr).await;

    let snapshot = client.next_snapshot().await;
    let me = snapshot.get(&client.id).unwrap();
    assert_eq!(me.position(), Point::new(100.0, 100.0));
    assert_eq!(me.name, "");
    assert_eq!(me.sprite_type, "ghost");
    assert_eq!(me.message, None);
}

#[tokio::test]
async fn profile_then_move_is_merged_and_seen_by_others() {
    let (_state, addr) = common::create_test_server().await;
    let mut ann = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;
    let ann_id = ann.id.clone();

    ann.send(ClientMessage::SetPlayerInfo {
        name: "Ann".into(),
        sprite_type: "cat".into(),
    })
    .await;
    ann.send(ClientMessage::UpdatePosition { x: 50.0, y: 60.0 }).await;

    let seen = bob
        .snapshot_where(|s| s.get(&ann_id).is_some_and(|p| p.x == 50.0))
        .await;
    let entry = seen.get(&ann_id).unwrap();
    assert_eq!(entry.name, "Ann");
    assert_eq!(entry.sprite_type, "cat");
    assert_eq!(entry.position(), Point::new(50.0, 60.0));
    assert!(seen.contains(&bob.id));
}

#[tokio::test]
async fn disconnect_removes_participant_for_others() {
    let (state, addr) = common::create_test_server().await;
    let mut stay = TestClient::connect(addr).await;
    let leave = TestClient::connect(addr).await;
    let leave_id = leave.id.clone();

    stay.snapshot_where(|s| s.contains(&leave_id)).await;
    leave.close().await;

    let snapshot = stay.snapshot_where(|s| !s.contains(&leave_id)).await;
    assert_eq!(snapshot.len(), 1);
    assert_eq!(state.room.participant_count().await, 1);
}

#[tokio::test]
async fn malformed_frames_are_dropped_without_side_effects() {
    let (_state, addr) = common::create_test_server().await;
    let mut sender = TestClient::connect(addr).await;
    let mut watcher = TestClient::connect(addr).await;
    sender.next_snapshot().await;
    sender.next_snapshot().await;
    watcher.next_snapshot().await;

    sender.conn.send_raw("not json").await;
    sender
        .conn
        .send_raw(r#"{"type":"teleport","payload":{}}"#)
        .await;
    watcher.expect_no_message(Duration::from_millis(150)).await;

    // The offending connection stays usable.
    sender
        .send(ClientMessage::SendMessage {
            message: "still here".into(),
        })
        .await;
    let sender_id = sender.id.clone();
    let snapshot = watcher
        .snapshot_where(|s| s.get(&sender_id).is_some_and(|p| p.message.is_some()))
        .await;
    assert_eq!(
        snapshot.get(&sender_id).unwrap().message.as_deref(),
        Some("still here")
    );
}

#[tokio::test]
async fn positions_are_reclamped_to_room_bounds() {
    let (_state, addr) = common::create_test_server().await;
    let mut client = TestClient::connect(addr).await;
    let id = client.id.clone();

    client
        .send(ClientMessage::UpdatePosition {
            x: -40.0,
            y: 99_999.0,
        })
        .await;
    let snapshot = client
        .snapshot_where(|s| s.get(&id).is_some_and(|p| p.x == 0.0))
        .await;
    assert_eq!(snapshot.get(&id).unwrap().y, 1080.0);
}

#[tokio::test]
async fn chat_bubble_expires_after_ttl() {
    let (_state, addr) = common::create_test_server_with_room(RoomConfig {
        message_ttl: Duration::from_millis(200),
        tick_interval: Duration::from_millis(20),
        ..RoomConfig::default()
    })
    .await;
    let mut client = TestClient::connect(addr).await;
    let id = client.id.clone();

    client
        .send(ClientMessage::SendMessage {
            message: "hello".into(),
        })
        .await;
    let shown = client
        .snapshot_where(|s| s.get(&id).is_some_and(|p| p.message.is_some()))
        .await;
    let ttl = shown.get(&id).unwrap().message_ttl_ms.unwrap();
    assert!(ttl <= 200);

    let cleared = client
        .snapshot_where(|s| s.get(&id).is_some_and(|p| p.message.is_none()))
        .await;
    assert_eq!(cleared.get(&id).unwrap().message_ttl_ms, None);
}

#[tokio::test]
async fn rapid_moves_settle_on_last_position() {
    let (_state, addr) = common::create_test_server().await;
    let mut client = TestClient::connect(addr).await;
    let id = client.id.clone();

    for step in 0..20 {
        client
            .send(ClientMessage::UpdatePosition {
                x: 200.0 + f64::from(step),
                y: 300.0,
            })
            .await;
    }

    let snapshot = client
        .snapshot_where(|s| s.get(&id).is_some_and(|p| p.x == 219.0))
        .await;
    assert_eq!(snapshot.get(&id).unwrap().y, 300.0);
}
