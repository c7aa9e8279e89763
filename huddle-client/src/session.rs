//! Session facade for a presentation layer

use huddle_core::{
    ArrowKey, AvatarKind, InputController, LocalView, OutboundIntent, Point, RoomBounds,
};
use tokio::sync::watch;

use crate::connection::{ConnectionManager, Disposer};

/// Everything a presentation layer needs to take part in a room
///
/// No method takes a participant id: a session can only act as the
/// participant the hub assigned to it.
#[derive(Debug)]
pub struct SessionClient {
    connection: ConnectionManager,
    input: InputController,
    /// Identity the input controller last acted for
    identity: Option<String>,
    disposer: Option<Disposer>,
}

impl SessionClient {
    pub fn new(connection: ConnectionManager, bounds: RoomBounds) -> Self {
        Self::with_input(connection, InputController::new(bounds))
    }

    pub fn with_input(connection: ConnectionManager, input: InputController) -> Self {
        Self {
            connection,
            input,
            identity: None,
            disposer: None,
        }
    }

    /// Open the channel to the hub (no-op if already open)
    pub fn connect(&mut self) -> Disposer {
        let disposer = self.connection.connect();
        self.disposer = Some(disposer.clone());
        disposer
    }

    /// Close the channel and stop reconnecting
    ///
    /// Also runs when the session is dropped.
    pub fn disconnect(&mut self) {
        if let Some(disposer) = self.disposer.take() {
            disposer.dispose();
        }
        self.input.reset();
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn input(&self) -> &InputController {
        &self.input
    }

    pub fn view(&self) -> LocalView {
        self.connection.view()
    }

    pub fn subscribe(&self) -> watch::Receiver<LocalView> {
        self.connection.subscribe()
    }

    /// Start dragging if `point` is on the local avatar
    pub fn pointer_down(&mut self, point: Point) -> bool {
        self.drive_input(|input, view| input.pointer_down(view, point))
    }

    /// Send a move while dragging; returns whether one was sent
    pub fn pointer_move(&mut self, point: Point) -> bool {
        let intent = self.drive_input(|input, view| input.pointer_move(view, point));
        intent.is_some_and(|intent| self.connection.send(intent))
    }

    pub fn pointer_up(&mut self) {
        self.input.pointer_up();
    }

    /// Send one step in the direction of `key`; returns whether it was sent
    pub fn arrow_key(&mut self, key: ArrowKey) -> bool {
        let intent = self.drive_input(|input, view| input.arrow_key(view, key));
        intent.is_some_and(|intent| self.connection.send(intent))
    }

    /// Broadcast a chat bubble; blank text is ignored
    pub fn submit_chat(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.connection.send(OutboundIntent::Chat {
            text: text.to_string(),
        })
    }

    /// Set the display name and avatar; a blank name is ignored
    pub fn submit_profile(&self, name: &str, avatar: AvatarKind) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.connection.send(OutboundIntent::SetProfile {
            name: name.to_string(),
            avatar,
        })
    }

    /// Run `f` against the current view, dropping drag state first if the
    /// hub has assigned a different identity since the last input.
    fn drive_input<R>(&mut self, f: impl FnOnce(&mut InputController, &LocalView) -> R) -> R {
        let Self {
            connection,
            input,
            identity,
            ..
        } = self;
        connection.with_view(|view| {
            if view.own_id() != identity.as_deref() {
                input.reset();
                *identity = view.own_id().map(str::to_owned);
            }
            f(input, view)
        })
    }
}

impl Drop for SessionClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}
