//! WebSocket connection lifecycle for the session client
//!
//! A [`ConnectionManager`] owns at most one channel to the hub. When the
//! channel drops it schedules exactly one reconnection timer; the timer and
//! the channel never coexist. Everything the hub sends is folded into a
//! [`LocalView`] published on a `watch` channel.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use futures_util::{SinkExt, StreamExt};
use huddle_core::{
    ClientMessage, DeferredTask, LocalView, OutboundIntent, ProtocolError, decode_server_frame,
};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::endpoint::endpoint_from_origin;
use crate::error::ClientError;
use crate::reconnect::ReconnectConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Connecting,
    Open,
}

#[derive(Debug)]
struct ConnectionState {
    phase: Phase,
    /// Frames queued here are written in order by the connection task
    outbound: Option<mpsc::UnboundedSender<String>>,
    reconnect_timer: Option<DeferredTask>,
    /// Cancelled by the matching [`Disposer`]
    lifecycle: Option<CancellationToken>,
    /// Bumped for every attempt and on dispose; stale tasks compare against it
    generation: u64,
    /// Consecutive failures since the last successful open
    failures: u32,
    attempts: u64,
}

struct Inner {
    url: String,
    reconnect: ReconnectConfig,
    state: Mutex<ConnectionState>,
    view: watch::Sender<LocalView>,
}

/// Owned handle to the client's channel to the hub
///
/// Cheap to clone; clones share the same channel and view.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("ConnectionManager")
            .field("url", &self.inner.url)
            .field("phase", &state.phase)
            .field("attempts", &state.attempts)
            .finish()
    }
}

impl ConnectionManager {
    /// Create a manager for the hub at `url` (e.g. "ws://127.0.0.1:8080/ws")
    pub fn new(url: impl Into<String>, reconnect: ReconnectConfig) -> Self {
        let (view, _) = watch::channel(LocalView::new());
        Self {
            inner: Arc::new(Inner {
                url: url.into(),
                reconnect,
                state: Mutex::new(ConnectionState {
                    phase: Phase::Idle,
                    outbound: None,
                    reconnect_timer: None,
                    lifecycle: None,
                    generation: 0,
                    failures: 0,
                    attempts: 0,
                }),
                view,
            }),
        }
    }

    /// Create a manager for the hub serving `origin`
    pub fn from_origin(origin: &str, reconnect: ReconnectConfig) -> Result<Self, ClientError> {
        let url: Url = endpoint_from_origin(origin)?;
        Ok(Self::new(url.as_str(), reconnect))
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Open the channel unless one is open or being opened
    ///
    /// Must be called from within a tokio runtime. The returned [`Disposer`]
    /// tears the connection down and cancels any pending reconnection.
    pub fn connect(&self) -> Disposer {
        let mut state = self.inner.lock();
        let token = match &state.lifecycle {
            Some(token) if !token.is_cancelled() => token.clone(),
            _ => {
                let token = CancellationToken::new();
                state.lifecycle = Some(token.clone());
                token
            }
        };

        if state.phase == Phase::Idle {
            if let Some(timer) = state.reconnect_timer.take() {
                timer.cancel();
            }
            Inner::start_attempt(&self.inner, &mut state, token.clone());
        } else {
            debug!(phase = ?state.phase, "connect ignored, channel already active");
        }

        Disposer {
            manager: self.clone(),
            token,
        }
    }

    /// Queue an intent on the open channel
    ///
    /// Returns false, and drops the intent, when no channel is open.
    pub fn send(&self, intent: OutboundIntent) -> bool {
        self.send_message(ClientMessage::from(intent))
    }

    pub fn send_message(&self, message: ClientMessage) -> bool {
        let state = self.inner.lock();
        let Some(outbound) = state.outbound.as_ref().filter(|_| state.phase == Phase::Open) else {
            debug!(kind = message.kind(), "dropping message while disconnected");
            return false;
        };
        match message.encode() {
            Ok(json) => outbound.send(json).is_ok(),
            Err(e) => {
                warn!("Failed to encode {}: {}", message.kind(), e);
                false
            }
        }
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().phase == Phase::Open
    }

    /// Whether a reconnection timer is waiting to fire
    pub fn reconnect_pending(&self) -> bool {
        self.inner.lock().reconnect_timer.is_some()
    }

    /// Total connection attempts started, including the first
    pub fn connection_attempts(&self) -> u64 {
        self.inner.lock().attempts
    }

    /// Receive every change to the local view
    pub fn subscribe(&self) -> watch::Receiver<LocalView> {
        self.inner.view.subscribe()
    }

    /// A copy of the current local view
    pub fn view(&self) -> LocalView {
        self.inner.view.borrow().clone()
    }

    /// Inspect the current local view without copying it
    ///
    /// Do not call back into the manager from `f`.
    pub fn with_view<R>(&self, f: impl FnOnce(&LocalView) -> R) -> R {
        f(&self.inner.view.borrow())
    }
}

/// Tears down the connection started by [`ConnectionManager::connect`]
#[derive(Debug, Clone)]
pub struct Disposer {
    manager: ConnectionManager,
    token: CancellationToken,
}

impl Disposer {
    /// Close the channel and cancel any pending reconnection
    ///
    /// Calling it again does nothing.
    pub fn dispose(&self) {
        if self.token.is_cancelled() {
            return;
        }
        self.token.cancel();
        self.manager.inner.teardown();
    }

    pub fn is_disposed(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, ConnectionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn start_attempt(this: &Arc<Self>, state: &mut ConnectionState, token: CancellationToken) {
        state.phase = Phase::Connecting;
        state.generation += 1;
        state.attempts += 1;
        tokio::spawn(Self::run(Arc::clone(this), token, state.generation));
    }

    /// Own one channel from dial to close
    async fn run(self: Arc<Self>, token: CancellationToken, generation: u64) {
        debug!(url = %self.url, generation, "Connecting to hub");
        let connected = tokio::select! {
            biased;
            _ = token.cancelled() => return,
            result = connect_async(self.url.as_str()) => result,
        };
        let ws = match connected {
            Ok((ws, _response)) => ws,
            Err(source) => {
                let err = ClientError::Connect {
                    url: self.url.clone(),
                    source,
                };
                warn!("{}", err);
                self.closed(generation, &token);
                return;
            }
        };

        let (mut sink, mut stream) = ws.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        {
            let mut state = self.lock();
            if token.is_cancelled() || state.generation != generation {
                return;
            }
            state.phase = Phase::Open;
            state.outbound = Some(tx);
            state.failures = 0;
        }
        self.view.send_modify(LocalView::mark_connected);
        info!(url = %self.url, "Connected to hub");

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
                Some(json) = rx.recv() => {
                    if let Err(e) = sink.send(Message::Text(json.into())).await {
                        warn!("Failed to send frame: {}", e);
                        break;
                    }
                }
                msg = stream.next() => match msg {
                    Some(Ok(Message::Text(text))) => self.dispatch(text.as_str()),
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("Hub closed the connection");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    }
                },
            }
        }

        self.closed(generation, &token);
    }

    fn dispatch(&self, text: &str) {
        match decode_server_frame(text) {
            Ok(message) => {
                let now = Instant::now();
                debug!(kind = message.kind(), "received frame");
                self.view.send_modify(|view| {
                    if view.apply(message, now) {
                        debug!(own_id = ?view.own_id(), "identity assigned");
                    }
                });
            }
            Err(ProtocolError::UnknownMessageType(kind)) => {
                debug!(kind = %kind, "ignoring unknown message type");
            }
            Err(e) => warn!("Dropping frame: {}", e),
        }
    }

    /// The channel of `generation` is gone; schedule the next attempt
    fn closed(self: &Arc<Self>, generation: u64, token: &CancellationToken) {
        let mut state = self.lock();
        if state.generation != generation {
            return;
        }
        state.phase = Phase::Idle;
        state.outbound = None;
        self.forget_connection();

        if token.is_cancelled() {
            return;
        }
        if !self.reconnect.allows(state.failures) {
            warn!(failures = state.failures, "Giving up on reconnecting");
            return;
        }

        let delay = self.reconnect.delay_for_attempt(state.failures);
        state.failures = state.failures.saturating_add(1);
        info!(?delay, "Connection lost, scheduling reconnection");

        let inner = Arc::clone(self);
        let token = token.clone();
        state.reconnect_timer = Some(DeferredTask::spawn(delay, move || async move {
            inner.reconnect_due(token, generation);
        }));
    }

    /// The timer scheduled when the channel of `generation` closed has fired
    ///
    /// A later attempt or a dispose bumps the generation; the timer then
    /// belongs to nobody and must not touch the current one.
    fn reconnect_due(self: &Arc<Self>, token: CancellationToken, generation: u64) {
        let mut state = self.lock();
        if state.generation != generation {
            debug!(generation, current = state.generation, "stale reconnection timer");
            return;
        }
        state.reconnect_timer = None;
        if token.is_cancelled() || state.phase != Phase::Idle {
            return;
        }
        Self::start_attempt(self, &mut state, token);
    }

    fn teardown(&self) {
        let mut state = self.lock();
        if let Some(timer) = state.reconnect_timer.take() {
            timer.cancel();
        }
        state.phase = Phase::Idle;
        state.outbound = None;
        state.generation += 1;
        self.forget_connection();
        info!(url = %self.url, "Connection disposed");
    }

    fn forget_connection(&self) {
        self.view.send_if_modified(|view| {
            let was_connected = view.is_connected();
            view.mark_disconnected() || was_connected
        });
    }
}
