use dashmap::DashMap;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Event name clients subscribe to for upload progress.
pub const ON_UPLOAD_EVENT: &str = "file-upload";

/// Frames buffered per session before new ones are dropped.
pub const SESSION_QUEUE_CAPACITY: usize = 64;

/// Best-effort delivery of named events to a single push session.
///
/// Implementations must not block and must never fail the caller: a session
/// that is unknown or gone is simply skipped.
pub trait ProgressNotifier: Send + Sync {
    fn notify(&self, session_id: &str, event: &str, payload: Value);
}

/// Notifier for setups without a push transport; it only remembers what it
/// was asked to send.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    calls: std::sync::Mutex<Vec<(String, String, Value)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(session_id, event, payload)` in call order.
    pub fn calls(&self) -> Vec<(String, String, Value)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl ProgressNotifier for RecordingNotifier {
    fn notify(&self, session_id: &str, event: &str, payload: Value) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((session_id.to_string(), event.to_string(), payload));
        }
    }
}

/// Registry of connected WebSocket sessions.
///
/// Each socket owns the receiving half of a bounded channel; the hub keeps
/// the sending half keyed by the session id handed to the client on connect.
/// A client that stops reading loses frames once its queue is full.
#[derive(Debug, Default)]
pub struct SocketHub {
    sessions: DashMap<String, mpsc::Sender<String>>,
}

impl SocketHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self) -> (String, mpsc::Receiver<String>) {
        let id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(SESSION_QUEUE_CAPACITY);
        self.sessions.insert(id.clone(), tx);
        tracing::debug!("🔌 Push session {} registered", id);
        (id, rx)
    }

    pub fn unregister(&self, session_id: &str) {
        if self.sessions.remove(session_id).is_some() {
            tracing::debug!("🔌 Push session {} removed", session_id);
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn frame(event: &str, payload: Value) -> String {
        json!({ "event": event, "data": payload }).to_string()
    }
}

impl ProgressNotifier for SocketHub {
    fn notify(&self, session_id: &str, event: &str, payload: Value) {
        let frame = Self::frame(event, payload);

        // The map guard must be released before a stale entry can be removed.
        let delivered = self
            .sessions
            .get(session_id)
            .map(|tx| tx.try_send(frame));

        match delivered {
            Some(Ok(())) => {}
            Some(Err(mpsc::error::TrySendError::Full(_))) => {
                tracing::debug!("Push session {} is lagging, dropping '{}'", session_id, event);
            }
            Some(Err(mpsc::error::TrySendError::Closed(_))) => {
                tracing::debug!("Push session {} is closed, dropping '{}'", session_id, event);
                self.unregister(session_id);
            }
            None => {
                tracing::debug!("No push session {}, dropping '{}'", session_id, event);
            }
        }
    }
}
