use tokio::sync::mpsc;

use super::record::PresenceRecord;
use crate::error::PresenceError;

/// Notification pushed by the endpoint outside of any call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointEvent {
    /// Handshake completed, the endpoint accepts activity updates
    Ready,
    Error(String),
    Disconnected(String),
    MessageReceived(String),
}

/// Callback channel handed to a backend on every `connect`.
///
/// Each connection attempt gets its own generation so the session can drop
/// events that belong to a connection it already tore down.
#[derive(Debug, Clone)]
pub struct EventSink {
    generation: u64,
    tx: mpsc::UnboundedSender<(u64, EndpointEvent)>,
}

impl EventSink {
    pub(crate) fn new(generation: u64, tx: mpsc::UnboundedSender<(u64, EndpointEvent)>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn emit(&self, event: EndpointEvent) {
        // The session may already be gone; nothing left to notify
        let _ = self.tx.send((self.generation, event));
    }

    pub fn ready(&self) {
        self.emit(EndpointEvent::Ready);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(EndpointEvent::Error(message.into()));
    }

    pub fn disconnected(&self, reason: impl Into<String>) {
        self.emit(EndpointEvent::Disconnected(reason.into()));
    }

    pub fn message(&self, message: impl Into<String>) {
        self.emit(EndpointEvent::MessageReceived(message.into()));
    }
}

/// A local presence broadcast endpoint (Discord IPC, a native client binding, ...)
///
/// None of these calls may block on endpoint I/O. `connect` starts the
/// handshake and reports its result through the sink.
pub trait PresenceBackend: Send {
    /// Returns the name of this backend (for logging)
    fn name(&self) -> &'static str;

    fn connect(&mut self, events: EventSink) -> Result<(), PresenceError>;

    fn set_activity(&mut self, record: &PresenceRecord) -> Result<(), PresenceError>;

    fn clear_activity(&mut self) -> Result<(), PresenceError>;

    /// Release the connection. Must be safe to call while a handshake is in flight.
    fn disconnect(&mut self);
}
