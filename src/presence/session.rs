//! Connection lifecycle and send suppression for a presence backend

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use super::record::PresenceRecord;
use super::traits::{EndpointEvent, EventSink, PresenceBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Connecting,
    Ready,
    Disposed,
}

/// Result of a send request. Failures are logged, never returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Forwarded to the backend
    Sent,
    /// Identical to the last forwarded record, or nothing to patch
    Suppressed,
    /// The backend could not take it; retried on the next call
    Deferred,
}

/// Observation passed to sent hooks after a successful transmission
#[derive(Debug, Clone, Copy)]
pub enum PresenceSent<'a> {
    Presence(&'a PresenceRecord),
    Cleared,
}

type SentHook = Box<dyn FnMut(PresenceSent<'_>) + Send>;

pub struct PresenceSession {
    backend: Box<dyn PresenceBackend>,
    state: SessionState,
    needs_connect: bool,
    generation: u64,
    events_tx: mpsc::UnboundedSender<(u64, EndpointEvent)>,
    events_rx: mpsc::UnboundedReceiver<(u64, EndpointEvent)>,
    last_sent: Option<PresenceRecord>,
    sent_hooks: Vec<SentHook>,
}

impl PresenceSession {
    /// Create a session. No connection is made until the first send.
    pub fn new(backend: Box<dyn PresenceBackend>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            state: SessionState::Uninitialized,
            needs_connect: true,
            generation: 0,
            events_tx,
            events_rx,
            last_sent: None,
            sent_hooks: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// The last record the backend accepted, if the endpoint still shows it
    pub fn last_sent(&self) -> Option<&PresenceRecord> {
        self.last_sent.as_ref()
    }

    /// Register a hook called after every successful transmission
    pub fn on_presence_sent(&mut self, hook: impl FnMut(PresenceSent<'_>) + Send + 'static) {
        self.sent_hooks.push(Box::new(hook));
    }

    pub fn set_presence(&mut self, record: PresenceRecord) -> SendOutcome {
        self.poll_events();

        if self.last_sent.as_ref() == Some(&record) {
            tracing::trace!("Skipping identical presence");
            return SendOutcome::Suppressed;
        }

        if !self.ensure_connected() {
            return SendOutcome::Deferred;
        }

        match self.backend.set_activity(&record) {
            Ok(()) => {
                tracing::debug!("Presence sent via {}: {:?}", self.backend.name(), record);
                for hook in &mut self.sent_hooks {
                    hook(PresenceSent::Presence(&record));
                }
                self.last_sent = Some(record);
                SendOutcome::Sent
            }
            Err(e) => {
                tracing::warn!("Failed to send presence via {}: {}", self.backend.name(), e);
                self.mark_lost();
                SendOutcome::Deferred
            }
        }
    }

    pub fn clear_presence(&mut self) -> SendOutcome {
        self.poll_events();

        if !self.ensure_connected() {
            return SendOutcome::Deferred;
        }

        match self.backend.clear_activity() {
            Ok(()) => {
                tracing::debug!("Presence cleared via {}", self.backend.name());
                self.last_sent = None;
                for hook in &mut self.sent_hooks {
                    hook(PresenceSent::Cleared);
                }
                SendOutcome::Sent
            }
            Err(e) => {
                tracing::warn!("Failed to clear presence via {}: {}", self.backend.name(), e);
                self.mark_lost();
                SendOutcome::Deferred
            }
        }
    }

    /// Re-send the last record with a new start timestamp
    pub fn update_start_time(&mut self, start: Option<DateTime<Utc>>) -> SendOutcome {
        match self.last_sent.clone() {
            Some(record) => self.set_presence(record.with_start(start)),
            None => SendOutcome::Suppressed,
        }
    }

    /// Apply endpoint notifications queued since the last call.
    ///
    /// Only the connection flags change here; nothing is sent.
    pub fn poll_events(&mut self) {
        while let Ok((generation, event)) = self.events_rx.try_recv() {
            if generation != self.generation || self.state == SessionState::Disposed {
                tracing::trace!("Ignoring stale endpoint event {:?}", event);
                continue;
            }

            match event {
                EndpointEvent::Ready => {
                    tracing::info!("{} presence endpoint ready", self.backend.name());
                    self.state = SessionState::Ready;
                }
                EndpointEvent::Error(message) => {
                    tracing::warn!("{} presence endpoint error: {}", self.backend.name(), message);
                }
                EndpointEvent::Disconnected(reason) => {
                    tracing::info!(
                        "{} presence endpoint disconnected: {}",
                        self.backend.name(),
                        reason
                    );
                    self.mark_lost();
                }
                EndpointEvent::MessageReceived(message) => {
                    tracing::trace!("{} presence endpoint message: {}", self.backend.name(), message);
                }
            }
        }
    }

    /// Release the endpoint connection. Any later call reconnects.
    pub fn dispose(&mut self) {
        if self.state == SessionState::Disposed {
            return;
        }

        self.backend.disconnect();
        self.generation += 1;
        self.state = SessionState::Disposed;
        self.needs_connect = true;
        self.last_sent = None;
        tracing::info!("{} presence session disposed", self.backend.name());
    }

    fn ensure_connected(&mut self) -> bool {
        if !self.needs_connect {
            return true;
        }

        self.generation += 1;
        self.state = SessionState::Connecting;
        let sink = EventSink::new(self.generation, self.events_tx.clone());

        tracing::info!("Connecting to {} presence endpoint", self.backend.name());
        match self.backend.connect(sink) {
            Ok(()) => {
                self.needs_connect = false;
                true
            }
            Err(e) => {
                tracing::warn!("{} presence endpoint not available: {}", self.backend.name(), e);
                false
            }
        }
    }

    /// The endpoint dropped us; it no longer shows what we last sent
    fn mark_lost(&mut self) {
        self.state = SessionState::Connecting;
        self.needs_connect = true;
        self.last_sent = None;
    }
}

impl Drop for PresenceSession {
    fn drop(&mut self) {
        self.dispose();
    }
}
