//! Drives synthesis from host ticks and lifecycle events

use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;

use super::context::{GameState, QueueEstimator, SynthesisContext};
use super::record::PresenceRecord;
use super::session::{PresenceSent, PresenceSession, SendOutcome};
use super::synthesizer::PresenceSynthesizer;
use super::traits::PresenceBackend;
use crate::error::PresenceError;
use crate::localization::Localizer;
use crate::settings::RichPresenceConfig;

/// Host-provided collaborators, constructed once and handed to the manager
pub struct PresenceContext {
    pub game: Box<dyn GameState>,
    pub queue: Box<dyn QueueEstimator>,
    pub localizer: Box<dyn Localizer>,
}

/// Owns the session and synthesizer; the host calls [`tick`](Self::tick) once per frame
pub struct PresenceManager {
    context: PresenceContext,
    config: RichPresenceConfig,
    session: PresenceSession,
    synthesizer: PresenceSynthesizer,
}

impl PresenceManager {
    /// Create the manager and request the menu presence
    pub fn new(
        context: PresenceContext,
        backend: Box<dyn PresenceBackend>,
        config: RichPresenceConfig,
    ) -> Self {
        tracing::info!("Starting rich presence with {} backend", backend.name());
        let mut manager = Self {
            context,
            config,
            session: PresenceSession::new(backend),
            synthesizer: PresenceSynthesizer::new(Utc::now()),
        };
        manager.set_default_presence();
        manager
    }

    pub fn config(&self) -> &RichPresenceConfig {
        &self.config
    }

    /// Replace the config snapshot; used from the next tick on
    pub fn set_config(&mut self, config: RichPresenceConfig) {
        tracing::debug!("Presence config updated: {:?}", config);
        self.config = config;
    }

    pub fn session(&self) -> &PresenceSession {
        &self.session
    }

    pub fn on_presence_sent(&mut self, hook: impl FnMut(PresenceSent<'_>) + Send + 'static) {
        self.session.on_presence_sent(hook);
    }

    /// One synthesis pass. Faults are logged and the tick is dropped.
    pub fn tick(&mut self) -> Option<SendOutcome> {
        self.session.poll_events();

        match self.synthesize() {
            Ok(Some(record)) => Some(self.deliver(record)),
            Ok(None) => None,
            Err(e) => {
                tracing::error!("Could not update presence: {}", e);
                None
            }
        }
    }

    pub fn on_login(&mut self) -> Option<SendOutcome> {
        tracing::debug!("Login, recomputing presence");
        self.update_start_time();
        self.tick()
    }

    pub fn on_territory_changed(&mut self, territory_id: u32) -> Option<SendOutcome> {
        tracing::debug!("Territory changed to {}, recomputing presence", territory_id);
        self.update_start_time();
        self.tick()
    }

    pub fn on_logout(&mut self) -> SendOutcome {
        tracing::debug!("Logout, showing menu presence");
        self.set_default_presence()
    }

    /// Clear what the endpoint shows and release the connection
    pub fn shutdown(&mut self) {
        tracing::info!("Shutting down rich presence");
        self.session.clear_presence();
        self.session.dispose();
    }

    fn synthesize(&mut self) -> Result<Option<PresenceRecord>, PresenceError> {
        let ctx = SynthesisContext::capture(self.context.game.as_ref(), self.context.queue.as_ref())?;
        Ok(self.synthesizer.synthesize(
            &ctx,
            &self.config,
            self.context.localizer.as_ref(),
            Utc::now(),
        ))
    }

    fn set_default_presence(&mut self) -> SendOutcome {
        let record = self.synthesizer.default_record(
            &self.config,
            self.context.localizer.as_ref(),
            Utc::now(),
        );
        self.deliver(record)
    }

    /// Deferred records are recomputed on a later tick
    fn deliver(&mut self, record: PresenceRecord) -> SendOutcome {
        let outcome = self.session.set_presence(record);
        if outcome != SendOutcome::Deferred {
            self.synthesizer.confirm_delivery();
        }
        outcome
    }

    fn update_start_time(&mut self) {
        let start = self.synthesizer.reset_start_time(&self.config, Utc::now());
        if start.is_some() {
            self.session.update_start_time(start);
        }
    }
}

/// Tick `manager` every `period` until `shutdown` turns true or its sender is dropped
pub async fn run_tick_loop(
    manager: &mut PresenceManager,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            _ = interval.tick() => {
                manager.tick();
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    tracing::debug!("Presence tick loop stopped");
}
