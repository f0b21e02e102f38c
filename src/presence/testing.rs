//! In-memory backend and game state shared by the unit tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::context::{
    CrossRealmParty, GameState, InstancedContent, Job, OnlineStatus, PartyRoster,
    PlayerSnapshot, QueueEstimator, Territory, World,
};
use super::record::PresenceRecord;
use super::traits::{EventSink, PresenceBackend};
use crate::error::PresenceError;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Connect(u64),
    Set(PresenceRecord),
    Clear,
    Disconnect,
}

#[derive(Debug, Default)]
struct BackendInner {
    calls: Vec<Call>,
    sink: Option<EventSink>,
    fail_connect: bool,
    fail_send: bool,
}

/// Records every call; clones share the same log
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    inner: Arc<Mutex<BackendInner>>,
    auto_ready: bool,
}

impl RecordingBackend {
    /// Reports `Ready` as soon as `connect` is called
    pub fn new() -> Self {
        Self {
            inner: Arc::default(),
            auto_ready: true,
        }
    }

    pub fn without_auto_ready() -> Self {
        Self {
            inner: Arc::default(),
            auto_ready: false,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn sent(&self) -> Vec<PresenceRecord> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Set(record) => Some(record),
                _ => None,
            })
            .collect()
    }

    pub fn connect_count(&self) -> usize {
        self.count(|call| matches!(call, Call::Connect(_)))
    }

    pub fn disconnect_count(&self) -> usize {
        self.count(|call| *call == Call::Disconnect)
    }

    pub fn clear_count(&self) -> usize {
        self.count(|call| *call == Call::Clear)
    }

    /// Sink handed over by the most recent successful `connect`
    pub fn sink(&self) -> Option<EventSink> {
        self.inner.lock().unwrap().sink.clone()
    }

    pub fn set_fail_connect(&self, fail: bool) {
        self.inner.lock().unwrap().fail_connect = fail;
    }

    pub fn set_fail_send(&self, fail: bool) {
        self.inner.lock().unwrap().fail_send = fail;
    }

    fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.inner.lock().unwrap().calls.iter().filter(|c| predicate(c)).count()
    }
}

impl PresenceBackend for RecordingBackend {
    fn name(&self) -> &'static str {
        "Recording"
    }

    fn connect(&mut self, events: EventSink) -> Result<(), PresenceError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_connect {
            return Err(PresenceError::EndpointUnavailable("no endpoint".to_string()));
        }
        inner.calls.push(Call::Connect(events.generation()));
        if self.auto_ready {
            events.ready();
        }
        inner.sink = Some(events);
        Ok(())
    }

    fn set_activity(&mut self, record: &PresenceRecord) -> Result<(), PresenceError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_send {
            return Err(PresenceError::ChannelClosed);
        }
        inner.calls.push(Call::Set(record.clone()));
        Ok(())
    }

    fn clear_activity(&mut self) -> Result<(), PresenceError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_send {
            return Err(PresenceError::ChannelClosed);
        }
        inner.calls.push(Call::Clear);
        Ok(())
    }

    fn disconnect(&mut self) {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(Call::Disconnect);
        inner.sink = None;
    }
}

pub fn player() -> PlayerSnapshot {
    PlayerSnapshot {
        name: "Alphinaud Leveilleur".to_string(),
        current_world: World {
            id: 73,
            name: "Adamantoise".to_string(),
        },
        home_world: World {
            id: 73,
            name: "Adamantoise".to_string(),
        },
        company_tag: String::new(),
        job: Job {
            id: 24,
            name: "white mage".to_string(),
            abbreviation: "WHM".to_string(),
        },
        level: 90,
        online_status: None,
    }
}

pub fn away_status() -> OnlineStatus {
    OnlineStatus {
        name_en: "Away from Keyboard".to_string(),
        name: "Abwesend".to_string(),
    }
}

pub fn limsa() -> Territory {
    Territory {
        id: 128,
        place_name: Some("Limsa Lominsa Upper Decks".to_string()),
        region: Some("La Noscea".to_string()),
        loading_image: 2,
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeState {
    pub player: Option<PlayerSnapshot>,
    pub territory_id: u32,
    pub territories: Vec<Territory>,
    pub instanced: Vec<(u32, InstancedContent)>,
    pub party: PartyRoster,
    pub cross_realm_party: Option<CrossRealmParty>,
    pub in_queue: bool,
    pub queue_position: i32,
    pub queue_estimate: Option<Duration>,
    pub fail_player_read: bool,
}

/// Game state and queue estimator backed by a shared, mutable [`FakeState`]
#[derive(Debug, Clone, Default)]
pub struct FakeGame {
    pub state: Arc<Mutex<FakeState>>,
}

impl FakeGame {
    pub fn update(&self, f: impl FnOnce(&mut FakeState)) {
        f(&mut self.state.lock().unwrap());
    }
}

impl GameState for FakeGame {
    fn local_player(&self) -> Result<Option<PlayerSnapshot>, PresenceError> {
        let state = self.state.lock().unwrap();
        if state.fail_player_read {
            return Err(PresenceError::GameState("player table not mapped".to_string()));
        }
        Ok(state.player.clone())
    }

    fn territory_id(&self) -> u32 {
        self.state.lock().unwrap().territory_id
    }

    fn territory(&self, id: u32) -> Option<Territory> {
        let state = self.state.lock().unwrap();
        state.territories.iter().find(|t| t.id == id).cloned()
    }

    fn instanced_content(&self, territory_id: u32) -> Option<InstancedContent> {
        let state = self.state.lock().unwrap();
        state
            .instanced
            .iter()
            .find(|(id, _)| *id == territory_id)
            .map(|(_, content)| *content)
    }

    fn party(&self) -> Result<PartyRoster, PresenceError> {
        Ok(self.state.lock().unwrap().party)
    }

    fn cross_realm_party(&self) -> Result<Option<CrossRealmParty>, PresenceError> {
        Ok(self.state.lock().unwrap().cross_realm_party.clone())
    }
}

impl QueueEstimator for FakeGame {
    fn is_in_login_queue(&self) -> bool {
        self.state.lock().unwrap().in_queue
    }

    fn queue_position(&self) -> i32 {
        self.state.lock().unwrap().queue_position
    }

    fn queue_estimate(&self) -> Option<Duration> {
        self.state.lock().unwrap().queue_estimate
    }
}
