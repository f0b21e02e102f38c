//! Per-tick snapshot of the game state the synthesizer reads

use std::time::Duration;

use crate::error::PresenceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: u32,
    pub name: String,
    pub abbreviation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnlineStatus {
    /// English name, used to detect away status regardless of client language
    pub name_en: String,
    /// Name in the client language, shown to others
    pub name: String,
}

impl OnlineStatus {
    pub fn is_away(&self) -> bool {
        self.name_en.contains("Away from Keyboard")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSnapshot {
    pub name: String,
    pub current_world: World,
    pub home_world: World,
    pub company_tag: String,
    pub job: Job,
    pub level: u32,
    pub online_status: Option<OnlineStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Territory {
    pub id: u32,
    pub place_name: Option<String>,
    pub region: Option<String>,
    pub loading_image: u32,
}

/// Content type of four-player duties (dungeons)
pub const FOUR_PLAYER_CONTENT_TYPE: u32 = 2;

/// Instanced content (duty) bound to a territory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstancedContent {
    pub content_type: u32,
}

impl InstancedContent {
    pub fn max_party_size(&self) -> u32 {
        if self.content_type == FOUR_PLAYER_CONTENT_TYPE {
            4
        } else {
            8
        }
    }
}

/// Local party. An empty roster has size 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartyRoster {
    pub party_id: u64,
    pub size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossRealmParty {
    pub member_content_ids: Vec<u64>,
}

impl CrossRealmParty {
    /// Lowest content id: the same member is picked by every client in the party
    pub fn representative_id(&self) -> Option<u64> {
        self.member_content_ids.iter().copied().min()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStatus {
    /// Negative while the position is not known yet
    pub position: i32,
    pub estimate: Option<Duration>,
}

impl QueueStatus {
    pub fn is_known(&self) -> bool {
        self.position >= 0
    }
}

/// Game state accessors provided by the host
pub trait GameState: Send {
    /// `None` while no character is loaded into the world
    fn local_player(&self) -> Result<Option<PlayerSnapshot>, PresenceError>;

    fn territory_id(&self) -> u32;

    fn territory(&self, id: u32) -> Option<Territory>;

    fn instanced_content(&self, territory_id: u32) -> Option<InstancedContent>;

    fn party(&self) -> Result<PartyRoster, PresenceError>;

    /// `None` unless a cross-realm party is active
    fn cross_realm_party(&self) -> Result<Option<CrossRealmParty>, PresenceError>;
}

/// Login queue information supplied by another component
pub trait QueueEstimator: Send {
    fn is_in_login_queue(&self) -> bool;

    fn queue_position(&self) -> i32;

    fn queue_estimate(&self) -> Option<Duration>;
}

/// Everything one tick needs, read up front from the accessors
#[derive(Debug, Clone, Default)]
pub struct SynthesisContext {
    pub player: Option<PlayerSnapshot>,
    pub territory_id: u32,
    pub territory: Option<Territory>,
    pub instanced_content: Option<InstancedContent>,
    pub party: PartyRoster,
    pub cross_realm_party: Option<CrossRealmParty>,
    pub queue: Option<QueueStatus>,
}

impl SynthesisContext {
    pub fn capture(
        game: &dyn GameState,
        estimator: &dyn QueueEstimator,
    ) -> Result<Self, PresenceError> {
        let Some(player) = game.local_player()? else {
            let queue = estimator.is_in_login_queue().then(|| QueueStatus {
                position: estimator.queue_position(),
                estimate: estimator.queue_estimate(),
            });
            return Ok(Self {
                queue,
                ..Self::default()
            });
        };

        let territory_id = game.territory_id();
        let (territory, instanced_content) = if territory_id != 0 {
            (
                game.territory(territory_id),
                game.instanced_content(territory_id),
            )
        } else {
            (None, None)
        };

        Ok(Self {
            player: Some(player),
            territory_id,
            territory,
            instanced_content,
            party: game.party()?,
            cross_realm_party: game.cross_realm_party()?,
            queue: None,
        })
    }
}
