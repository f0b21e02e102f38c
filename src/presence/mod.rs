mod context;
mod hash;
mod manager;
mod record;
mod session;
mod synthesizer;
mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{
    CrossRealmParty, GameState, InstancedContent, Job, OnlineStatus, PartyRoster, PlayerSnapshot,
    QueueEstimator, QueueStatus, SynthesisContext, Territory, World, FOUR_PLAYER_CONTENT_TYPE,
};
pub use hash::{anonymize, anonymize_id};
pub use manager::{run_tick_loop, PresenceContext, PresenceManager};
pub use record::{
    ImageAsset, Party, PresenceRecord, PresenceRecordBuilder, Timestamps, MAX_FIELD_BYTES,
};
pub use session::{PresenceSent, PresenceSession, SendOutcome, SessionState};
pub use synthesizer::PresenceSynthesizer;
pub use traits::{EndpointEvent, EventSink, PresenceBackend};
