//! Rich presence for a running game session.
//!
//! A host calls [`PresenceManager::tick`] once per frame. The manager reads the
//! game state through the [`GameState`] and [`QueueEstimator`] collaborators,
//! builds a [`PresenceRecord`] and hands it to a [`PresenceSession`], which
//! keeps the connection to the presence endpoint alive and drops repeats.

pub mod discord;
pub mod error;
pub mod localization;
pub mod logging;
pub mod presence;
pub mod settings;

pub use discord::DiscordBackend;
pub use error::PresenceError;
pub use localization::{Audience, EnglishLocalizer, Localizer};
pub use presence::{
    anonymize, GameState, PresenceBackend, PresenceContext, PresenceManager, PresenceRecord,
    PresenceSession, QueueEstimator,
};
pub use settings::{load_settings, RichPresenceConfig};
