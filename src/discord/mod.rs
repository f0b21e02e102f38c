mod presence;

pub use presence::{DiscordBackend, DISCORD_APP_ID};
