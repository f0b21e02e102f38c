use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    #[error("presence endpoint unavailable: {0}")]
    EndpointUnavailable(String),

    #[error("presence session channel closed")]
    ChannelClosed,

    #[error("game state unavailable: {0}")]
    GameState(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
