use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::PresenceError;

/// Switches for every presence behavior; read as a snapshot on each tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RichPresenceConfig {
    pub reset_time_when_changing_zones: bool,
    pub show_start_time: bool,
    pub show_login_queue_position: bool,
    pub show_name: bool,
    pub show_free_company: bool,
    pub show_world: bool,
    pub show_job: bool,
    pub abbreviate_job: bool,
    pub show_level: bool,
    pub show_party: bool,
    pub show_afk: bool,
}

impl Default for RichPresenceConfig {
    fn default() -> Self {
        Self {
            reset_time_when_changing_zones: true,
            show_start_time: false,
            show_login_queue_position: true,
            show_name: true,
            show_free_company: true,
            show_world: true,
            show_job: true,
            abbreviate_job: false,
            show_level: true,
            show_party: true,
            show_afk: false,
        }
    }
}

pub fn load_settings(path: &Path) -> Result<RichPresenceConfig, PresenceError> {
    tracing::debug!("Loading settings from {}", path.display());

    if !path.exists() {
        return Ok(RichPresenceConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(|source| PresenceError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(serde_json::from_str(&contents)?)
}
