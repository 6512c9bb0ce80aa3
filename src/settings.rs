//! Game settings and preferences
//!
//! Persisted by the host as JSON; the core only reads them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::KeyBindings;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How many players share the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PlayerMode {
    #[default]
    Single,
    Two,
}

impl PlayerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerMode::Single => "1 player",
            PlayerMode::Two => "2 players",
        }
    }

    /// Player names paired with their key layout
    pub fn roster(&self) -> Vec<(String, KeyBindings)> {
        match self {
            PlayerMode::Single => vec![("Player 1".to_string(), KeyBindings::single_player())],
            PlayerMode::Two => vec![
                ("Player 1".to_string(), KeyBindings::player_one()),
                ("Player 2".to_string(), KeyBindings::player_two()),
            ],
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub player_mode: PlayerMode,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            player_mode: PlayerMode::Single,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse settings, falling back to defaults on bad input
    pub fn load_or_default(json: Option<&str>) -> Self {
        match json.map(Self::from_json) {
            Some(Ok(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Some(Err(e)) => {
                log::warn!("Ignoring stored settings: {}", e);
                Self::default()
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Effective sfx channel volume (0 when muted)
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0) * self.sfx_volume.clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_sizes() {
        assert_eq!(PlayerMode::Single.roster().len(), 1);
        let two = PlayerMode::Two.roster();
        assert_eq!(two.len(), 2);
        assert_eq!(two[1].0, "Player 2");
    }

    #[test]
    fn test_bad_json_falls_back() {
        let settings = Settings::load_or_default(Some("[1, 2"));
        assert_eq!(settings.player_mode, PlayerMode::Single);
    }

    #[test]
    fn test_partial_json() {
        let settings = Settings::from_json(r#"{ "player_mode": "Two", "muted": true }"#).unwrap();
        assert_eq!(settings.player_mode, PlayerMode::Two);
        assert_eq!(settings.effective_sfx_volume(), 0.0);
        assert_eq!(settings.sfx_volume, 1.0);
    }

    #[test]
    fn test_stale_hud_keys_ignored() {
        let settings = Settings::from_json(r#"{ "show_fps": false, "master_volume": 0.5 }"#).unwrap();
        assert_eq!(settings.master_volume, 0.5);
        assert!(!settings.to_json().contains("show_fps"));
    }
}
