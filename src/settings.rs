//! Game settings and difficulty presets
//!
//! Persisted separately from the high score: a JSON file on native, LocalStorage
//! on the web. Anything missing or malformed falls back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use crate::highscores::local_storage;

/// LocalStorage item name
pub const STORAGE_KEY: &str = "pixel_invaders_settings";

/// Difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// Scale factors applied to the swarm's cadence intervals.
/// Values below 1.0 make the swarm faster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyMultipliers {
    pub invader_move_interval: f32,
    pub invader_shoot_interval: f32,
}

impl Default for DifficultyMultipliers {
    fn default() -> Self {
        Difficulty::Normal.multipliers()
    }
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn multipliers(&self) -> DifficultyMultipliers {
        match self {
            Difficulty::Easy => DifficultyMultipliers {
                invader_move_interval: 1.25,
                invader_shoot_interval: 1.5,
            },
            Difficulty::Normal => DifficultyMultipliers {
                invader_move_interval: 1.0,
                invader_shoot_interval: 1.0,
            },
            Difficulty::Hard => DifficultyMultipliers {
                invader_move_interval: 0.75,
                invader_shoot_interval: 0.6,
            },
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    /// Fixed run seed; a fresh random seed is drawn per run when absent
    pub seed: Option<u64>,
}

impl Settings {
    /// Parse settings JSON, falling back to defaults when malformed
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring malformed settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file; a missing file means defaults
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                log::info!("Loaded settings from {}", path.display());
                Self::from_json(&json)
            }
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Browser counterpart of `load_from`
    #[cfg(target_arch = "wasm32")]
    pub fn load_local() -> Self {
        match local_storage().and_then(|s| s.get_item(STORAGE_KEY).ok().flatten()) {
            Some(json) => Self::from_json(&json),
            None => Self::default(),
        }
    }

    /// Browser counterpart of `save_to`; failures are logged
    #[cfg(target_arch = "wasm32")]
    pub fn save_local(&self) {
        let Some(storage) = local_storage() else {
            log::warn!("LocalStorage unavailable, settings not saved");
            return;
        };
        match self.to_json() {
            Ok(json) => {
                if storage.set_item(STORAGE_KEY, &json).is_err() {
                    log::warn!("Failed to save settings");
                }
            }
            Err(e) => log::warn!("Failed to encode settings: {}", e),
        }
    }
}
