//! High score persistence
//!
//! A single integer kept under a fixed storage key. Unreadable or malformed
//! values count as "no high score yet" (zero), never as a failure.

use std::path::{Path, PathBuf};

/// Storage key (LocalStorage item name, or file name on native)
pub const STORAGE_KEY: &str = "pixel_invaders_high_score";

/// Parse a persisted value; anything that isn't a non-negative integer is absent
pub fn parse_high_score(raw: &str) -> Option<u32> {
    serde_json::from_str::<u32>(raw.trim()).ok()
}

/// Where the high score lives between sessions
pub trait HighScoreStore {
    /// Stored high score, or 0 when absent or unreadable
    fn load(&self) -> u32;
    /// Persist a new high score. Failures are logged, not surfaced.
    fn save(&mut self, score: u32);
}

/// Volatile store; also handy for tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Raw stored text, exactly as a real backend would hold it
    pub raw: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: &str) -> Self {
        Self {
            raw: Some(raw.to_string()),
        }
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> u32 {
        self.raw.as_deref().and_then(parse_high_score).unwrap_or(0)
    }

    fn save(&mut self, score: u32) {
        self.raw = Some(score.to_string());
    }
}

/// One file named after `STORAGE_KEY` inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(STORAGE_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the score, reporting I/O errors
    pub fn try_save(&self, score: u32) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string(&score)?)
    }
}

impl HighScoreStore for FileStore {
    fn load(&self) -> u32 {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => {
                log::info!("No high score found, starting fresh");
                return 0;
            }
        };
        match parse_high_score(&raw) {
            Some(score) => {
                log::info!("Loaded high score {}", score);
                score
            }
            None => {
                log::warn!("Ignoring malformed high score in {}", self.path.display());
                0
            }
        }
    }

    fn save(&mut self, score: u32) {
        match self.try_save(score) {
            Ok(()) => log::debug!("High score {} saved", score),
            Err(e) => log::warn!("Failed to save high score: {}", e),
        }
    }
}

/// Browser LocalStorage (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

/// The window's LocalStorage, if the browser grants it
#[cfg(target_arch = "wasm32")]
pub(crate) fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
}

#[cfg(target_arch = "wasm32")]
impl HighScoreStore for LocalStore {
    fn load(&self) -> u32 {
        local_storage()
            .and_then(|s| s.get_item(STORAGE_KEY).ok().flatten())
            .and_then(|raw| parse_high_score(&raw))
            .unwrap_or(0)
    }

    fn save(&mut self, score: u32) {
        if let Some(storage) = local_storage() {
            if storage.set_item(STORAGE_KEY, &score.to_string()).is_err() {
                log::warn!("Failed to save high score");
            }
        }
    }
}
