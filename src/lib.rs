//! Pixel Invaders - simulation core for a fixed-formation arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (swarm, barriers, collisions, game state)
//! - `session`: Fixed-step frame driver around the simulation
//! - `input`: Logical actions polled from the platform each frame
//! - `highscores`: Single high score persistence
//! - `settings`: Difficulty presets and persisted preferences

pub mod highscores;
pub mod input;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::{FileStore, HighScoreStore, MemoryStore};
pub use input::{Action, InputSource, TickInput};
pub use session::Session;
pub use settings::{Difficulty, DifficultyMultipliers, Settings};

/// Game configuration constants
///
/// All distances are in playfield units (the fixed 224x256 internal
/// resolution), all durations in milliseconds.
pub mod consts {
    /// Playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 224.0;
    pub const PLAYFIELD_HEIGHT: f32 = 256.0;

    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT_MS: f32 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Frame deltas above this are clamped (tab suspension, debugger stops)
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// Player defaults
    pub const PLAYER_WIDTH: f32 = 13.0;
    pub const PLAYER_HEIGHT: f32 = 8.0;
    pub const PLAYER_START_X: f32 = PLAYFIELD_WIDTH / 2.0;
    pub const PLAYER_START_Y: f32 = PLAYFIELD_HEIGHT - 20.0;
    /// Horizontal speed (units per second)
    pub const PLAYER_SPEED: f32 = 100.0;
    pub const PLAYER_START_LIVES: u8 = 3;
    pub const PLAYER_FIRE_COOLDOWN_MS: f32 = 500.0;
    pub const PLAYER_INVULNERABLE_MS: f32 = 2000.0;

    /// Bullets (shared shape for both sides)
    pub const BULLET_WIDTH: f32 = 1.0;
    pub const BULLET_HEIGHT: f32 = 4.0;
    pub const PLAYER_BULLET_SPEED: f32 = 300.0;
    pub const INVADER_BULLET_SPEED: f32 = 120.0;

    /// Invader grid
    pub const SWARM_ROWS: usize = 5;
    pub const SWARM_COLS: usize = 11;
    pub const INVADER_WIDTH: f32 = 8.0;
    pub const INVADER_HEIGHT: f32 = 8.0;
    pub const SWARM_ORIGIN_X: f32 = 30.0;
    pub const SWARM_ORIGIN_Y: f32 = 50.0;
    pub const SWARM_PITCH_X: f32 = 12.0;
    pub const SWARM_PITCH_Y: f32 = 12.0;
    pub const SWARM_STEP_X: f32 = 8.0;
    pub const SWARM_DROP_Y: f32 = 16.0;
    /// Move interval with a full grid alive
    pub const SWARM_BASE_MOVE_MS: f32 = 1000.0;
    pub const SWARM_BASE_SHOOT_MS: f32 = 1000.0;

    /// Bonus target
    pub const UFO_WIDTH: f32 = 16.0;
    pub const UFO_HEIGHT: f32 = 8.0;
    pub const UFO_Y: f32 = 30.0;
    pub const UFO_SPEED: f32 = 50.0;
    pub const UFO_SPAWN_MIN_MS: f32 = 15_000.0;
    pub const UFO_SPAWN_MAX_MS: f32 = 30_000.0;
    pub const UFO_REWARDS: [u32; 4] = [50, 100, 150, 300];

    /// Barriers
    pub const BARRIER_COUNT: usize = 4;
    pub const BARRIER_WIDTH: usize = 24;
    pub const BARRIER_HEIGHT: usize = 18;
    pub const BARRIER_GAP: f32 = 40.0;
    pub const BARRIER_Y: f32 = PLAYFIELD_HEIGHT - 60.0;
    /// Chebyshev radius cleared around a projectile impact
    pub const BARRIER_DAMAGE_RADIUS: i32 = 2;

    /// Effects
    pub const EXPLOSION_WIDTH: f32 = 13.0;
    pub const EXPLOSION_HEIGHT: f32 = 8.0;
    pub const EXPLOSION_FRAME_MS: f32 = 100.0;
    pub const EXPLOSION_FRAMES: u8 = 3;
    pub const POPUP_DURATION_MS: f32 = 1000.0;
}
