//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time advances only through explicit `dt` arguments
//! - Seeded RNG only, passed in by the caller
//! - Stable iteration order (grid row-major, collections in spawn order)
//! - No rendering, audio or platform dependencies

pub mod barrier;
pub mod collision;
pub mod rect;
pub mod state;
pub mod swarm;
pub mod tick;

pub use barrier::Barrier;
pub use collision::resolve;
pub use rect::Rect;
pub use state::{
    Bullet, Explosion, GameEvent, GamePhase, GameState, Invader, InvaderKind, Player,
    ScorePopup, Snapshot, Ufo,
};
pub use swarm::{Swarm, SwarmStep, move_interval_for};
pub use tick::tick;
