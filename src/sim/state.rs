//! Game state and core simulation types
//!
//! Everything the tick mutates lives here, owned by `GameState`. Renderers and
//! audio only ever see it through `Snapshot` and drained `GameEvent`s.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::barrier::Barrier;
use super::rect::{Rect, direction};
use super::swarm::Swarm;
use super::tick::TickInput;
use crate::consts::*;
use crate::settings::Difficulty;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Simulation frozen until resumed
    Paused,
    /// Run ended; only a restart is accepted
    GameOver,
}

/// Discrete notifications for presentation layers (audio, HUD flashes).
/// Emitted in the order they happen within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PlayerFired,
    InvaderFired { row: usize, col: usize },
    /// The swarm took one horizontal step; `march_step` cycles 0..4
    SwarmStepped { march_step: u8 },
    InvaderKilled { row: usize, col: usize, points: u32 },
    UfoSpawned,
    UfoKilled { points: u32 },
    /// A life was lost; `lives` is what remains
    PlayerHit { lives: u8 },
    /// `id` is the barrier's stable `Barrier::id`, not its position
    BarrierDamaged { id: usize },
    WaveCleared { wave: u32 },
    NewHighScore { score: u32 },
    GameOver { score: u32 },
    Paused,
    Resumed,
    Reset,
}

/// Invader tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvaderKind {
    Small,
    Medium,
    Large,
}

/// Static per-tier data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindInfo {
    pub points: u32,
    /// Sprite sheet key; frame index is appended by the renderer
    pub sprite: &'static str,
}

const KIND_TABLE: [KindInfo; 3] = [
    KindInfo { points: 30, sprite: "invader_small" },
    KindInfo { points: 20, sprite: "invader_medium" },
    KindInfo { points: 10, sprite: "invader_large" },
];

impl InvaderKind {
    /// Tier for a grid row: top row small, next two medium, rest large
    pub fn for_row(row: usize) -> Self {
        match row {
            0 => InvaderKind::Small,
            1 | 2 => InvaderKind::Medium,
            _ => InvaderKind::Large,
        }
    }

    pub fn info(self) -> &'static KindInfo {
        &KIND_TABLE[self as usize]
    }

    pub fn points(self) -> u32 {
        self.info().points
    }
}

/// A single invader. Dead invaders stay in the grid as tombstones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invader {
    pub row: usize,
    pub col: usize,
    pub kind: InvaderKind,
    pub pos: Vec2,
    pub alive: bool,
    /// Animation frame (0 or 1)
    pub frame: u8,
}

impl Invader {
    pub fn new(row: usize, col: usize, pos: Vec2) -> Self {
        Self {
            row,
            col,
            kind: InvaderKind::for_row(row),
            pos,
            alive: true,
            frame: 0,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::at(self.pos, INVADER_WIDTH, INVADER_HEIGHT)
    }

    /// Mark dead. There is no way back short of rebuilding the swarm.
    pub fn hit(&mut self) {
        self.alive = false;
    }
}

/// A projectile. Player and invaders share the same shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub alive: bool,
}

impl Bullet {
    /// A live bullet whose top edge is centered horizontally on `muzzle`
    pub fn fired(muzzle: Vec2, dir: Vec2, speed: f32) -> Self {
        let mut bullet = Self::default();
        bullet.fire(muzzle, dir, speed);
        bullet
    }

    /// (Re)launch this bullet from `muzzle`
    pub fn fire(&mut self, muzzle: Vec2, dir: Vec2, speed: f32) {
        self.pos = Vec2::new(muzzle.x - BULLET_WIDTH / 2.0, muzzle.y);
        self.vel = direction(dir) * speed;
        self.alive = true;
    }

    pub fn update(&mut self, dt: f32) {
        if !self.alive {
            return;
        }
        self.pos += self.vel * (dt / 1000.0);
        if self.pos.y < 0.0 || self.pos.y > PLAYFIELD_HEIGHT {
            self.alive = false;
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::at(self.pos, BULLET_WIDTH, BULLET_HEIGHT)
    }

    /// Center of the edge facing the direction of travel
    pub fn leading_point(&self) -> Vec2 {
        let b = self.bounds();
        let y = if self.vel.y > 0.0 { b.bottom() } else { b.y };
        Vec2::new(b.x + b.w / 2.0, y)
    }

    pub fn hit(&mut self) {
        self.alive = false;
    }
}

/// The player's cannon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub lives: u8,
    /// Remaining invulnerability (ms); zero when vulnerable
    pub invulnerable_ms: f32,
    /// Remaining time before the next shot is allowed (ms)
    pub fire_cooldown_ms: f32,
    /// The one bullet this player owns; refired only once inert
    pub bullet: Bullet,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_START_X, PLAYER_START_Y),
            lives: PLAYER_START_LIVES,
            invulnerable_ms: 0.0,
            fire_cooldown_ms: PLAYER_FIRE_COOLDOWN_MS,
            bullet: Bullet::default(),
        }
    }
}

impl Player {
    pub fn bounds(&self) -> Rect {
        Rect::at(self.pos, PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_ms > 0.0
    }

    /// Advance timers, apply movement, and fire if allowed.
    /// Returns true when a shot was fired this call.
    pub fn update(&mut self, dt: f32, input: &TickInput) -> bool {
        self.invulnerable_ms = (self.invulnerable_ms - dt).max(0.0);
        self.fire_cooldown_ms = (self.fire_cooldown_ms - dt).max(0.0);

        let mut dx = 0.0;
        if input.move_left {
            dx -= 1.0;
        }
        if input.move_right {
            dx += 1.0;
        }
        self.pos.x = (self.pos.x + dx * PLAYER_SPEED * dt / 1000.0)
            .clamp(0.0, PLAYFIELD_WIDTH - PLAYER_WIDTH);

        if input.fire && !self.bullet.alive && self.fire_cooldown_ms <= 0.0 {
            let muzzle = Vec2::new(self.pos.x + PLAYER_WIDTH / 2.0, self.pos.y);
            self.bullet.fire(muzzle, Vec2::NEG_Y, PLAYER_BULLET_SPEED);
            self.fire_cooldown_ms = PLAYER_FIRE_COOLDOWN_MS;
            return true;
        }
        false
    }

    /// Take a hit. Returns false (and changes nothing) while invulnerable.
    pub fn hit(&mut self) -> bool {
        if self.is_invulnerable() {
            return false;
        }
        self.lives = self.lives.saturating_sub(1);
        self.invulnerable_ms = PLAYER_INVULNERABLE_MS;
        true
    }
}

/// The bonus target crossing the top of the screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ufo {
    pub pos: Vec2,
    pub alive: bool,
    /// Time until the next appearance (ms); only counts down while inactive
    pub respawn_ms: f32,
}

impl Ufo {
    pub fn new(rng: &mut impl Rng) -> Self {
        Self {
            pos: Vec2::new(-UFO_WIDTH, UFO_Y),
            alive: false,
            respawn_ms: Self::respawn_delay(rng),
        }
    }

    fn respawn_delay(rng: &mut impl Rng) -> f32 {
        rng.random_range(UFO_SPAWN_MIN_MS..=UFO_SPAWN_MAX_MS)
    }

    pub fn bounds(&self) -> Rect {
        Rect::at(self.pos, UFO_WIDTH, UFO_HEIGHT)
    }

    /// Fly across, or count down to the next appearance.
    /// Returns true on the tick the UFO appears.
    pub fn update(&mut self, dt: f32, rng: &mut impl Rng) -> bool {
        if self.alive {
            self.pos.x += UFO_SPEED * dt / 1000.0;
            if self.pos.x > PLAYFIELD_WIDTH {
                self.deactivate(rng);
            }
            return false;
        }

        self.respawn_ms -= dt;
        if self.respawn_ms <= 0.0 {
            self.spawn();
            return true;
        }
        false
    }

    /// Enter from the left edge
    pub fn spawn(&mut self) {
        self.alive = true;
        self.pos = Vec2::new(-UFO_WIDTH, UFO_Y);
    }

    /// Destroyed by the player; returns the randomly drawn reward
    pub fn hit(&mut self, rng: &mut impl Rng) -> u32 {
        self.deactivate(rng);
        UFO_REWARDS[rng.random_range(0..UFO_REWARDS.len())]
    }

    fn deactivate(&mut self, rng: &mut impl Rng) {
        self.alive = false;
        self.respawn_ms = Self::respawn_delay(rng);
    }
}

/// Multi-frame explosion effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub pos: Vec2,
    pub frame: u8,
    pub frame_elapsed_ms: f32,
    pub alive: bool,
}

impl Explosion {
    pub fn new(center: Vec2) -> Self {
        Self {
            pos: center - Vec2::new(EXPLOSION_WIDTH, EXPLOSION_HEIGHT) / 2.0,
            frame: 0,
            frame_elapsed_ms: 0.0,
            alive: true,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if !self.alive {
            return;
        }
        self.frame_elapsed_ms += dt;
        if self.frame_elapsed_ms >= EXPLOSION_FRAME_MS {
            self.frame += 1;
            self.frame_elapsed_ms = 0.0;
            if self.frame >= EXPLOSION_FRAMES {
                self.alive = false;
            }
        }
    }
}

/// Floating reward text shown where the bonus target died
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePopup {
    pub center: Vec2,
    pub points: u32,
    pub elapsed_ms: f32,
    pub alive: bool,
}

impl ScorePopup {
    pub fn new(center: Vec2, points: u32) -> Self {
        Self {
            center,
            points,
            elapsed_ms: 0.0,
            alive: true,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if !self.alive {
            return;
        }
        self.elapsed_ms += dt;
        if self.elapsed_ms >= POPUP_DURATION_MS {
            self.alive = false;
        }
    }
}

/// Current and best score
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Scoreboard {
    pub score: u32,
    pub high_score: u32,
}

impl Scoreboard {
    /// Add points; returns true when this set a new high score
    pub fn add(&mut self, points: u32) -> bool {
        self.score = self.score.saturating_add(points);
        if self.score > self.high_score {
            self.high_score = self.score;
            return true;
        }
        false
    }
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub difficulty: Difficulty,
    pub phase: GamePhase,
    pub scoreboard: Scoreboard,
    /// Waves cleared so far
    pub wave: u32,
    /// Simulated time while playing (ms)
    pub time_ms: f64,
    pub player: Player,
    pub swarm: Swarm,
    pub invader_bullets: Vec<Bullet>,
    pub barriers: Vec<Barrier>,
    pub ufo: Ufo,
    pub explosions: Vec<Explosion>,
    pub popups: Vec<ScorePopup>,
    /// Events produced since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game with the given seed and difficulty
    pub fn new(seed: u64, difficulty: Difficulty) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let swarm = Swarm::new(difficulty.multipliers(), &mut rng);
        let ufo = Ufo::new(&mut rng);
        Self {
            seed,
            rng,
            difficulty,
            phase: GamePhase::Playing,
            scoreboard: Scoreboard::default(),
            wave: 0,
            time_ms: 0.0,
            player: Player::default(),
            swarm,
            invader_bullets: Vec::new(),
            barriers: Barrier::standard_row(),
            ufo,
            explosions: Vec::new(),
            popups: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Seed the best score from persistent storage
    pub fn with_high_score(mut self, high_score: u32) -> Self {
        self.scoreboard.high_score = high_score;
        self
    }

    pub fn score(&self) -> u32 {
        self.scoreboard.score
    }

    pub fn high_score(&self) -> u32 {
        self.scoreboard.high_score
    }

    /// Rebuild every entity and timer as at construction. The high score and
    /// the RNG stream carry over.
    pub fn reset(&mut self) {
        log::info!("Resetting game (high score {})", self.scoreboard.high_score);
        let high_score = self.scoreboard.high_score;
        self.phase = GamePhase::Playing;
        self.scoreboard = Scoreboard {
            score: 0,
            high_score,
        };
        self.wave = 0;
        self.time_ms = 0.0;
        self.player = Player::default();
        self.swarm = Swarm::new(self.difficulty.multipliers(), &mut self.rng);
        self.invader_bullets.clear();
        self.barriers = Barrier::standard_row();
        self.ufo = Ufo::new(&mut self.rng);
        self.explosions.clear();
        self.popups.clear();
        self.events.push(GameEvent::Reset);
    }

    /// Take all events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only view for renderers
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            phase: self.phase,
            score: self.scoreboard.score,
            high_score: self.scoreboard.high_score,
            lives: self.player.lives,
            wave: self.wave,
            player: &self.player,
            invaders: self.swarm.invaders(),
            invader_bullets: &self.invader_bullets,
            barriers: &self.barriers,
            ufo: &self.ufo,
            explosions: &self.explosions,
            popups: &self.popups,
        }
    }
}

/// Borrowed per-frame view of everything a renderer draws
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub phase: GamePhase,
    pub score: u32,
    pub high_score: u32,
    pub lives: u8,
    pub wave: u32,
    pub player: &'a Player,
    pub invaders: &'a [Invader],
    pub invader_bullets: &'a [Bullet],
    pub barriers: &'a [Barrier],
    pub ufo: &'a Ufo,
    pub explosions: &'a [Explosion],
    pub popups: &'a [ScorePopup],
}
