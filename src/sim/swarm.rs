//! Swarm controller
//!
//! Owns the invader grid and drives its two independent cadences: the march
//! (step sideways, drop and reverse at the walls) and front-line fire.
//!
//! Speed policy: the move interval is recomputed from the alive count after
//! every drop *and* on every kill, so the swarm speeds up immediately when an
//! invader dies rather than at the next wall.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::state::{Bullet, Invader};
use crate::consts::*;
use crate::settings::DifficultyMultipliers;

/// Move interval (ms) for a given number of live invaders.
///
/// Fewer invaders march faster; this curve is the game's difficulty ramp.
pub fn move_interval_for(alive: usize, multipliers: &DifficultyMultipliers) -> f32 {
    let base = match alive {
        0..=1 => 50.0,
        2..=10 => 100.0,
        11..=20 => 200.0,
        21..=30 => 400.0,
        31..=40 => 600.0,
        41..=50 => 800.0,
        _ => SWARM_BASE_MOVE_MS,
    };
    base * multipliers.invader_move_interval
}

/// What happened to the swarm during one `advance`
#[derive(Debug, Default)]
pub struct SwarmStep {
    /// The swarm took a horizontal step
    pub moved: bool,
    /// The step hit a wall: the swarm dropped and reversed
    pub dropped: bool,
    /// Shooter grid cell and its freshly fired bullet
    pub shot: Option<(usize, usize, Bullet)>,
}

/// The invader formation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swarm {
    /// Row-major, `SWARM_ROWS * SWARM_COLS`; dead cells stay as tombstones
    invaders: Vec<Invader>,
    /// +1 marching right, -1 marching left
    direction: f32,
    move_timer_ms: f32,
    move_interval_ms: f32,
    shoot_timer_ms: f32,
    shoot_interval_ms: f32,
    /// Shared animation frame (0 or 1)
    frame: u8,
    /// Four-phase counter for the march beat
    march_step: u8,
    multipliers: DifficultyMultipliers,
}

impl Swarm {
    pub fn new(multipliers: DifficultyMultipliers, rng: &mut impl Rng) -> Self {
        let mut invaders = Vec::with_capacity(SWARM_ROWS * SWARM_COLS);
        for row in 0..SWARM_ROWS {
            for col in 0..SWARM_COLS {
                let pos = Vec2::new(
                    SWARM_ORIGIN_X + col as f32 * SWARM_PITCH_X,
                    SWARM_ORIGIN_Y + row as f32 * SWARM_PITCH_Y,
                );
                invaders.push(Invader::new(row, col, pos));
            }
        }

        let mut swarm = Self {
            invaders,
            direction: 1.0,
            move_timer_ms: 0.0,
            move_interval_ms: 0.0,
            shoot_timer_ms: 0.0,
            shoot_interval_ms: 0.0,
            frame: 0,
            march_step: 0,
            multipliers,
        };
        swarm.update_move_interval();
        swarm.reschedule_shot(rng);
        swarm
    }

    /// All grid cells, row-major, including tombstones
    pub fn invaders(&self) -> &[Invader] {
        &self.invaders
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Invader> {
        if row >= SWARM_ROWS || col >= SWARM_COLS {
            return None;
        }
        self.invaders.get(row * SWARM_COLS + col)
    }

    pub fn alive(&self) -> impl Iterator<Item = &Invader> {
        self.invaders.iter().filter(|i| i.alive)
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn frame(&self) -> u8 {
        self.frame
    }

    pub fn move_interval_ms(&self) -> f32 {
        self.move_interval_ms
    }

    pub fn shoot_interval_ms(&self) -> f32 {
        self.shoot_interval_ms
    }

    /// Advance both cadence timers by `dt` milliseconds
    pub fn advance(&mut self, dt: f32, rng: &mut impl Rng) -> SwarmStep {
        let mut step = SwarmStep::default();

        self.move_timer_ms += dt;
        self.shoot_timer_ms += dt;

        if self.move_timer_ms >= self.move_interval_ms {
            step.moved = true;
            step.dropped = self.march();
            self.move_timer_ms = 0.0;
            self.frame = 1 - self.frame;
            self.march_step = (self.march_step + 1) % 4;
            let frame = self.frame;
            for invader in self.invaders.iter_mut().filter(|i| i.alive) {
                invader.frame = frame;
            }
        }

        if self.shoot_timer_ms >= self.shoot_interval_ms {
            step.shot = self.fire(rng);
            self.reschedule_shot(rng);
        }

        step
    }

    /// Current phase of the four-beat march
    pub fn march_step(&self) -> u8 {
        self.march_step
    }

    /// One horizontal step; drops and reverses if any invader left the field.
    /// Returns true on a drop.
    fn march(&mut self) -> bool {
        let dx = SWARM_STEP_X * self.direction;
        let mut hit_wall = false;
        for invader in self.invaders.iter_mut().filter(|i| i.alive) {
            invader.pos.x += dx;
            let b = invader.bounds();
            if b.x < 0.0 || b.right() > PLAYFIELD_WIDTH {
                hit_wall = true;
            }
        }

        if hit_wall {
            for invader in self.invaders.iter_mut().filter(|i| i.alive) {
                invader.pos.y += SWARM_DROP_Y;
            }
            self.direction = -self.direction;
            self.update_move_interval();
        }
        hit_wall
    }

    fn update_move_interval(&mut self) {
        let alive = self.alive_count();
        self.move_interval_ms = move_interval_for(alive, &self.multipliers);
        log::debug!(
            "Alive invaders: {}, move interval: {:.2}ms",
            alive,
            self.move_interval_ms
        );
    }

    fn reschedule_shot(&mut self, rng: &mut impl Rng) {
        let jitter = rng.random_range(0.0..SWARM_BASE_SHOOT_MS);
        self.shoot_interval_ms =
            (SWARM_BASE_SHOOT_MS + jitter) * self.multipliers.invader_shoot_interval;
        self.shoot_timer_ms = 0.0;
    }

    /// Lowest surviving invader of a column
    pub fn column_front(&self, col: usize) -> Option<&Invader> {
        (0..SWARM_ROWS)
            .rev()
            .filter_map(|row| self.get(row, col))
            .find(|i| i.alive)
    }

    /// Every column's lowest survivor, left to right. Only these may shoot.
    pub fn front_line(&self) -> Vec<&Invader> {
        (0..SWARM_COLS).filter_map(|col| self.column_front(col)).collect()
    }

    fn fire(&self, rng: &mut impl Rng) -> Option<(usize, usize, Bullet)> {
        let shooters = self.front_line();
        if shooters.is_empty() {
            return None;
        }
        let shooter = shooters[rng.random_range(0..shooters.len())];
        let b = shooter.bounds();
        let muzzle = Vec2::new(b.x + b.w / 2.0, b.bottom());
        log::debug!("Invader [{}, {}] fired", shooter.row, shooter.col);
        Some((
            shooter.row,
            shooter.col,
            Bullet::fired(muzzle, Vec2::Y, INVADER_BULLET_SPEED),
        ))
    }

    /// First live invader overlapping `area`, scanning each column bottom-up
    /// so a shot never passes through a survivor to reach one behind it
    pub fn hit_test(&self, area: &Rect) -> Option<(usize, usize)> {
        for col in 0..SWARM_COLS {
            let hit = (0..SWARM_ROWS)
                .rev()
                .filter_map(|row| self.get(row, col))
                .find(|i| i.alive && i.bounds().intersects(area));
            if let Some(invader) = hit {
                return Some((invader.row, invader.col));
            }
        }
        None
    }

    /// Kill the invader at (row, col). Returns its points if it was alive.
    pub fn kill(&mut self, row: usize, col: usize) -> Option<u32> {
        if row >= SWARM_ROWS || col >= SWARM_COLS {
            return None;
        }
        let invader = &mut self.invaders[row * SWARM_COLS + col];
        if !invader.alive {
            return None;
        }
        invader.hit();
        let points = invader.kind.points();
        self.update_move_interval();
        Some(points)
    }

    /// True iff any live invader's lower edge has reached the playfield bottom
    pub fn has_reached_bottom(&self) -> bool {
        self.alive()
            .any(|i| i.bounds().bottom() >= PLAYFIELD_HEIGHT)
    }
}
