//! Collision detection and resolution
//!
//! Runs once per tick, after everything has moved. The passes run in a fixed
//! order so the outcome is deterministic when several hits are possible in
//! the same tick:
//!
//! 1. player bullet vs swarm
//! 2. player bullet vs barriers
//! 3. player bullet vs bonus target
//! 4. invader bullets vs player (at most one hit per tick)
//! 5. invader bullets vs barriers
//! 6. swarm vs barriers (contact crushes cells)
//!
//! Passes only flip `alive` flags and mutate grids. Dead entities are skipped
//! by later passes and compacted by the tick afterwards, never mid-pass.

use glam::Vec2;
use rand::Rng;

use super::barrier::Barrier;
use super::state::{Bullet, Explosion, GameEvent, GameState, Player, ScorePopup, Ufo};
use super::swarm::Swarm;

/// An invader destroyed by the player's bullet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kill {
    pub row: usize,
    pub col: usize,
    pub points: u32,
    pub center: Vec2,
}

/// Pass 1: the lowest live invader in the first overlapping column dies
pub fn bullet_vs_swarm(bullet: &mut Bullet, swarm: &mut Swarm) -> Option<Kill> {
    if !bullet.alive {
        return None;
    }
    let (row, col) = swarm.hit_test(&bullet.bounds())?;
    let center = swarm.get(row, col)?.bounds().center();
    let points = swarm.kill(row, col)?;
    bullet.hit();
    Some(Kill {
        row,
        col,
        points,
        center,
    })
}

/// Passes 2 and 5: box test, then a pixel test at the bullet's leading edge.
/// The first barrier actually struck absorbs the bullet; returns its id.
pub fn bullet_vs_barriers(bullet: &mut Bullet, barriers: &mut [Barrier]) -> Option<usize> {
    if !bullet.alive {
        return None;
    }
    let bounds = bullet.bounds();
    let impact = bullet.leading_point();
    for barrier in barriers.iter_mut() {
        if barrier.is_destroyed() || !barrier.bounds().intersects(&bounds) {
            continue;
        }
        if barrier.check_pixel_collision(impact) {
            barrier.take_damage(impact);
            bullet.hit();
            return Some(barrier.id);
        }
    }
    None
}

/// Pass 3: box test only. Returns the reward and where the target was.
pub fn bullet_vs_ufo(bullet: &mut Bullet, ufo: &mut Ufo, rng: &mut impl Rng) -> Option<(u32, Vec2)> {
    if !bullet.alive || !ufo.alive {
        return None;
    }
    let bounds = ufo.bounds();
    if !bounds.intersects(&bullet.bounds()) {
        return None;
    }
    bullet.hit();
    Some((ufo.hit(rng), bounds.center()))
}

/// Pass 4: the first live bullet touching the player is consumed and the scan
/// stops. Returns `Some(true)` when the hit cost a life, `Some(false)` when the
/// player was invulnerable.
pub fn bullets_vs_player(bullets: &mut [Bullet], player: &mut Player) -> Option<bool> {
    let bounds = player.bounds();
    let bullet = bullets
        .iter_mut()
        .find(|b| b.alive && b.bounds().intersects(&bounds))?;
    bullet.hit();
    Some(player.hit())
}

/// Pass 6: every barrier cell under a live invader is destroyed.
/// Returns the ids of barriers that lost cells, in order.
pub fn swarm_vs_barriers(swarm: &Swarm, barriers: &mut [Barrier]) -> Vec<usize> {
    let mut damaged = Vec::new();
    for barrier in barriers.iter_mut() {
        let area = barrier.bounds();
        let mut cleared = 0;
        for invader in swarm.alive() {
            let b = invader.bounds();
            if area.intersects(&b) {
                cleared += barrier.clear_rect(&b);
            }
        }
        if cleared > 0 {
            damaged.push(barrier.id);
        }
    }
    damaged
}

/// Run every pass over the current state, applying score, effects and events
pub fn resolve(state: &mut GameState) {
    let GameState {
        rng,
        scoreboard,
        player,
        swarm,
        invader_bullets,
        barriers,
        ufo,
        explosions,
        popups,
        events,
        ..
    } = state;

    let mut award = |points: u32, events: &mut Vec<GameEvent>| {
        if scoreboard.add(points) {
            events.push(GameEvent::NewHighScore {
                score: scoreboard.high_score,
            });
        }
    };

    if let Some(kill) = bullet_vs_swarm(&mut player.bullet, swarm) {
        explosions.push(Explosion::new(kill.center));
        events.push(GameEvent::InvaderKilled {
            row: kill.row,
            col: kill.col,
            points: kill.points,
        });
        award(kill.points, events);
    }

    if let Some(id) = bullet_vs_barriers(&mut player.bullet, barriers) {
        events.push(GameEvent::BarrierDamaged { id });
    }

    if let Some((points, center)) = bullet_vs_ufo(&mut player.bullet, ufo, rng) {
        log::info!("UFO destroyed for {} points", points);
        explosions.push(Explosion::new(center));
        popups.push(ScorePopup::new(center, points));
        events.push(GameEvent::UfoKilled { points });
        award(points, events);
    }

    if let Some(true) = bullets_vs_player(invader_bullets, player) {
        log::info!("Player hit, lives remaining: {}", player.lives);
        events.push(GameEvent::PlayerHit {
            lives: player.lives,
        });
    }

    for bullet in invader_bullets.iter_mut() {
        if let Some(id) = bullet_vs_barriers(bullet, barriers) {
            events.push(GameEvent::BarrierDamaged { id });
        }
    }

    for id in swarm_vs_barriers(swarm, barriers) {
        events.push(GameEvent::BarrierDamaged { id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::DifficultyMultipliers;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(11)
    }

    fn swarm() -> Swarm {
        Swarm::new(DifficultyMultipliers::default(), &mut rng())
    }

    /// A live bullet whose box sits exactly on `pos`
    fn bullet_at(pos: Vec2, vel: Vec2) -> Bullet {
        Bullet {
            pos,
            vel,
            alive: true,
        }
    }

    #[test]
    fn test_bullet_kills_lowest_in_column() {
        let mut s = swarm();
        let target = s.get(4, 0).unwrap().bounds();
        let mut b = bullet_at(Vec2::new(target.x + 3.0, target.y + 2.0), Vec2::NEG_Y);

        let kill = bullet_vs_swarm(&mut b, &mut s).unwrap();
        assert_eq!((kill.row, kill.col, kill.points), (4, 0, 10));
        assert_eq!(kill.center, target.center());
        assert!(!b.alive);
        assert!(s.get(3, 0).unwrap().alive);
    }

    #[test]
    fn test_dead_bullet_hits_nothing() {
        let mut s = swarm();
        let target = s.get(4, 0).unwrap().bounds();
        let mut b = bullet_at(Vec2::new(target.x, target.y), Vec2::NEG_Y);
        b.alive = false;
        assert!(bullet_vs_swarm(&mut b, &mut s).is_none());
        assert_eq!(s.alive_count(), 55);
    }

    #[test]
    fn test_bullet_passes_through_gaps() {
        let mut s = swarm();
        // Between columns 0 (30..38) and 1 (42..50)
        let mut b = bullet_at(Vec2::new(39.0, 80.0), Vec2::NEG_Y);
        assert!(bullet_vs_swarm(&mut b, &mut s).is_none());
        assert!(b.alive);
    }

    #[test]
    fn test_barrier_pixel_hit_absorbs_bullet() {
        let mut barriers = vec![Barrier::solid(Vec2::new(100.0, 100.0), 10, 10)];
        let mut b = bullet_at(Vec2::new(104.5, 106.0), Vec2::NEG_Y);
        assert_eq!(bullet_vs_barriers(&mut b, &mut barriers), Some(0));
        assert!(!b.alive);
        assert!(!barriers[0].cell(5, 6));
        assert_eq!(barriers[0].alive_count(), 75);
    }

    #[test]
    fn test_barrier_hole_lets_bullet_through() {
        let mut barriers = vec![Barrier::solid(Vec2::new(100.0, 100.0), 10, 10)];
        barriers[0].damage_cell(5, 5, 1);
        let mut b = bullet_at(Vec2::new(104.5, 105.0), Vec2::NEG_Y);
        assert_eq!(bullet_vs_barriers(&mut b, &mut barriers), None);
        assert!(b.alive);
    }

    #[test]
    fn test_bullet_damages_one_barrier_only() {
        // Two overlapping barriers; the first in order takes the hit
        let mut barriers = vec![
            Barrier::solid(Vec2::new(100.0, 100.0), 10, 10).with_id(3),
            Barrier::solid(Vec2::new(100.0, 100.0), 10, 10).with_id(4),
        ];
        let mut b = bullet_at(Vec2::new(104.5, 104.0), Vec2::NEG_Y);
        assert_eq!(bullet_vs_barriers(&mut b, &mut barriers), Some(3));
        assert_eq!(barriers[1].alive_count(), 100);
    }

    #[test]
    fn test_downward_bullet_uses_bottom_edge() {
        let mut barriers = vec![Barrier::solid(Vec2::new(100.0, 100.0), 10, 10)];
        // Box spans 97.5..101.5; only the bottom edge reaches the barrier
        let mut b = bullet_at(Vec2::new(104.5, 97.5), Vec2::Y);
        assert_eq!(bullet_vs_barriers(&mut b, &mut barriers), Some(0));
        assert!(!barriers[0].cell(5, 1));
    }

    #[test]
    fn test_ufo_hit_returns_reward() {
        let mut r = rng();
        let mut ufo = Ufo::new(&mut r);
        ufo.spawn();
        ufo.pos = Vec2::new(50.0, UFO_Y);
        let mut b = bullet_at(Vec2::new(55.0, UFO_Y + 2.0), Vec2::NEG_Y);
        let (points, center) = bullet_vs_ufo(&mut b, &mut ufo, &mut r).unwrap();
        assert!(UFO_REWARDS.contains(&points));
        assert_eq!(center, Vec2::new(58.0, UFO_Y + 4.0));
        assert!(!ufo.alive);
        assert!(!b.alive);
    }

    #[test]
    fn test_inactive_ufo_cannot_be_hit() {
        let mut r = rng();
        let mut ufo = Ufo::new(&mut r);
        ufo.pos = Vec2::new(50.0, UFO_Y);
        let mut b = bullet_at(Vec2::new(55.0, UFO_Y + 2.0), Vec2::NEG_Y);
        assert!(bullet_vs_ufo(&mut b, &mut ufo, &mut r).is_none());
        assert!(b.alive);
    }

    #[test]
    fn test_one_bullet_hits_player_per_tick() {
        let mut player = Player::default();
        let at = player.pos + Vec2::new(2.0, 2.0);
        let mut bullets = vec![bullet_at(at, Vec2::Y), bullet_at(at, Vec2::Y)];

        assert_eq!(bullets_vs_player(&mut bullets, &mut player), Some(true));
        assert!(!bullets[0].alive);
        assert!(bullets[1].alive);
        assert_eq!(player.lives, PLAYER_START_LIVES - 1);

        // Second bullet lands during invulnerability: consumed, no damage
        assert_eq!(bullets_vs_player(&mut bullets, &mut player), Some(false));
        assert!(!bullets[1].alive);
        assert_eq!(player.lives, PLAYER_START_LIVES - 1);
    }

    #[test]
    fn test_swarm_crushes_covered_cells() {
        let s = swarm();
        let invader = s.get(4, 0).unwrap().bounds();
        // Barrier whose top-right 4x4 sits under the bottom-left invader's corner
        let origin = Vec2::new(invader.x - 6.0, invader.bottom() - 4.0);
        let mut barriers = vec![Barrier::solid(origin, 10, 10)];

        assert_eq!(swarm_vs_barriers(&s, &mut barriers), vec![0]);
        assert_eq!(barriers[0].alive_count(), 100 - 16);
        assert!(!barriers[0].cell(6, 0));
        assert!(!barriers[0].cell(9, 3));
        assert!(barriers[0].cell(5, 0));
        assert!(barriers[0].cell(6, 4));

        // Nothing left to crush in the same spot
        assert!(swarm_vs_barriers(&s, &mut barriers).is_empty());
    }
}
