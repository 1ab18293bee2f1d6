//! Simulation tick
//!
//! Advances the game by one step: movement, collisions, end-of-tick cleanup,
//! then the terminal checks of the game state machine.

use super::collision;
use super::state::{GameEvent, GamePhase, GameState};
use super::swarm::Swarm;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Fire held
    pub fire: bool,
    /// Pause toggle (one-shot)
    pub pause: bool,
    /// Restart held; only honoured after game over
    pub restart: bool,
}

/// Advance the game state by `dt` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                state.events.push(GameEvent::Paused);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                state.events.push(GameEvent::Resumed);
            }
            GamePhase::GameOver => {}
        }
    }

    match state.phase {
        GamePhase::Paused => return,
        GamePhase::GameOver => {
            if input.restart {
                state.reset();
            }
            return;
        }
        GamePhase::Playing => {}
    }

    state.time_ms += dt as f64;

    // --- Movement ---
    if state.player.update(dt, input) {
        state.events.push(GameEvent::PlayerFired);
    }
    state.player.bullet.update(dt);

    let step = state.swarm.advance(dt, &mut state.rng);
    if step.moved {
        state.events.push(GameEvent::SwarmStepped {
            march_step: state.swarm.march_step(),
        });
    }
    if let Some((row, col, bullet)) = step.shot {
        state.invader_bullets.push(bullet);
        state.events.push(GameEvent::InvaderFired { row, col });
    }
    for bullet in state.invader_bullets.iter_mut() {
        bullet.update(dt);
    }

    if state.ufo.update(dt, &mut state.rng) {
        state.events.push(GameEvent::UfoSpawned);
    }

    for explosion in state.explosions.iter_mut() {
        explosion.update(dt);
    }
    for popup in state.popups.iter_mut() {
        popup.update(dt);
    }

    // --- Collisions ---
    collision::resolve(state);

    // --- Cleanup ---
    state.invader_bullets.retain(|b| b.alive);
    state.explosions.retain(|e| e.alive);
    state.popups.retain(|p| p.alive);
    state.barriers.retain(|b| !b.is_destroyed());

    // --- Wave clear ---
    if state.swarm.alive_count() == 0 {
        state.wave += 1;
        log::info!("Wave {} cleared", state.wave);
        state.swarm = Swarm::new(state.difficulty.multipliers(), &mut state.rng);
        state.invader_bullets.clear();
        state.events.push(GameEvent::WaveCleared { wave: state.wave });
    }

    // --- Terminal conditions ---
    if state.swarm.has_reached_bottom() || state.player.lives == 0 {
        state.phase = GamePhase::GameOver;
        log::info!("Game over, score {}", state.scoreboard.score);
        state.events.push(GameEvent::GameOver {
            score: state.scoreboard.score,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::Difficulty;
    use crate::sim::state::Bullet;
    use glam::Vec2;

    fn new_state() -> GameState {
        GameState::new(12345, Difficulty::Normal)
    }

    #[test]
    fn test_tick_pause() {
        let mut state = new_state();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT_MS);
        assert_eq!(state.phase, GamePhase::Paused);

        // Nothing advances while paused
        let before = state.time_ms;
        tick(&mut state, &TickInput::default(), 5_000.0);
        assert_eq!(state.time_ms, before);

        tick(&mut state, &pause, SIM_DT_MS);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::Paused, GameEvent::Resumed]
        );
    }

    #[test]
    fn test_player_fires_single_bullet() {
        let mut state = new_state();
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &fire, 1.0);
        assert!(!state.player.bullet.alive, "cooldown running at start");

        state.player.fire_cooldown_ms = 0.0;
        tick(&mut state, &fire, 1.0);
        assert!(state.player.bullet.alive);
        assert!(state.drain_events().contains(&GameEvent::PlayerFired));

        // Held fire does not spawn a second bullet while the first flies
        state.player.fire_cooldown_ms = 0.0;
        tick(&mut state, &fire, 1.0);
        assert!(!state.drain_events().contains(&GameEvent::PlayerFired));
    }

    #[test]
    fn test_kill_scores_and_spawns_explosion() {
        let mut state = new_state();
        let target = state.swarm.get(4, 3).unwrap().bounds();
        state.player.bullet = Bullet {
            pos: Vec2::new(target.x + 2.0, target.y + 2.0),
            vel: Vec2::ZERO,
            alive: true,
        };
        tick(&mut state, &TickInput::default(), 1.0);
        assert_eq!(state.score(), 10);
        assert!(!state.swarm.get(4, 3).unwrap().alive);
        assert_eq!(state.explosions.len(), 1);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::InvaderKilled {
            row: 4,
            col: 3,
            points: 10
        }));
        assert!(events.contains(&GameEvent::NewHighScore { score: 10 }));
    }

    #[test]
    fn test_dead_bullets_compacted_at_end_of_tick() {
        let mut state = new_state();
        let at = state.player.pos + Vec2::new(2.0, 2.0);
        state.invader_bullets.push(Bullet {
            pos: at,
            vel: Vec2::ZERO,
            alive: true,
        });
        state.invader_bullets.push(Bullet {
            pos: Vec2::new(5.0, 150.0),
            vel: Vec2::ZERO,
            alive: true,
        });
        tick(&mut state, &TickInput::default(), 1.0);
        assert_eq!(state.player.lives, PLAYER_START_LIVES - 1);
        assert_eq!(state.invader_bullets.len(), 1);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::PlayerHit { lives: 2 })
        );
    }

    #[test]
    fn test_last_life_ends_game() {
        let mut state = new_state();
        state.player.lives = 1;
        let at = state.player.pos + Vec2::new(2.0, 2.0);
        state.invader_bullets.push(Bullet {
            pos: at,
            vel: Vec2::ZERO,
            alive: true,
        });
        tick(&mut state, &TickInput::default(), 1.0);
        assert_eq!(state.phase, GamePhase::GameOver);

        // Frozen until restart
        let swarm_x = state.swarm.get(0, 0).unwrap().pos.x;
        tick(&mut state, &TickInput::default(), 10_000.0);
        assert_eq!(state.swarm.get(0, 0).unwrap().pos.x, swarm_x);

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &restart, SIM_DT_MS);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.lives, PLAYER_START_LIVES);
    }

    #[test]
    fn test_destroyed_barriers_pruned() {
        let mut state = new_state();
        let count = state.barriers.len();
        let w = state.barriers[0].width() as i32;
        let h = state.barriers[0].height() as i32;
        state.barriers[0].damage_cell(w / 2, h / 2, w.max(h));
        tick(&mut state, &TickInput::default(), 1.0);
        assert_eq!(state.barriers.len(), count - 1);
    }

    #[test]
    fn test_wave_clear_respawns_swarm() {
        let mut state = new_state();
        for row in 0..SWARM_ROWS {
            for col in 0..SWARM_COLS {
                state.swarm.kill(row, col);
            }
        }
        tick(&mut state, &TickInput::default(), 1.0);
        assert_eq!(state.wave, 1);
        assert_eq!(state.swarm.alive_count(), SWARM_ROWS * SWARM_COLS);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::WaveCleared { wave: 1 })
        );
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(99999, Difficulty::Hard);
        let mut state2 = GameState::new(99999, Difficulty::Hard);

        let inputs = [
            TickInput {
                move_left: true,
                ..Default::default()
            },
            TickInput {
                fire: true,
                ..Default::default()
            },
            TickInput {
                move_right: true,
                fire: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..500 {
            for input in &inputs {
                tick(&mut state1, input, SIM_DT_MS);
                tick(&mut state2, input, SIM_DT_MS);
            }
        }

        assert_eq!(state1.score(), state2.score());
        assert_eq!(state1.player.lives, state2.player.lives);
        assert_eq!(state1.invader_bullets.len(), state2.invader_bullets.len());
        assert_eq!(state1.swarm.alive_count(), state2.swarm.alive_count());
        assert_eq!(state1.drain_events(), state2.drain_events());
    }
}
