//! Frame driver
//!
//! Turns variable display-rate frames into fixed simulation steps, polls input
//! once per frame, and writes the high score back whenever it improves.

use crate::consts::*;
use crate::highscores::HighScoreStore;
use crate::input::{self, InputSource};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, tick};

/// A running game bound to a high score store
pub struct Session<S: HighScoreStore> {
    state: GameState,
    store: S,
    accumulator: f32,
    /// Pause held on the previous frame (for edge detection)
    pause_held: bool,
    /// Last high score written to the store
    saved_high_score: u32,
}

impl<S: HighScoreStore> Session<S> {
    pub fn new(settings: &Settings, store: S) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        let high_score = store.load();
        log::info!(
            "Starting session: seed {}, difficulty {}, high score {}",
            seed,
            settings.difficulty.as_str(),
            high_score
        );
        Self {
            state: GameState::new(seed, settings.difficulty).with_high_score(high_score),
            store,
            accumulator: 0.0,
            pause_held: false,
            saved_high_score: high_score,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one display frame of `elapsed_ms` and return the events it produced.
    ///
    /// Long gaps (suspended tab, debugger) are clamped so the cadence timers
    /// never see more than `MAX_FRAME_MS` at once, and at most `MAX_SUBSTEPS`
    /// fixed steps run per frame. Non-finite deltas count as zero.
    pub fn frame<I: InputSource + ?Sized>(&mut self, elapsed_ms: f32, source: &I) -> Vec<GameEvent> {
        let elapsed = if elapsed_ms.is_finite() {
            let clamped = elapsed_ms.clamp(0.0, MAX_FRAME_MS);
            if clamped < elapsed_ms {
                log::debug!("Clamped frame delta {:.1}ms to {:.1}ms", elapsed_ms, clamped);
            }
            clamped
        } else {
            log::warn!("Ignoring non-finite frame delta {}", elapsed_ms);
            0.0
        };
        self.accumulator += elapsed;

        let mut input = input::poll(source);
        let pause_held = input.pause;
        input.pause = pause_held && !self.pause_held;
        self.pause_held = pause_held;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &input, SIM_DT_MS);
            self.accumulator -= SIM_DT_MS;
            substeps += 1;

            // One-shot inputs apply to the first substep only
            input.pause = false;
        }

        let high_score = self.state.high_score();
        if high_score > self.saved_high_score {
            self.store.save(high_score);
            self.saved_high_score = high_score;
        }

        self.state.drain_events()
    }
}
