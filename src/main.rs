//! Pixel Invaders headless runner
//!
//! Plays the simulation at a fixed 60 Hz frame rate with a simple built-in
//! autopilot, logs notable events, and prints the final state as JSON.
//! Rendering, audio and real keyboard input live in platform front ends.

use std::path::PathBuf;

use clap::Parser;

use pixel_invaders::consts::*;
use pixel_invaders::sim::{GameEvent, GamePhase, GameState};
use pixel_invaders::{Action, Difficulty, FileStore, InputSource, Session, Settings};

#[derive(Parser, Debug)]
#[command(name = "pixel-invaders")]
#[command(about = "Headless Pixel Invaders run with a built-in autopilot")]
struct Args {
    /// Settings JSON file; missing or malformed files fall back to defaults
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Directory holding the high score file
    #[arg(long, default_value = ".")]
    save_dir: PathBuf,
    /// easy, normal or hard (overrides the settings file)
    #[arg(long, value_parser = parse_difficulty)]
    difficulty: Option<Difficulty>,
    /// Fixed run seed (overrides the settings file)
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated seconds to play before stopping
    #[arg(long, default_value_t = 120.0, value_parser = parse_seconds)]
    seconds: f32,
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    Difficulty::parse(s)
        .ok_or_else(|| format!("unknown difficulty '{s}' (expected easy, normal or hard)"))
}

fn parse_seconds(s: &str) -> Result<f32, String> {
    match s.parse::<f32>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(format!("'{s}' is not a non-negative number of seconds")),
    }
}

/// Chases the nearest front-line column and fires whenever it can
#[derive(Default)]
struct Autopilot {
    held: Vec<Action>,
}

impl Autopilot {
    fn plan(&mut self, state: &GameState) {
        self.held.clear();
        if state.phase != GamePhase::Playing {
            return;
        }

        let player_x = state.player.pos.x + PLAYER_WIDTH / 2.0;
        let target = state
            .swarm
            .front_line()
            .into_iter()
            .map(|i| i.bounds().center().x)
            .min_by(|a, b| {
                (a - player_x)
                    .abs()
                    .partial_cmp(&(b - player_x).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

        if let Some(x) = target {
            if x < player_x - 1.0 {
                self.held.push(Action::MoveLeft);
            } else if x > player_x + 1.0 {
                self.held.push(Action::MoveRight);
            }
        }
        self.held.push(Action::Fire);
    }
}

impl InputSource for Autopilot {
    fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let args = Args::parse();

    let mut settings = match &args.settings {
        Some(path) => Settings::load_from(path),
        None => Settings::default(),
    };
    if let Some(difficulty) = args.difficulty {
        settings.difficulty = difficulty;
    }
    if args.seed.is_some() {
        settings.seed = args.seed;
    }

    let mut session = Session::new(&settings, FileStore::new(&args.save_dir));
    let mut pilot = Autopilot::default();

    let frames = (args.seconds * 1000.0 / SIM_DT_MS) as u64;
    for _ in 0..frames {
        pilot.plan(session.state());
        for event in session.frame(SIM_DT_MS, &pilot) {
            match event {
                GameEvent::WaveCleared { .. }
                | GameEvent::UfoKilled { .. }
                | GameEvent::PlayerHit { .. }
                | GameEvent::GameOver { .. } => log::info!("{:?}", event),
                _ => log::trace!("{:?}", event),
            }
        }
        if session.state().phase == GamePhase::GameOver {
            break;
        }
    }

    let state = session.state();
    log::info!(
        "Finished after {:.1}s: score {}, high score {}, wave {}",
        state.time_ms / 1000.0,
        state.score(),
        state.high_score(),
        state.wave
    );
    match serde_json::to_string_pretty(&state.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize snapshot: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["pixel-invaders"]).unwrap();
        assert_eq!(args.seed, None);
        assert_eq!(args.difficulty, None);
        assert_eq!(args.seconds, 120.0);
        assert_eq!(args.save_dir, PathBuf::from("."));
    }

    #[test]
    fn test_typed_flags() {
        let args = Args::try_parse_from([
            "pixel-invaders",
            "--seed",
            "42",
            "--difficulty",
            "Hard",
            "--seconds",
            "1.5",
        ])
        .unwrap();
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.difficulty, Some(Difficulty::Hard));
        assert_eq!(args.seconds, 1.5);
    }

    #[test]
    fn test_bad_values_are_rejected() {
        assert!(Args::try_parse_from(["pixel-invaders", "--seed", "abc"]).is_err());
        assert!(Args::try_parse_from(["pixel-invaders", "--seed", "-1"]).is_err());
        assert!(Args::try_parse_from(["pixel-invaders", "--difficulty", "hardd"]).is_err());
        assert!(Args::try_parse_from(["pixel-invaders", "--seconds", "NaN"]).is_err());
        assert!(Args::try_parse_from(["pixel-invaders", "--seconds", "-3"]).is_err());
        assert!(Args::try_parse_from(["pixel-invaders", "--speed", "3"]).is_err());
    }
}
