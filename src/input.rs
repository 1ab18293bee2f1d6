//! Logical input actions
//!
//! The platform layer maps its own key codes onto these actions; the core
//! only ever asks whether an action is currently held.

pub use crate::sim::tick::TickInput;

/// A logical action the player can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Fire,
    Pause,
    Restart,
}

/// Anything that can report held actions (keyboard state, a replay, an AI)
pub trait InputSource {
    fn is_held(&self, action: Action) -> bool;
}

impl InputSource for [Action] {
    fn is_held(&self, action: Action) -> bool {
        self.contains(&action)
    }
}

impl<const N: usize> InputSource for [Action; N] {
    fn is_held(&self, action: Action) -> bool {
        self.contains(&action)
    }
}

impl InputSource for TickInput {
    fn is_held(&self, action: Action) -> bool {
        match action {
            Action::MoveLeft => self.move_left,
            Action::MoveRight => self.move_right,
            Action::Fire => self.fire,
            Action::Pause => self.pause,
            Action::Restart => self.restart,
        }
    }
}

/// Snapshot every action once; the result is immutable for the whole tick.
/// `pause` here is the raw held state; edge detection is the caller's job.
pub fn poll<S: InputSource + ?Sized>(source: &S) -> TickInput {
    TickInput {
        move_left: source.is_held(Action::MoveLeft),
        move_right: source.is_held(Action::MoveRight),
        fire: source.is_held(Action::Fire),
        pause: source.is_held(Action::Pause),
        restart: source.is_held(Action::Restart),
    }
}
