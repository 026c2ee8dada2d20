//! Environment capability trait.
//!
//! Inspired by classic frameworks like OpenAI Gym, an environment exposes
//! just enough for a trainer to drive it: reset it, read its observation,
//! advance it one fixed timestep under an action, and ask whether the
//! episode is over. Each concrete environment implements [`Env`] directly;
//! the action representation is the closed [`Action`] variant.

use thiserror::Error;

/// An action handed to [`Env::step`].
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    /// Index into a finite action set.
    Discrete(usize),
    /// A real-valued control vector.
    Continuous(Vec<f32>),
}

/// The kind of [`Action`] an environment accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionSpace {
    /// `n` discrete choices, indices `0..n`.
    Discrete(usize),
    /// A control vector of the given width.
    Continuous(usize),
}

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("environment does not accept {0} actions")]
    UnsupportedAction(&'static str),
    #[error("action index {index} out of range for {count} actions")]
    InvalidAction { index: usize, count: usize },
    #[error("observation has {actual} values, expected {expected}")]
    StateWidth { expected: usize, actual: usize },
    #[error("environment failure: {0}")]
    Failed(String),
}

pub trait Env: Send {
    /// Reinitialise the episode. Randomness comes from the environment's
    /// own seeded generator, so a fixed seed gives a fixed sequence of resets.
    fn reset(&mut self);

    /// Whether the current episode has terminated.
    fn is_done(&self) -> bool;

    /// Current observation. Its length is always [`Env::state_size`].
    fn state(&self) -> Vec<f32>;

    /// Advance one timestep of length `dt` under `action` and return the reward.
    ///
    /// # Errors
    ///
    /// Fails if the action is of the wrong kind or out of range, or if the
    /// environment itself cannot continue.
    fn step(&mut self, dt: f32, action: &Action) -> Result<f32, EnvError>;

    /// Length of the observation vector.
    fn state_size(&self) -> usize;

    fn action_space(&self) -> ActionSpace;
}
