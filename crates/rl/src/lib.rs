#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_panics_doc)]
//! # Policy-gradient training
//!
//! REINFORCE over a pluggable environment, with rollouts spread across a
//! fixed worker pool.
//!
//! -   **Environments:** anything implementing [`Env`]; [`CartPoleEnv`] ships
//!     as the reference task.
//! -   **Experience:** [`Transition`]s are grouped into [`Episode`]s, and the
//!     episodes gathered between two updates form a [`Batch`].
//! -   **Agents:** [`ReinforceAgent`] samples from a softmax over network
//!     logits and learns with a running-baseline, variance-normalised
//!     Monte-Carlo policy gradient.
//! -   **Training:** [`Trainer`] steps K environments in lock-step ticks and
//!     hands drained episodes to the agent at the configured cadence.
//!
//! ```rust,ignore
//! use ml::{ActivationRegistry, AdamConfig};
//! use rl::{cartpole, CartPoleConfig, CartPoleEnv, ReinforceAgent, ReinforceConfig, Trainer, TrainerConfig};
//!
//! let registry = ActivationRegistry::with_defaults();
//! let mut rng = fastrand::Rng::with_seed(1);
//! let policy = cartpole::default_policy(&registry, &mut rng)?;
//! let agent = ReinforceAgent::new(policy, ReinforceConfig::default(), AdamConfig::default())?;
//!
//! let config = TrainerConfig { batch_count: 50, ..TrainerConfig::default() };
//! let mut trainer = Trainer::from_factory(agent, 8, config, |i| {
//!     CartPoleEnv::new(CartPoleConfig::default(), i as u64)
//! })?;
//! trainer.train(|report, _| println!("{} {}", report.batch, report.average_reward))?;
//! ```

pub mod agent;
pub mod cartpole;
pub mod env;
pub mod error;
pub mod policy;
pub mod reinforce;
pub mod trainer;
pub mod transition;

pub use agent::{Agent, LearnStats};
pub use cartpole::{CartPoleConfig, CartPoleEnv};
pub use env::{Action, ActionSpace, Env, EnvError};
pub use error::RlError;
pub use reinforce::{ReinforceAgent, ReinforceConfig};
pub use trainer::{BatchReport, LearnCadence, Trainer, TrainerConfig};
pub use transition::{Batch, Episode, EpisodeDefect, Transition};
