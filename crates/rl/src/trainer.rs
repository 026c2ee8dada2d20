//! Tick-synchronised rollout over K environments with a shared agent.
//!
//! Every tick forks one task per still-running environment onto a fixed
//! worker pool and joins them all before anything else happens. The agent
//! is only read during a tick; [`Agent::learn`] runs between ticks with
//! exclusive access, so no locking is needed around it.
//!
//! A batch resets every environment, ticks until all of them are done, and
//! learns either once at the end or every `N` ticks (see [`LearnCadence`]).

use crate::agent::Agent;
use crate::env::{Action, ActionSpace, Env, EnvError};
use crate::{Batch, Episode, RlError, Transition};
use rayon::prelude::*;
use std::num::NonZeroUsize;
use tracing::{debug, error};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainerConfig {
    /// Simulated timestep handed to every [`Env::step`].
    pub dt: f32,
    pub batch_count: usize,
    /// `<= 0` learns once per completed batch, `N > 0` every `N` ticks.
    pub learning_step_batch_size: i64,
    /// Worker threads; zero means one per environment.
    pub workers: usize,
    /// Slot `i` samples actions from an RNG seeded with `seed + i`.
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self { dt: 0.02, batch_count: 100, learning_step_batch_size: 0, workers: 0, seed: 0 }
    }
}

impl TrainerConfig {
    #[must_use]
    pub fn cadence(&self) -> LearnCadence {
        LearnCadence::from_step_size(self.learning_step_batch_size)
    }
}

/// When learning fires within a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LearnCadence {
    /// Once, after every environment has finished.
    PerBatch,
    /// Every `n` ticks, plus a final drain when the batch completes.
    EveryTicks(NonZeroUsize),
}

impl LearnCadence {
    #[must_use]
    pub fn from_step_size(size: i64) -> Self {
        usize::try_from(size)
            .ok()
            .and_then(NonZeroUsize::new)
            .map_or(Self::PerBatch, Self::EveryTicks)
    }
}

/// Passed to the training callback after every learning step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatchReport {
    /// Zero-based batch index.
    pub batch: usize,
    /// Zero-based learning step within the batch.
    pub step: usize,
    /// Reward drained at this step divided by the number of environments.
    pub average_reward: f32,
    /// Episodes handed to the agent.
    pub episodes: usize,
    pub transitions: usize,
}

struct Slot<E> {
    env: E,
    rng: fastrand::Rng,
    buffer: Vec<Transition>,
    done: bool,
}

impl<E: Env> Slot<E> {
    fn reset(&mut self) {
        self.env.reset();
        self.buffer.clear();
        self.done = self.env.is_done();
    }

    fn advance<A: Agent>(&mut self, agent: &A, dt: f32) -> Result<(), EnvError> {
        let state = self.env.state();
        let expected = agent.input_size();
        if state.len() != expected {
            return Err(EnvError::StateWidth { expected, actual: state.len() });
        }
        let action = agent.act(&state, &mut self.rng);
        let reward = self.env.step(dt, &Action::Discrete(action))?;
        let done = self.env.is_done();
        self.buffer.push(Transition { state, action, reward, done });
        self.done = done;
        Ok(())
    }
}

pub struct Trainer<A, E> {
    agent: A,
    slots: Vec<Slot<E>>,
    pool: rayon::ThreadPool,
    config: TrainerConfig,
}

impl<A: Agent, E: Env> Trainer<A, E> {
    /// # Errors
    ///
    /// [`RlError::Config`] if `envs` is empty, `dt` is not a positive finite
    /// number, or an environment's observation width or action space does
    /// not match the agent. [`RlError::Pool`] if the worker pool cannot start.
    pub fn new(agent: A, envs: Vec<E>, config: TrainerConfig) -> Result<Self, RlError> {
        if envs.is_empty() {
            return Err(RlError::Config("trainer needs at least one environment".into()));
        }
        if !(config.dt.is_finite() && config.dt > 0.0) {
            return Err(RlError::Config(format!("dt must be positive, got {}", config.dt)));
        }
        let expected_space = ActionSpace::Discrete(agent.action_count());
        for (index, env) in envs.iter().enumerate() {
            if env.state_size() != agent.input_size() {
                return Err(RlError::Config(format!(
                    "environment {index} observes {} values but the agent expects {}",
                    env.state_size(),
                    agent.input_size()
                )));
            }
            if env.action_space() != expected_space {
                return Err(RlError::Config(format!(
                    "environment {index} has action space {:?}, agent needs {expected_space:?}",
                    env.action_space()
                )));
            }
        }

        let workers = if config.workers == 0 { envs.len() } else { config.workers };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("rollout-{i}"))
            .build()?;

        let slots: Vec<_> = envs
            .into_iter()
            .enumerate()
            .map(|(index, env)| Slot {
                env,
                rng: fastrand::Rng::with_seed(config.seed.wrapping_add(index as u64)),
                buffer: Vec::new(),
                done: false,
            })
            .collect();

        debug!(environments = slots.len(), workers, cadence = ?config.cadence(), "trainer ready");
        Ok(Self { agent, slots, pool, config })
    }

    /// Builds `count` environments with `make(slot_index)`.
    ///
    /// # Errors
    ///
    /// See [`Trainer::new`].
    pub fn from_factory<F>(agent: A, count: usize, config: TrainerConfig, make: F) -> Result<Self, RlError>
    where
        F: FnMut(usize) -> E,
    {
        Self::new(agent, (0..count).map(make).collect(), config)
    }

    #[must_use]
    pub fn agent(&self) -> &A {
        &self.agent
    }

    #[must_use]
    pub fn into_agent(self) -> A {
        self.agent
    }

    #[must_use]
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// One episode per environment slot.
    #[must_use]
    pub fn episodes_per_batch(&self) -> usize {
        self.slots.len()
    }

    /// Runs `batch_count` batches, calling `on_learn` after every learning step.
    ///
    /// # Errors
    ///
    /// The first environment or optimizer failure aborts the run.
    pub fn train<F>(&mut self, mut on_learn: F) -> Result<(), RlError>
    where
        F: FnMut(&BatchReport, &A),
    {
        for batch in 0..self.config.batch_count {
            self.run_batch(batch, &mut on_learn)?;
        }
        Ok(())
    }

    /// Runs a single batch and returns the number of learning steps taken.
    ///
    /// # Errors
    ///
    /// See [`Trainer::train`].
    pub fn run_batch<F>(&mut self, batch: usize, on_learn: &mut F) -> Result<usize, RlError>
    where
        F: FnMut(&BatchReport, &A),
    {
        for slot in &mut self.slots {
            slot.reset();
        }
        debug!(batch, "environments reset");

        let cadence = self.config.cadence();
        let mut ticks = 0usize;
        let mut step = 0;
        while self.slots.iter().any(|slot| !slot.done) {
            self.tick()?;
            ticks += 1;
            if let LearnCadence::EveryTicks(n) = cadence {
                if ticks % n.get() == 0 && self.learn_step(batch, step, on_learn)? {
                    step += 1;
                }
            }
        }
        if self.learn_step(batch, step, on_learn)? {
            step += 1;
        }

        debug!(batch, ticks, learn_steps = step, "batch complete");
        Ok(step)
    }

    fn tick(&mut self) -> Result<(), RlError> {
        let Self { agent, slots, pool, config } = self;
        let agent = &*agent;
        let dt = config.dt;
        let result = pool.install(|| {
            slots
                .par_iter_mut()
                .enumerate()
                .filter(|(_, slot)| !slot.done)
                .try_for_each(|(index, slot)| {
                    slot.advance(agent, dt).map_err(|source| RlError::Env { slot: index, source })
                })
        });
        if let Err(err) = &result {
            error!(%err, "rollout failed");
        }
        result
    }

    /// Drains every non-empty buffer into one episode each and learns from
    /// them. Returns `false` when there was nothing to learn from.
    #[allow(clippy::cast_precision_loss)]
    fn learn_step<F>(&mut self, batch: usize, step: usize, on_learn: &mut F) -> Result<bool, RlError>
    where
        F: FnMut(&BatchReport, &A),
    {
        let mut episodes = Batch::with_capacity(self.slots.len());
        let mut transitions = 0;
        let mut total_reward = 0.0;
        for slot in &mut self.slots {
            if slot.buffer.is_empty() {
                continue;
            }
            let episode = Episode::from(std::mem::take(&mut slot.buffer));
            transitions += episode.len();
            total_reward += episode.total_reward();
            episodes.push(episode);
        }
        if episodes.is_empty() {
            return Ok(false);
        }

        let stats = self.agent.learn(&episodes)?;
        debug!(batch, step, used = stats.episodes, skipped = stats.skipped, baseline = stats.baseline, "learned");

        let report = BatchReport {
            batch,
            step,
            average_reward: total_reward / self.slots.len() as f32,
            episodes: episodes.len(),
            transitions,
        };
        on_learn(&report, &self.agent);
        Ok(true)
    }
}
