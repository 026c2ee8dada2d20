//! JSON run configuration.
//!
//! Every field is optional; anything missing falls back to the library
//! defaults. Command-line flags are applied on top afterwards.

use anyhow::{Context, Result};
use ml::AdamConfig;
use rl::{CartPoleConfig, ReinforceConfig, TrainerConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Parallel environments, which is also the number of episodes per batch.
    pub environments: usize,
    /// Save a checkpoint every this many batches; zero disables checkpoints.
    pub checkpoint_every: usize,
    pub out_dir: PathBuf,
    pub trainer: TrainerSection,
    pub reinforce: ReinforceSection,
    pub adam: AdamSection,
    pub cartpole: CartPoleSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environments: 8,
            checkpoint_every: 10,
            out_dir: PathBuf::from("models"),
            trainer: TrainerConfig::default().into(),
            reinforce: ReinforceConfig::default().into(),
            adam: AdamConfig::default().into(),
            cartpole: CartPoleConfig::default().into(),
        }
    }
}

impl AppConfig {
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a valid configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// # Errors
    ///
    /// Fails on malformed JSON or unknown fields.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainerSection {
    pub dt: f32,
    pub batch_count: usize,
    pub learning_step_batch_size: i64,
    pub workers: usize,
    pub seed: u64,
}

impl Default for TrainerSection {
    fn default() -> Self {
        TrainerConfig::default().into()
    }
}

impl From<TrainerConfig> for TrainerSection {
    fn from(c: TrainerConfig) -> Self {
        Self {
            dt: c.dt,
            batch_count: c.batch_count,
            learning_step_batch_size: c.learning_step_batch_size,
            workers: c.workers,
            seed: c.seed,
        }
    }
}

impl From<TrainerSection> for TrainerConfig {
    fn from(s: TrainerSection) -> Self {
        Self {
            dt: s.dt,
            batch_count: s.batch_count,
            learning_step_batch_size: s.learning_step_batch_size,
            workers: s.workers,
            seed: s.seed,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReinforceSection {
    pub gamma: f32,
    pub baseline_decay: f32,
}

impl Default for ReinforceSection {
    fn default() -> Self {
        ReinforceConfig::default().into()
    }
}

impl From<ReinforceConfig> for ReinforceSection {
    fn from(c: ReinforceConfig) -> Self {
        Self { gamma: c.gamma, baseline_decay: c.baseline_decay }
    }
}

impl From<ReinforceSection> for ReinforceConfig {
    fn from(s: ReinforceSection) -> Self {
        Self { gamma: s.gamma, baseline_decay: s.baseline_decay }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdamSection {
    pub learning_rate: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
}

impl Default for AdamSection {
    fn default() -> Self {
        AdamConfig::default().into()
    }
}

impl From<AdamConfig> for AdamSection {
    fn from(c: AdamConfig) -> Self {
        Self { learning_rate: c.learning_rate, beta1: c.beta1, beta2: c.beta2, epsilon: c.epsilon }
    }
}

impl From<AdamSection> for AdamConfig {
    fn from(s: AdamSection) -> Self {
        Self { learning_rate: s.learning_rate, beta1: s.beta1, beta2: s.beta2, epsilon: s.epsilon }
    }
}

/// Cart-pole parameters. Angles are given in degrees here.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CartPoleSection {
    pub cart_mass: f32,
    pub pole_mass: f32,
    pub pole_length: f32,
    pub gravity: f32,
    pub force_magnitude: f32,
    pub position_limit: f32,
    pub failure_angle_deg: f32,
    pub initial_angle_deg: f32,
    pub max_steps: usize,
}

impl Default for CartPoleSection {
    fn default() -> Self {
        CartPoleConfig::default().into()
    }
}

impl From<CartPoleConfig> for CartPoleSection {
    fn from(c: CartPoleConfig) -> Self {
        Self {
            cart_mass: c.cart_mass,
            pole_mass: c.pole_mass,
            pole_length: c.pole_length,
            gravity: c.gravity,
            force_magnitude: c.force_magnitude,
            position_limit: c.position_limit,
            failure_angle_deg: c.failure_angle.to_degrees(),
            initial_angle_deg: c.initial_angle.to_degrees(),
            max_steps: c.max_steps,
        }
    }
}

impl From<CartPoleSection> for CartPoleConfig {
    fn from(s: CartPoleSection) -> Self {
        Self {
            cart_mass: s.cart_mass,
            pole_mass: s.pole_mass,
            pole_length: s.pole_length,
            gravity: s.gravity,
            force_magnitude: s.force_magnitude,
            position_limit: s.position_limit,
            failure_angle: s.failure_angle_deg.to_radians(),
            initial_angle: s.initial_angle_deg.to_radians(),
            max_steps: s.max_steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config.environments, 8);
        assert_eq!(TrainerConfig::from(config.trainer), TrainerConfig::default());
        assert_eq!(AdamConfig::from(config.adam), AdamConfig::default());
        assert_eq!(ReinforceConfig::from(config.reinforce), ReinforceConfig::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(AppConfig::from_json(r#"{ "trainer": { "batches": 3 } }"#).is_err());
    }
}
