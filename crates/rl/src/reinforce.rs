//! Monte-Carlo policy gradient with a running baseline.

use crate::agent::{Agent, LearnStats};
use crate::policy::{argmax, discounted_returns, sample_categorical, softmax};
use crate::{Episode, RlError};
use ml::{ActivationRegistry, Adam, AdamConfig, Network, Optimizer};
use std::path::Path;
use tracing::{debug, warn};

/// Floor for the advantage normaliser.
const MIN_SCALE: f32 = 1e-8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReinforceConfig {
    /// Discount factor, in `[0, 1]`.
    pub gamma: f32,
    /// Weight of the old baseline in the exponential update, in `[0, 1)`.
    pub baseline_decay: f32,
}

impl Default for ReinforceConfig {
    fn default() -> Self {
        Self { gamma: 0.99, baseline_decay: 0.9 }
    }
}

impl ReinforceConfig {
    /// # Errors
    ///
    /// [`RlError::Config`] if either factor is out of range.
    pub fn validate(&self) -> Result<(), RlError> {
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(RlError::Config(format!("gamma must lie in [0, 1], got {}", self.gamma)));
        }
        if !(0.0..1.0).contains(&self.baseline_decay) {
            return Err(RlError::Config(format!(
                "baseline_decay must lie in [0, 1), got {}",
                self.baseline_decay
            )));
        }
        Ok(())
    }
}

/// Softmax policy over the outputs of a [`Network`], trained with REINFORCE.
///
/// The network's outputs are logits, one per discrete action. Adam is the
/// default optimizer; any [`Optimizer`] can be supplied through
/// [`ReinforceAgent::with_optimizer`].
pub struct ReinforceAgent<O: Optimizer = Adam> {
    network: Network,
    optimizer: O,
    config: ReinforceConfig,
    baseline: f32,
}

impl ReinforceAgent<Adam> {
    /// # Errors
    ///
    /// See [`ReinforceAgent::with_optimizer`].
    pub fn new(network: Network, config: ReinforceConfig, adam: AdamConfig) -> Result<Self, RlError> {
        let optimizer = Adam::new(&network, adam);
        Self::with_optimizer(network, optimizer, config)
    }

    /// Loads a policy saved with [`ReinforceAgent::save`] (or any model file)
    /// and attaches a fresh Adam optimizer.
    ///
    /// # Errors
    ///
    /// Model file errors, plus those of [`ReinforceAgent::with_optimizer`].
    pub fn load(
        path: impl AsRef<Path>,
        registry: &ActivationRegistry,
        config: ReinforceConfig,
        adam: AdamConfig,
    ) -> Result<Self, RlError> {
        let network = Network::load(path, registry)?;
        Self::new(network, config, adam)
    }
}

impl<O: Optimizer> ReinforceAgent<O> {
    /// # Errors
    ///
    /// [`RlError::Config`] for an empty network or an invalid `config`.
    pub fn with_optimizer(network: Network, optimizer: O, config: ReinforceConfig) -> Result<Self, RlError> {
        config.validate()?;
        if network.is_empty() {
            return Err(RlError::Config("policy network has no layers".into()));
        }
        Ok(Self { network, optimizer, config, baseline: 0.0 })
    }

    #[must_use]
    pub fn network(&self) -> &Network {
        &self.network
    }

    #[must_use]
    pub fn optimizer(&self) -> &O {
        &self.optimizer
    }

    #[must_use]
    pub fn config(&self) -> ReinforceConfig {
        self.config
    }

    /// Current running baseline. Starts at zero.
    #[must_use]
    pub fn baseline(&self) -> f32 {
        self.baseline
    }

    /// Action probabilities for `state`.
    #[must_use]
    pub fn probabilities(&self, state: &[f32]) -> Vec<f32> {
        softmax(&self.network.predict(state))
    }

    /// Most probable action, for evaluation runs.
    #[must_use]
    pub fn greedy(&self, state: &[f32]) -> usize {
        argmax(&self.network.predict(state))
    }

    /// # Errors
    ///
    /// Propagates I/O failures.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RlError> {
        self.network.save(path)?;
        Ok(())
    }

    fn check(&self, episode: &Episode) -> Result<(), String> {
        episode.validate().map_err(|defect| defect.to_string())?;
        let actions = self.action_count();
        let width = self.input_size();
        for (t, transition) in episode.iter().enumerate() {
            if transition.action >= actions {
                return Err(format!("transition {t} has action {} of {actions}", transition.action));
            }
            if transition.state.len() != width {
                return Err(format!(
                    "transition {t} has state width {}, expected {width}",
                    transition.state.len()
                ));
            }
        }
        Ok(())
    }
}

impl<O: Optimizer> Agent for ReinforceAgent<O> {
    fn input_size(&self) -> usize {
        self.network.input_size()
    }

    fn action_count(&self) -> usize {
        self.network.output_size()
    }

    fn act(&self, state: &[f32], rng: &mut fastrand::Rng) -> usize {
        sample_categorical(&self.probabilities(state), rng)
    }

    #[allow(clippy::cast_precision_loss)]
    fn learn(&mut self, episodes: &[Episode]) -> Result<LearnStats, RlError> {
        let usable: Vec<&Episode> = episodes
            .iter()
            .enumerate()
            .filter_map(|(index, episode)| match self.check(episode) {
                Ok(()) => Some(episode),
                Err(reason) => {
                    warn!(episode = index, %reason, "skipping episode");
                    None
                }
            })
            .collect();
        let skipped = episodes.len() - usable.len();
        if usable.is_empty() {
            debug!(skipped, "no usable episodes, skipping update");
            return Ok(LearnStats { skipped, baseline: self.baseline, ..LearnStats::default() });
        }

        let gamma = self.config.gamma;
        let returns: Vec<Vec<f32>> = usable.iter().map(|ep| discounted_returns(ep.rewards(), gamma)).collect();
        let transitions: usize = returns.iter().map(Vec::len).sum();
        let n = transitions as f32;

        let mean = returns.iter().flatten().sum::<f32>() / n;
        let decay = self.config.baseline_decay;
        self.baseline = decay * self.baseline + (1.0 - decay) * mean;
        let baseline = self.baseline;
        let scale = (returns.iter().flatten().map(|g| (g - baseline).powi(2)).sum::<f32>() / n)
            .sqrt()
            .max(MIN_SCALE);

        let mut total = self.network.zero_gradients();
        let mut d_logits = vec![0.0; self.action_count()];
        for (episode, episode_returns) in usable.iter().zip(&returns) {
            for (transition, g) in episode.iter().zip(episode_returns) {
                let advantage = (g - baseline) / scale;
                let (logits, cache) = self.network.forward(&transition.state);
                // d(-A log pi(a)) / d logits = A * (p - onehot(a))
                for (d, p) in d_logits.iter_mut().zip(softmax(&logits)) {
                    *d = advantage * p;
                }
                d_logits[transition.action] -= advantage;
                for (acc, grad) in total.iter_mut().zip(self.network.backward(&cache, &d_logits)) {
                    acc.accumulate(&grad);
                }
            }
        }
        for grad in &mut total {
            grad.scale(1.0 / n);
        }
        self.optimizer.step(&mut self.network, &total)?;

        debug!(episodes = usable.len(), skipped, transitions, mean, baseline, "policy updated");
        Ok(LearnStats { episodes: usable.len(), skipped, transitions, mean_return: mean, baseline })
    }
}
