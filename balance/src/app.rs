//! Training and replay drivers for the cart-pole task.

use crate::config::AppConfig;
use anyhow::{Context, Result};
use ml::{ActivationRegistry, AdamConfig};
use rl::{
    cartpole, Action, Agent, BatchReport, CartPoleConfig, CartPoleEnv, Env, ReinforceAgent, ReinforceConfig,
    Trainer, TrainerConfig,
};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment RNGs are offset from the sampling RNGs so the two streams differ.
const ENV_SEED_OFFSET: u64 = 1 << 32;

/// Trains a fresh policy, writing `training.csv`, periodic checkpoints and
/// `final.mdl` into `config.out_dir`.
///
/// # Errors
///
/// Setup and rollout failures are fatal. A failed CSV row or checkpoint is
/// logged and training continues.
pub fn train(config: &AppConfig) -> Result<PathBuf> {
    let out_dir = &config.out_dir;
    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let registry = ActivationRegistry::with_defaults();
    let trainer_config = TrainerConfig::from(config.trainer);
    let mut rng = fastrand::Rng::with_seed(trainer_config.seed);
    let policy = cartpole::default_policy(&registry, &mut rng).context("building policy network")?;
    let agent = ReinforceAgent::new(policy, config.reinforce.into(), config.adam.into())?;

    let env_config = CartPoleConfig::from(config.cartpole);
    let env_seed = trainer_config.seed.wrapping_add(ENV_SEED_OFFSET);
    let mut trainer = Trainer::from_factory(agent, config.environments, trainer_config, |slot| {
        CartPoleEnv::new(env_config, env_seed.wrapping_add(slot as u64))
    })?;

    let mut csv = CsvLog::create(&out_dir.join("training.csv"))?;
    let mut checkpointed = None;
    info!(
        environments = trainer.episodes_per_batch(),
        batches = trainer_config.batch_count,
        cadence = ?trainer_config.cadence(),
        "training started"
    );

    trainer.train(|report, agent| {
        info!(
            batch = report.batch,
            step = report.step,
            average_reward = report.average_reward,
            baseline = agent.baseline(),
            "learning step"
        );
        if let Err(err) = csv.append(report) {
            warn!(%err, "failed to append training log");
        }
        let due = config.checkpoint_every > 0 && (report.batch + 1) % config.checkpoint_every == 0;
        if due && checkpointed != Some(report.batch) {
            checkpointed = Some(report.batch);
            let path = out_dir.join(checkpoint_name(report));
            match agent.save(&path) {
                Ok(()) => info!(path = %path.display(), "saved checkpoint"),
                Err(err) => warn!(%err, path = %path.display(), "failed to save checkpoint"),
            }
        }
    })?;

    let final_path = out_dir.join("final.mdl");
    trainer
        .agent()
        .save(&final_path)
        .with_context(|| format!("saving {}", final_path.display()))?;
    info!(path = %final_path.display(), "training complete");
    Ok(final_path)
}

/// Runs `episodes` headless cart-pole episodes with a saved policy and
/// returns their lengths.
///
/// # Errors
///
/// Fails if the model cannot be loaded or does not fit the environment.
pub fn replay(config: &AppConfig, model: &Path, episodes: usize, seed: u64, greedy: bool) -> Result<Vec<usize>> {
    let registry = ActivationRegistry::with_defaults();
    let agent = ReinforceAgent::load(model, &registry, ReinforceConfig::default(), AdamConfig::default())
        .with_context(|| format!("loading {}", model.display()))?;

    let mut env = CartPoleEnv::new(config.cartpole.into(), seed);
    anyhow::ensure!(
        agent.input_size() == env.state_size() && agent.action_count() == cartpole::ACTION_COUNT,
        "model {} has shape {}->{}, cart-pole needs {}->{}",
        model.display(),
        agent.input_size(),
        agent.action_count(),
        env.state_size(),
        cartpole::ACTION_COUNT
    );

    let dt = TrainerConfig::from(config.trainer).dt;
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut lengths = Vec::with_capacity(episodes);
    for episode in 0..episodes {
        env.reset();
        while !env.is_done() {
            let state = env.state();
            let action = if greedy { agent.greedy(&state) } else { agent.act(&state, &mut rng) };
            env.step(dt, &Action::Discrete(action))?;
        }
        info!(episode, steps = env.steps(), "episode finished");
        lengths.push(env.steps());
    }
    Ok(lengths)
}

#[must_use]
pub fn checkpoint_name(report: &BatchReport) -> String {
    format!(
        "reinforce_batch_{}_step_{}_reward_{:.2}.mdl",
        report.batch, report.step, report.average_reward
    )
}

/// Appends `batch,step,average_reward` rows, writing the header for a new file.
struct CsvLog {
    out: BufWriter<File>,
}

impl CsvLog {
    fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut out = BufWriter::new(file);
        writeln!(out, "batch,step,average_reward")?;
        out.flush()?;
        Ok(Self { out })
    }

    fn append(&mut self, report: &BatchReport) -> std::io::Result<()> {
        writeln!(self.out, "{},{},{}", report.batch, report.step, report.average_reward)?;
        self.out.flush()
    }
}
