//! # balance
//!
//! `balance train` learns a cart-pole policy with REINFORCE across parallel
//! environments. `balance replay` runs a saved policy headlessly.
//!
//! Logging goes through `tracing`; set `RUST_LOG` to change the level.

use anyhow::Result;
use balance::{app, AppConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "balance", about = "REINFORCE trainer for cart-pole balancing", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Train a new policy.
    Train(TrainArgs),
    /// Run a saved policy without rendering.
    Replay(ReplayArgs),
}

#[derive(Debug, Args)]
struct TrainArgs {
    /// JSON configuration file; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of batches to train for.
    #[arg(long)]
    batches: Option<usize>,
    /// Parallel environments (episodes per batch).
    #[arg(long)]
    envs: Option<usize>,
    /// Learn every N ticks; zero or negative learns once per batch.
    #[arg(long, allow_hyphen_values = true)]
    learning_step_batch_size: Option<i64>,
    /// Worker threads, zero for one per environment.
    #[arg(long)]
    workers: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    /// Checkpoint every N batches, zero to disable.
    #[arg(long)]
    checkpoint_every: Option<usize>,
    /// Output directory for the training log and models.
    #[arg(long)]
    out: Option<PathBuf>,
}

impl TrainArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(n) = self.batches {
            config.trainer.batch_count = n;
        }
        if let Some(n) = self.envs {
            config.environments = n;
        }
        if let Some(n) = self.learning_step_batch_size {
            config.trainer.learning_step_batch_size = n;
        }
        if let Some(n) = self.workers {
            config.trainer.workers = n;
        }
        if let Some(s) = self.seed {
            config.trainer.seed = s;
        }
        if let Some(n) = self.checkpoint_every {
            config.checkpoint_every = n;
        }
        if let Some(dir) = &self.out {
            config.out_dir.clone_from(dir);
        }
    }
}

#[derive(Debug, Args)]
struct ReplayArgs {
    /// Model file written by `train`.
    #[arg(long)]
    model: PathBuf,
    #[arg(long, default_value_t = 5)]
    episodes: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Always take the most probable action instead of sampling.
    #[arg(long)]
    greedy: bool,
    /// JSON configuration file for the environment parameters.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    path.map_or_else(|| Ok(AppConfig::default()), |p| AppConfig::load(p))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Command::Train(args) => {
            let mut config = load_config(args.config.as_ref())?;
            args.apply(&mut config);
            app::train(&config)?;
        }
        Command::Replay(args) => {
            let config = load_config(args.config.as_ref())?;
            let lengths = app::replay(&config, &args.model, args.episodes, args.seed, args.greedy)?;
            let mean = lengths.iter().sum::<usize>() as f64 / lengths.len().max(1) as f64;
            tracing::info!(episodes = lengths.len(), mean_steps = mean, "replay complete");
        }
    }
    Ok(())
}
