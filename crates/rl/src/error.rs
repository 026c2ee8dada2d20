use crate::env::EnvError;
use ml::NnError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RlError {
    #[error(transparent)]
    Nn(#[from] NnError),
    #[error("environment {slot} failed: {source}")]
    Env {
        slot: usize,
        #[source]
        source: EnvError,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}
