use flock_core::ParamError;
use thiserror::Error;

/// Construction-time failures. Nothing inside a tick returns an error.
#[derive(Debug, Error)]
pub enum FlockError {
    #[error("thread count must be at least 1, got {0}")]
    InvalidThreadCount(usize),

    #[error("flock population is empty")]
    EmptyPopulation,

    #[error("invalid simulation parameters: {0}")]
    Parameters(#[from] ParamError),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("worker {0} was already started")]
    AlreadyStarted(usize),
}

pub type Result<T> = std::result::Result<T, FlockError>;
