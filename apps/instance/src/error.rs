use std::io::Error as IoError;

use thiserror::Error;
use webguard::{ConfigError, RunnerError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0:#}")]
    Io(#[from] IoError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to set up the runner: {0}")]
    Runner(#[from] RunnerError),
}
