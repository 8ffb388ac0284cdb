//! Crate-level error type

use crate::config::ConfigError;
use crate::generator::GeneratorError;
use thiserror::Error;

/// Failure to open a benchmark context
#[derive(Error, Debug)]
pub enum BenchError {
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type BenchResult<T> = Result<T, BenchError>;
