//! Configuration errors.
//!
//! Runtime code never aborts on these: callers log them at warn level and
//! fall back to defaults or skip the affected operation.

use thiserror::Error;

use crate::sim::PoolKind;

/// Errors raised while loading or validating a [`crate::GameConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for '{field}': {value} (expected {expected})")]
    InvalidValue {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("no pool registered for {0:?}")]
    MissingPool(PoolKind),
}

/// Convenience alias: a `Result` using `ConfigError` as the error type.
pub type ConfigResult<T> = Result<T, ConfigError>;
