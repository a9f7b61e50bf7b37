//! Environment variable loading with type conversion and defaults.
//!
//! A small builder over `std::env` rather than a full config-file layer,
//! since the engine only needs a couple of process-wide inputs.

use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("environment variable not found: {0}")]
    NotFound(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

/// Read a required environment variable.
pub fn require(var: &str) -> Result<String, EnvError> {
    env::var(var).map_err(|_| EnvError::NotFound(var.to_string()))
}

/// Read an environment variable, falling back to `default` when unset or empty.
pub fn get_or(var: &str, default: &str) -> String {
    env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Read an environment variable and parse it as `u16`, falling back to `default`.
pub fn get_u16_or(var: &str, default: u16) -> u16 {
    match env::var(var) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(var, raw, "invalid integer in environment, using default");
            default
        }),
        Err(_) => default,
    }
}
