//! Process-wide configuration for the scraping engine.
//!
//! The engine reads exactly two environment inputs: `DATABASE_URL` (required)
//! and `PORT` (optional, defaults to 8080). No other environment input affects
//! core behavior — deployment and secrets management live outside this crate.

pub mod env;

pub use env::EnvError;

/// Fully resolved process configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub database_url: String,
    pub port: u16,
}

impl EngineConfig {
    /// Load configuration from the process environment. Fails with a clear
    /// error when `DATABASE_URL` is missing, matching the exit-code-1 startup
    /// contract: missing `DATABASE_URL` should make the binary exit non-zero.
    pub fn from_env() -> Result<Self, EnvError> {
        let database_url = env::require("DATABASE_URL")?;
        let port = env::get_u16_or("PORT", 8080);
        Ok(Self { database_url, port })
    }
}
