//! HTTP fetch layer for RSS feeds and candidate article pages.
//!
//! Retries are a small finite-state machine rather than nested try/catch:
//! see [`retry::retry_with_backoff`]. The client itself carries no circuit
//! breaker or robots.txt enforcement; source-level politeness (request
//! delay, timeout, robots.txt opt-out) is a per-source concern handled by
//! the caller, not by this transport.

pub mod client;
pub mod retry;

pub use client::{FetchClient, FetchError, FetchedResponse};
pub use retry::{retry_with_backoff, AttemptOutcome, BackoffPolicy};
