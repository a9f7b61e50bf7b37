//! Error types shared across the scraping engine core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Unified error type for the scraping engine
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("source not found: {0}")]
    SourceNotFound(String),

    #[error("source {0} has no rss_url configured")]
    MissingRssUrl(String),

    #[error("job not found: {0}")]
    JobNotFound(uuid::Uuid),

    #[error("job {0} is not in-progress, cannot cancel")]
    JobNotCancellable(uuid::Uuid),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("RSS fetch failed after retries: {0}")]
    RssFetchFailed(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}
