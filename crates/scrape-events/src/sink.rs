//! Storage side of the event log. `scrape-persistence` implements this over
//! the `scraping_logs` table; tests implement it over an in-memory `Vec`.

use scrape_types::{NewLogEvent, Result};

#[async_trait::async_trait]
pub trait EventSink: Send + Sync {
    async fn write(&self, event: NewLogEvent) -> Result<()>;
}

/// An `EventSink` that only writes to `tracing`, for binaries or tests that
/// don't have a database handle. Never loses an event silently: a dropped
/// write would be a logging bug, not something to paper over.
#[derive(Debug, Default)]
pub struct NullSink;

#[async_trait::async_trait]
impl EventSink for NullSink {
    async fn write(&self, event: NewLogEvent) -> Result<()> {
        tracing::debug!(
            job_id = %event.job_id,
            level = %event.log_level,
            message = %event.message,
            "event log write discarded by null sink"
        );
        Ok(())
    }
}
