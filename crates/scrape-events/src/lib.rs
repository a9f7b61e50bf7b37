//! Structured, append-only event log for scraping jobs.
//!
//! [`StructuredLogger`] is the single write path: every call both persists a
//! row (through an [`EventSink`]) and mirrors the event through `tracing` so
//! operators get the same signal without querying the database.

pub mod logger;
pub mod sink;

pub use logger::StructuredLogger;
pub use sink::{EventSink, NullSink};

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use scrape_types::{EventData, LifecycleEvent, LogLevel, NewLogEvent, Result};
    use uuid::Uuid;

    use super::*;

    #[derive(Default)]
    struct CapturingSink {
        events: Mutex<Vec<NewLogEvent>>,
    }

    #[async_trait::async_trait]
    impl EventSink for CapturingSink {
        async fn write(&self, event: NewLogEvent) -> Result<()> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    #[tokio::test]
    async fn log_forwards_to_sink() {
        let sink = Arc::new(CapturingSink::default());
        let logger = StructuredLogger::new(sink.clone());
        let job_id = Uuid::new_v4();

        logger
            .log(
                job_id,
                None,
                LogLevel::Info,
                "job started",
                EventData::Lifecycle(LifecycleEvent::JobCancelled),
            )
            .await
            .unwrap();

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].job_id, job_id);
    }

    #[test]
    fn correlation_ids_are_unique() {
        let logger = StructuredLogger::new(Arc::new(NullSink));
        let a = logger.new_correlation_id();
        let b = logger.new_correlation_id();
        assert_ne!(a, b);
    }
}
