//! Postgres persistence for the scraping engine: one repository per table,
//! plus an `EventSink` adapter so `scrape-events::StructuredLogger` can
//! write through to `scraping_logs`.

pub mod articles;
pub mod jobs;
pub mod logs;
pub mod pool;
pub mod sources;

pub use articles::ArticleRepository;
pub use jobs::JobRepository;
pub use logs::{LogRepository, PgEventSink};
pub use pool::{connect, run_migrations};
pub use sources::SourceRepository;
