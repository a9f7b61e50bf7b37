//! `scraping_logs` table: the append-only structured event log, and the
//! `EventSink` adapter that lets `scrape-events::StructuredLogger` write to it.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use scrape_events::EventSink;
use scrape_types::{EventData, LogEvent, LogLevel, NewLogEvent, Result, ScrapeError};

#[derive(sqlx::FromRow)]
struct LogRow {
    log_id: i64,
    job_id: Uuid,
    source_id: Option<Uuid>,
    timestamp: DateTime<Utc>,
    log_level: String,
    message: String,
    additional_data: serde_json::Value,
}

impl TryFrom<LogRow> for LogEvent {
    type Error = ScrapeError;

    fn try_from(row: LogRow) -> Result<Self> {
        let log_level: LogLevel = row
            .log_level
            .parse()
            .map_err(|e| ScrapeError::Database(format!("corrupt log level: {e}")))?;
        let additional_data: EventData = serde_json::from_value(row.additional_data)
            .map_err(|e| ScrapeError::Database(format!("corrupt event payload: {e}")))?;
        Ok(LogEvent {
            log_id: row.log_id,
            job_id: row.job_id,
            source_id: row.source_id,
            timestamp: row.timestamp,
            log_level,
            message: row.message,
            additional_data,
        })
    }
}

#[derive(Clone)]
pub struct LogRepository {
    pool: PgPool,
}

impl LogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<LogEvent>> {
        let rows: Vec<LogRow> = sqlx::query_as(
            "SELECT log_id, job_id, source_id, timestamp, log_level, message, additional_data
             FROM scraping_logs WHERE job_id = $1 ORDER BY timestamp, log_id",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ScrapeError::Database(format!("failed to list logs: {e}")))?;

        rows.into_iter().map(LogEvent::try_from).collect()
    }
}

/// `EventSink` over the `scraping_logs` table.
#[derive(Clone)]
pub struct PgEventSink {
    pool: PgPool,
}

impl PgEventSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EventSink for PgEventSink {
    async fn write(&self, event: NewLogEvent) -> Result<()> {
        let payload = serde_json::to_value(&event.additional_data)
            .map_err(|e| ScrapeError::Database(format!("failed to serialize event: {e}")))?;

        sqlx::query(
            "INSERT INTO scraping_logs (job_id, source_id, log_level, message, additional_data)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(event.job_id)
        .bind(event.source_id)
        .bind(event.log_level.to_string())
        .bind(&event.message)
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(|e| ScrapeError::Database(format!("failed to insert log event: {e}")))?;

        Ok(())
    }
}
