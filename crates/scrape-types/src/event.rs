//! Structured log events.
//!
//! `additional_data` is modeled as a tagged union over `event_type`, each variant
//! carrying its own `event_name`-tagged payload as a plain record, rather than as
//! a freeform property bag. A single serde derive maps the union to the JSON
//! shape the `scraping_logs.additional_data` column expects; readers downstream
//! stay JSON-schema-flexible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::job::EnhancedJobMetrics;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(LogLevel::Info),
            "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level: {other}")),
        }
    }
}

/// A single append-only log row. Never mutated or deleted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub log_id: i64,
    pub job_id: Uuid,
    pub source_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    pub log_level: LogLevel,
    pub message: String,
    pub additional_data: EventData,
}

/// A new event prior to assignment of a `log_id` by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLogEvent {
    pub job_id: Uuid,
    pub source_id: Option<Uuid>,
    pub log_level: LogLevel,
    pub message: String,
    pub additional_data: EventData,
}

/// Attribution recorded alongside persisted articles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceAttribution {
    pub source_name: String,
    pub source_id: Uuid,
    pub source_url: String,
    pub source_url_domain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum EventData {
    Lifecycle(LifecycleEvent),
    Source(SourceEvent),
    Http(HttpEvent),
    Extraction(ExtractionEvent),
    Persistence(PersistenceEvent),
    Performance(PerformanceEvent),
    Verification(VerificationEvent),
    ArticleLifecycle(ArticleLifecycleEvent),
    Error(ErrorEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_name", rename_all = "snake_case")]
pub enum LifecycleEvent {
    JobStarted {
        sources: Vec<String>,
        articles_per_source: u32,
        total_expected: u32,
        trigger_method: String,
    },
    ExtractionPhaseCompleted {
        successful_sources: Vec<String>,
        failed_sources: Vec<String>,
        total_extracted: u32,
        extraction_failures: std::collections::HashMap<String, String>,
    },
    JobCompletedEnhanced {
        metrics: EnhancedJobMetrics,
    },
    JobCancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_name", rename_all = "snake_case")]
pub enum SourceEvent {
    SourceStarted {
        source_name: String,
        rss_url: String,
        target_articles: u32,
    },
    RssFetchRetry {
        attempt: u32,
        max_attempts: u32,
        retry_delay_ms: u64,
        error: String,
    },
    RssParsed {
        feed_title: Option<String>,
        total_items: u32,
        items_to_process: u32,
    },
    SourceExtractionCompleted {
        articles_extracted: u32,
        target_articles: u32,
        duration_ms: u64,
    },
    SourceExtractionFailed {
        error: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_name", rename_all = "snake_case")]
pub enum HttpEvent {
    HttpRequest {
        url: String,
        correlation_id: Uuid,
    },
    HttpResponse {
        url: String,
        status: u16,
        duration_ms: u64,
        correlation_id: Uuid,
    },
    HttpError {
        url: String,
        attempt: u32,
        error: String,
        correlation_id: Uuid,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_name", rename_all = "snake_case")]
pub enum ExtractionEvent {
    ExtractionCompleted {
        url: String,
        method: String,
        quality_score: u32,
        content_length: usize,
        extraction_ms: u64,
        #[serde(default)]
        traces: Vec<TraceEntry>,
    },
    ExtractionFailed {
        url: String,
        method: String,
        error_message: String,
    },
}

/// One resolved field of an extraction, carried on the log event only when
/// the triggering request asked for `enableTracking`; never persisted to
/// `scraped_content` itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub field: String,
    pub selector: String,
    pub method: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_name", rename_all = "snake_case")]
pub enum PersistenceEvent {
    ArticleInsertSuccess {
        article_tracking_id: String,
        source_attribution: SourceAttribution,
        database_article_id: Uuid,
    },
    ArticleInsertFailure {
        article_tracking_id: String,
        source_attribution: SourceAttribution,
        error: String,
    },
    SourcePersistenceCompleted {
        saved: u32,
        duplicates: u32,
        failures: u32,
        success: bool,
    },
    PersistenceFailure {
        detail: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_name", rename_all = "snake_case")]
pub enum PerformanceEvent {
    PerformanceSnapshot {
        mem_mb: f64,
        cpu_pct: f64,
        active_reqs: u32,
        queue_size: u32,
        avg_resp_ms: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceVerification {
    pub source_name: String,
    pub claimed: u32,
    pub actual: u32,
    pub discrepancy: i64,
    pub sample_article_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_name", rename_all = "snake_case")]
pub enum VerificationEvent {
    DatabaseVerificationCompleted {
        verification_results: Vec<SourceVerification>,
        total_claimed: u32,
        total_actual: u32,
        has_discrepancies: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_name", rename_all = "snake_case")]
pub enum ArticleLifecycleEvent {
    ArticleDropped { url: String, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_name", rename_all = "snake_case")]
pub enum ErrorEvent {
    TeardownFailure { source_name: String, detail: String },
    StuckJobRecovered { job_id: Uuid, triggered_at: DateTime<Utc> },
}
