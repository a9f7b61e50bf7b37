//! `ScrapingJob` — the unit of work the Job Manager creates and finalizes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal and non-terminal states of a scraping job.
///
/// Transitions: `New -> InProgress -> (Successful | Partial | Failed)`;
/// any running job may additionally be forced to `Cancelled`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum JobStatus {
    New,
    InProgress,
    Successful,
    Partial,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::New | JobStatus::InProgress)
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(JobStatus::New),
            "in-progress" | "running" => Ok(JobStatus::InProgress),
            "successful" => Ok(JobStatus::Successful),
            "partial" => Ok(JobStatus::Partial),
            "failed" => Ok(JobStatus::Failed),
            "cancelled" => Ok(JobStatus::Cancelled),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::New => "new",
            JobStatus::InProgress => "in-progress",
            JobStatus::Successful => "successful",
            JobStatus::Partial => "partial",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// A scraping job: the span of work triggered for a set of sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapingJob {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub sources_requested: Vec<String>,
    pub articles_per_source: u32,
    pub total_articles_scraped: u32,
    pub total_errors: u32,
    pub enable_tracking: bool,
    pub triggered_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ScrapingJob {
    /// Create the initial row for a freshly triggered job. Invariant: `status = New`
    /// implies `completed_at` is null and counters are zero.
    pub fn new(sources_requested: Vec<String>, articles_per_source: u32, enable_tracking: bool) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            status: JobStatus::New,
            sources_requested,
            articles_per_source,
            total_articles_scraped: 0,
            total_errors: 0,
            enable_tracking,
            triggered_at: Utc::now(),
            completed_at: None,
        }
    }
}

/// Request bounds for `trigger_job`.
pub const MIN_ARTICLES_PER_SOURCE: u32 = 1;
pub const MAX_ARTICLES_PER_SOURCE: u32 = 100;

/// A stuck job is `new`/`in-progress` and older than this when the process starts.
pub const STUCK_JOB_AGE: chrono::Duration = chrono::Duration::hours(1);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerRequest {
    pub sources: Vec<String>,
    pub max_articles: u32,
    pub enable_tracking: Option<bool>,
}

impl TriggerRequest {
    /// Validate request bounds; returns the reason for rejection when invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.sources.is_empty() {
            return Err("sources must contain at least one entry".into());
        }
        if !(MIN_ARTICLES_PER_SOURCE..=MAX_ARTICLES_PER_SOURCE).contains(&self.max_articles) {
            return Err(format!(
                "maxArticles must be between {MIN_ARTICLES_PER_SOURCE} and {MAX_ARTICLES_PER_SOURCE}"
            ));
        }
        Ok(())
    }
}

/// Per-source tallies surfaced in `EnhancedJobMetrics`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceMetrics {
    pub extracted: u32,
    pub saved: u32,
    pub duplicates: u32,
    pub failures: u32,
    pub success: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TotalMetrics {
    pub target_articles: u32,
    pub candidates_processed: u32,
    pub extracted: u32,
    pub saved: u32,
    pub duplicates: u32,
    pub actual_success_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnhancedJobMetrics {
    pub sources: std::collections::HashMap<String, SourceMetrics>,
    pub totals: TotalMetrics,
}
