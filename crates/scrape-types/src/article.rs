//! `ScrapedArticle` — the durable, deduplicated result of extraction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProcessingStatus {
    Completed,
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "completed")
    }
}

/// A persisted article. Business identity is `source_url` and `content_hash`,
/// both unique; `article_id` is a surrogate key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedArticle {
    pub article_id: Uuid,
    pub source_id: Uuid,
    pub job_id: Option<Uuid>,
    pub source_url: String,
    pub title: String,
    pub content: String,
    pub author: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
    pub language: String,
    pub content_hash: String,
    pub processing_status: ProcessingStatus,
    pub created_at: DateTime<Utc>,
}

/// The in-memory result of extracting one candidate page, before persistence.
/// Owned by the per-source extractor until handed off to the persister.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedArticle {
    pub title: String,
    pub content: String,
    pub author: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
    pub source_url: String,
    pub source_id: Uuid,
    pub language: String,
    pub content_hash: String,
}

pub const DEFAULT_LANGUAGE: &str = "en";
