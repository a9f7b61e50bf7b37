//! `NewsSource` — an administratively managed RSS feed the engine reads from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A configured news source. Created/updated out of band; the scraper only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsSource {
    pub source_id: Uuid,
    pub name: String,
    pub domain: String,
    pub rss_url: Option<String>,
    pub icon_url: Option<String>,
    pub user_agent: String,
    pub delay_between_requests_ms: u64,
    pub timeout_ms: u64,
    pub respect_robots_txt: bool,
    pub created_at: DateTime<Utc>,
}

impl NewsSource {
    /// A source with no `rss_url` cannot be scraped.
    pub fn usable_rss_url(&self) -> Option<&str> {
        self.rss_url.as_deref().filter(|u| !u.is_empty())
    }
}

/// Payload for creating a new source (admin surface).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSource {
    pub name: String,
    pub domain: String,
    pub rss_url: Option<String>,
    pub icon_url: Option<String>,
    pub user_agent: Option<String>,
    pub delay_between_requests_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub respect_robots_txt: Option<bool>,
}

/// Partial update for an existing source (admin surface).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceUpdate {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub rss_url: Option<String>,
    pub icon_url: Option<String>,
    pub user_agent: Option<String>,
    pub delay_between_requests_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub respect_robots_txt: Option<bool>,
}

pub const DEFAULT_USER_AGENT: &str = "scrape-engine/0.1 (+news-aggregator)";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_DELAY_MS: u64 = 500;
