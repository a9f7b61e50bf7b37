//! Request/response shapes specific to the HTTP surface. Domain types
//! (`NewsSource`, `ScrapingJob`, ...) live in `scrape-types` and are
//! returned as-is where no API-specific shaping is needed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct TestSourceRequest {
    pub rss_url: String,
}

#[derive(Debug, Serialize)]
pub struct TestSourceResponse {
    pub valid: bool,
    pub message: String,
}

/// `dashboard_metrics()` rollup over a 7-day window.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub jobs_triggered: u32,
    pub success_rate: f64,
    pub articles_scraped: u32,
    pub average_job_duration_ms: f64,
    pub active_jobs: u32,
    pub recent_errors: u32,
}
