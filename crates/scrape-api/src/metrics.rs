//! Dashboard metrics rollup, recomputed from the jobs table and cached for
//! up to 60 seconds so a dashboard polling every few seconds doesn't put
//! read pressure on the database.

use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::Mutex;

use scrape_types::JobStatus;

use crate::dto::DashboardMetrics;
use crate::errors::ApiError;
use crate::state::AppState;

const CACHE_TTL: Duration = Duration::from_secs(60);
const WINDOW: chrono::Duration = chrono::Duration::days(7);

pub struct DashboardCache {
    cached: Mutex<Option<(Instant, DashboardMetrics)>>,
}

impl DashboardCache {
    pub fn new() -> Self {
        Self { cached: Mutex::new(None) }
    }

    pub async fn get_or_refresh(&self, state: &AppState) -> Result<DashboardMetrics, ApiError> {
        let mut cached = self.cached.lock().await;
        if let Some((fetched_at, metrics)) = cached.as_ref() {
            if fetched_at.elapsed() < CACHE_TTL {
                return Ok(metrics.clone());
            }
        }

        let metrics = compute(state).await?;
        *cached = Some((Instant::now(), metrics.clone()));
        Ok(metrics)
    }
}

async fn compute(state: &AppState) -> Result<DashboardMetrics, ApiError> {
    let since = Utc::now() - WINDOW;
    let jobs = state.engine.job_repo.list_recent(since).await?;

    let active_jobs = jobs
        .iter()
        .filter(|j| matches!(j.status, JobStatus::New | JobStatus::InProgress))
        .count() as u32;

    let terminal: Vec<_> = jobs.iter().filter(|j| j.status.is_terminal()).collect();
    let successful = terminal
        .iter()
        .filter(|j| matches!(j.status, JobStatus::Successful | JobStatus::Partial))
        .count();

    let success_rate = if terminal.is_empty() {
        0.0
    } else {
        successful as f64 / terminal.len() as f64
    };

    let articles_scraped: u32 = jobs.iter().map(|j| j.total_articles_scraped).sum();
    let recent_errors: u32 = jobs.iter().map(|j| j.total_errors).sum();

    let durations_ms: Vec<f64> = terminal
        .iter()
        .filter_map(|j| {
            j.completed_at
                .map(|completed| (completed - j.triggered_at).num_milliseconds() as f64)
        })
        .collect();
    let average_job_duration_ms = if durations_ms.is_empty() {
        0.0
    } else {
        durations_ms.iter().sum::<f64>() / durations_ms.len() as f64
    };

    Ok(DashboardMetrics {
        jobs_triggered: jobs.len() as u32,
        success_rate,
        articles_scraped,
        average_job_duration_ms,
        active_jobs,
        recent_errors,
    })
}
