//! Route handlers. Each one is a thin translation between the HTTP
//! surface and the engine/persistence layer; no business logic lives here.

use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use scrape_types::{
    LogEvent, NewSource, NewsSource, ScrapedArticle, ScrapingJob, SourceUpdate, TriggerRequest,
};

use crate::dto::{DashboardMetrics, PageQuery, TestSourceRequest, TestSourceResponse};
use crate::errors::ApiError;
use crate::state::AppState;

const RSS_VALIDATION_TIMEOUT: Duration = Duration::from_secs(10);
const RSS_VALIDATION_USER_AGENT: &str = "scrape-engine/0.1 (source validation)";
const RSS_MARKERS: [&str; 3] = ["<rss", "<feed", "<channel>"];

pub async fn trigger_job(
    State(state): State<AppState>,
    Json(request): Json<TriggerRequest>,
) -> Result<Json<ScrapingJob>, ApiError> {
    let job = state.engine.jobs.trigger(request).await?;
    Ok(Json(job))
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<ScrapingJob>>, ApiError> {
    let jobs = state.engine.job_repo.list(page.limit, page.offset).await?;
    Ok(Json(jobs))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ScrapingJob>, ApiError> {
    let job = state.engine.job_repo.get_by_id(job_id).await?;
    Ok(Json(job))
}

pub async fn get_job_logs(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Vec<LogEvent>>, ApiError> {
    let logs = state.engine.logs.list_by_job(job_id).await?;
    Ok(Json(logs))
}

pub async fn cancel_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<ScrapingJob>, ApiError> {
    let job = state.engine.jobs.cancel(job_id).await?;
    Ok(Json(job))
}

pub async fn list_articles(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<ScrapedArticle>>, ApiError> {
    let articles = state.engine.articles.list(page.limit, page.offset).await?;
    Ok(Json(articles))
}

pub async fn dashboard_metrics(
    State(state): State<AppState>,
) -> Result<Json<DashboardMetrics>, ApiError> {
    let metrics = state.dashboard_cache.get_or_refresh(&state).await?;
    Ok(Json(metrics))
}

pub async fn list_sources(State(state): State<AppState>) -> Result<Json<Vec<NewsSource>>, ApiError> {
    let sources = state.engine.sources.list_all().await?;
    Ok(Json(sources))
}

pub async fn create_source(
    State(state): State<AppState>,
    Json(new_source): Json<NewSource>,
) -> Result<Json<NewsSource>, ApiError> {
    if let Some(rss_url) = &new_source.rss_url {
        validate_rss_reachable(&state, rss_url).await?;
    }
    let source = state.engine.sources.create(new_source).await?;
    Ok(Json(source))
}

pub async fn update_source(
    State(state): State<AppState>,
    Path(source_id): Path<Uuid>,
    Json(update): Json<SourceUpdate>,
) -> Result<Json<NewsSource>, ApiError> {
    if let Some(rss_url) = &update.rss_url {
        validate_rss_reachable(&state, rss_url).await?;
    }
    let source = state.engine.sources.update(source_id, update).await?;
    Ok(Json(source))
}

pub async fn delete_source(
    State(state): State<AppState>,
    Path(source_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.engine.sources.delete(source_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn test_source(
    State(state): State<AppState>,
    Json(request): Json<TestSourceRequest>,
) -> Result<Json<TestSourceResponse>, ApiError> {
    match validate_rss_reachable(&state, &request.rss_url).await {
        Ok(()) => Ok(Json(TestSourceResponse {
            valid: true,
            message: "rss feed reachable and well-formed".to_string(),
        })),
        Err(e) => Ok(Json(TestSourceResponse {
            valid: false,
            message: e.to_string(),
        })),
    }
}

/// GET the candidate feed with a 10s bound and check the body looks like
/// RSS/Atom. Shared by `create_source`, `update_source`, and `test_source`.
async fn validate_rss_reachable(state: &AppState, rss_url: &str) -> Result<(), ApiError> {
    let response = state
        .fetch
        .get_once(rss_url, RSS_VALIDATION_USER_AGENT, RSS_VALIDATION_TIMEOUT)
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("rss_url unreachable: {e}")))?;

    if RSS_MARKERS.iter().any(|marker| response.body.contains(marker)) {
        Ok(())
    } else {
        Err(ApiError::InvalidRequest(
            "rss_url did not return a recognizable RSS/Atom body".to_string(),
        ))
    }
}
