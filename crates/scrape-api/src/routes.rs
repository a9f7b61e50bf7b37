use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/jobs", post(handlers::trigger_job).get(handlers::list_jobs))
        .route("/jobs/:job_id", get(handlers::get_job))
        .route("/jobs/:job_id/logs", get(handlers::get_job_logs))
        .route("/jobs/:job_id/cancel", post(handlers::cancel_job))
        .route("/articles", get(handlers::list_articles))
        .route("/metrics/dashboard", get(handlers::dashboard_metrics))
        .route(
            "/sources",
            get(handlers::list_sources).post(handlers::create_source),
        )
        .route(
            "/sources/:source_id",
            put(handlers::update_source).delete(handlers::delete_source),
        )
        .route("/sources/test", post(handlers::test_source))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}
