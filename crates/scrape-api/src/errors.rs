//! API-facing error type. Wraps the engine's domain error and attaches the
//! HTTP status code and JSON body a client should see.

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use thiserror::Error;

use scrape_types::ScrapeError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl From<ScrapeError> for ApiError {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::SourceNotFound(name) => ApiError::NotFound(format!("source not found: {name}")),
            ScrapeError::JobNotFound(id) => ApiError::NotFound(format!("job not found: {id}")),
            ScrapeError::JobNotCancellable(id) => {
                ApiError::Conflict(format!("job {id} is not cancellable"))
            }
            ScrapeError::MissingRssUrl(name) => {
                ApiError::InvalidRequest(format!("source {name} has no rss_url"))
            }
            ScrapeError::InvalidRequest(reason) => ApiError::InvalidRequest(reason),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_type = self.error_type();
        let message = self.to_string();

        match status {
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error_type, %message, "api error");
            }
            _ => tracing::warn!(error_type, %message, "client error"),
        }

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn source_not_found_maps_to_404() {
        let err: ApiError = ScrapeError::SourceNotFound("Alpha".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn job_not_cancellable_maps_to_conflict() {
        let err: ApiError = ScrapeError::JobNotCancellable(Uuid::new_v4()).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn database_error_maps_to_internal() {
        let err: ApiError = ScrapeError::Database("connection lost".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_type(), "internal_error");
    }

    #[test]
    fn invalid_request_preserves_reason() {
        let err: ApiError = ScrapeError::InvalidRequest("sources must be non-empty".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("sources must be non-empty"));
    }
}
