//! A thin HTTP client over `reqwest`, retried per-call via [`retry_with_backoff`].

use std::time::Duration;

use thiserror::Error;

use crate::retry::{retry_with_backoff, AttemptOutcome, BackoffPolicy};

#[derive(Error, Debug, Clone)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("non-success status {status} for {url}")]
    Status { url: String, status: u16 },
}

/// A fetched HTTP response reduced to what the engine needs: status and body.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct FetchClient {
    client: reqwest::Client,
}

impl FetchClient {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    /// A single GET attempt with no retry. Used both as the inner attempt
    /// for [`Self::get_with_retry`] and directly by callers that want to
    /// validate reachability without a retry policy (e.g. source testing).
    pub async fn get_once(
        &self,
        url: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<FetchedResponse, FetchError> {
        let resp = self
            .client
            .get(url)
            .header("User-Agent", user_agent)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(FetchedResponse {
            status: status.as_u16(),
            body,
        })
    }

    /// Fetch `url` with a bounded retry policy, reporting each failed attempt
    /// through `on_retry` before sleeping. `on_retry` is how callers emit
    /// `rss_fetch_retry` / `http_error` log events without this crate
    /// depending on the event log.
    pub async fn get_with_retry<OnRetry>(
        &self,
        url: &str,
        user_agent: &str,
        timeout: Duration,
        policy: BackoffPolicy,
        mut on_retry: OnRetry,
    ) -> Result<FetchedResponse, FetchError>
    where
        OnRetry: FnMut(u32, u32, Duration, &FetchError),
    {
        retry_with_backoff(
            policy,
            |_attempt| async {
                match self.get_once(url, user_agent, timeout).await {
                    Ok(resp) => AttemptOutcome::Success(resp),
                    Err(err) => AttemptOutcome::Retry(err),
                }
            },
            |attempt, max_attempts, delay, err| on_retry(attempt, max_attempts, delay, err),
        )
        .await
    }
}
