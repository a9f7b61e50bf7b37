//! Retry control flow expressed as a small state machine rather than nested
//! try/catch loops: `Initial -> Trying(attempt) -> Sleeping(delay) ->
//! GivingUp | Succeeded`.

use std::time::Duration;

/// Exponential backoff with no cap other than the attempt budget itself.
/// RSS fetch uses `2^attempt` seconds; page fetch uses the same shape with
/// a smaller base delay so three attempts stay cheap per candidate.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub base: Duration,
}

impl BackoffPolicy {
    pub const fn new(max_attempts: u32, base: Duration) -> Self {
        Self { max_attempts, base }
    }

    /// RSS fetch: up to three attempts, sleeping `2^attempt` seconds.
    pub const fn rss() -> Self {
        Self::new(3, Duration::from_secs(1))
    }

    /// Per-candidate page fetch: up to three attempts.
    pub const fn page() -> Self {
        Self::new(3, Duration::from_millis(500))
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base * 2u32.saturating_pow(attempt)
    }
}

/// Outcome of a single attempt inside a retry loop.
pub enum AttemptOutcome<T, E> {
    Success(T),
    Retry(E),
    GiveUp(E),
}

/// Drive `op` through up to `policy.max_attempts` attempts, calling `on_retry`
/// between attempts (used by the caller to emit `rss_fetch_retry`/`http_error`
/// events without this crate depending on the event log).
pub async fn retry_with_backoff<T, E, F, Fut, OnRetry>(
    policy: BackoffPolicy,
    mut op: F,
    mut on_retry: OnRetry,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = AttemptOutcome<T, E>>,
    OnRetry: FnMut(u32, u32, Duration, &E),
{
    let mut last_err = None;
    for attempt in 0..policy.max_attempts {
        match op(attempt).await {
            AttemptOutcome::Success(value) => return Ok(value),
            AttemptOutcome::GiveUp(err) => return Err(err),
            AttemptOutcome::Retry(err) => {
                let is_last = attempt + 1 == policy.max_attempts;
                if !is_last {
                    let delay = policy.delay_for(attempt + 1);
                    on_retry(attempt + 1, policy.max_attempts, delay, &err);
                    tokio::time::sleep(delay).await;
                }
                last_err = Some(err);
            }
        }
    }
    // Safety: loop always sets last_err before exhausting attempts (max_attempts >= 1).
    Err(last_err.expect("retry loop ran at least once"))
}
