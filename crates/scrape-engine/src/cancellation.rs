//! Cooperative cancellation: jobs poll a shared flag at suspension points
//! (before each RSS fetch, between page fetches) instead of being forcibly
//! aborted mid-write. A job that's already past its last poll still
//! finishes the in-flight page, so the transaction it opens is never torn
//! half-done by a cancel request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct CancellationRegistry {
    flags: Arc<DashMap<Uuid, Arc<AtomicBool>>>,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, job_id: Uuid) -> CancellationToken {
        let flag = Arc::new(AtomicBool::new(false));
        self.flags.insert(job_id, flag.clone());
        CancellationToken { flag }
    }

    /// Request cancellation for a running job. Returns `false` if the job
    /// isn't currently registered (already finished, or never started).
    pub fn cancel(&self, job_id: Uuid) -> bool {
        match self.flags.get(&job_id) {
            Some(flag) => {
                flag.store(true, Ordering::SeqCst);
                true
            }
            None => false,
        }
    }

    pub fn deregister(&self, job_id: Uuid) {
        self.flags.remove(&job_id);
    }
}

#[derive(Clone)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_visible_through_token() {
        let registry = CancellationRegistry::new();
        let job_id = Uuid::new_v4();
        let token = registry.register(job_id);

        assert!(!token.is_cancelled());
        assert!(registry.cancel(job_id));
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancel_unknown_job_returns_false() {
        let registry = CancellationRegistry::new();
        assert!(!registry.cancel(Uuid::new_v4()));
    }
}
