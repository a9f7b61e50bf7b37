//! Shared application state handed to every handler.

use std::sync::Arc;

use scrape_engine::Engine;
use scrape_fetch::FetchClient;

use crate::metrics::DashboardCache;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub fetch: Arc<FetchClient>,
    pub dashboard_cache: Arc<DashboardCache>,
}

impl AppState {
    pub fn new(engine: Arc<Engine>) -> Self {
        let fetch = engine.fetch.clone();
        Self {
            engine,
            fetch,
            dashboard_cache: Arc::new(DashboardCache::new()),
        }
    }
}
