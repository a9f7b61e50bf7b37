//! Engine core: wires the fetch, extraction, persistence, and events
//! crates into the job lifecycle the HTTP API drives.

pub mod cancellation;
pub mod job_manager;
pub mod persister;
pub mod recovery;
pub mod source_extractor;
pub mod verifier;

use std::sync::Arc;

use scrape_events::StructuredLogger;
use scrape_fetch::FetchClient;
use scrape_persistence::{ArticleRepository, JobRepository, LogRepository, SourceRepository};
use scrape_types::Result;

pub use job_manager::JobManager;
pub use recovery::StartupRecoverer;
pub use verifier::Verifier;

/// Everything a running process needs, built once at startup from a
/// connected pool and handed to the HTTP layer.
pub struct Engine {
    pub jobs: Arc<JobManager>,
    pub job_repo: JobRepository,
    pub sources: SourceRepository,
    pub articles: ArticleRepository,
    pub logs: LogRepository,
    pub verifier: Verifier,
    pub recoverer: StartupRecoverer,
    pub fetch: Arc<FetchClient>,
}

impl Engine {
    pub fn new(pool: sqlx::PgPool, sink: Arc<dyn scrape_events::EventSink>) -> Result<Self> {
        let logger = StructuredLogger::new(sink);
        let job_repo = JobRepository::new(pool.clone());
        let source_repo = SourceRepository::new(pool.clone());
        let article_repo = ArticleRepository::new(pool.clone());
        let log_repo = LogRepository::new(pool.clone());

        let fetch = Arc::new(FetchClient::new().map_err(|e| {
            scrape_types::ScrapeError::Internal(format!("failed to build http client: {e}"))
        })?);

        let job_manager = Arc::new(JobManager::new(
            pool,
            job_repo.clone(),
            source_repo.clone(),
            article_repo.clone(),
            log_repo.clone(),
            logger.clone(),
            fetch.clone(),
        ));

        let verifier = Verifier::new(log_repo.clone(), article_repo.clone(), logger.clone());
        let recoverer = StartupRecoverer::new(job_repo.clone(), logger);

        Ok(Self {
            jobs: job_manager,
            job_repo,
            sources: source_repo,
            articles: article_repo,
            logs: log_repo,
            verifier,
            recoverer,
            fetch,
        })
    }
}
