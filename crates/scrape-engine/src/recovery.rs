//! Startup recovery: a process crash or restart can leave jobs stuck in
//! `new`/`in-progress` with nobody left to finish them. On boot, sweep
//! those and mark them `failed` rather than let them sit forever.

use chrono::Utc;

use scrape_events::StructuredLogger;
use scrape_persistence::JobRepository;
use scrape_types::{EventData, ErrorEvent, JobStatus, LogLevel, Result, STUCK_JOB_AGE};

pub struct StartupRecoverer {
    jobs: JobRepository,
    logger: StructuredLogger,
}

impl StartupRecoverer {
    pub fn new(jobs: JobRepository, logger: StructuredLogger) -> Self {
        Self { jobs, logger }
    }

    /// Mark every job stuck since before `STUCK_JOB_AGE` as failed, logging
    /// one `StuckJobRecovered` event per job. Returns how many were swept.
    pub async fn recover(&self) -> Result<u32> {
        let cutoff = Utc::now() - STUCK_JOB_AGE;
        let stuck = self.jobs.find_stuck(cutoff).await?;

        for job in &stuck {
            self.jobs
                .finalize(job.job_id, JobStatus::Failed, job.total_articles_scraped, job.total_errors)
                .await?;

            self.logger
                .log(
                    job.job_id,
                    None,
                    LogLevel::Error,
                    "stuck job recovered on startup",
                    EventData::Error(ErrorEvent::StuckJobRecovered {
                        job_id: job.job_id,
                        triggered_at: job.triggered_at,
                    }),
                )
                .await
                .ok();
        }

        tracing::info!(recovered = stuck.len(), "startup recovery complete");
        Ok(stuck.len() as u32)
    }
}
