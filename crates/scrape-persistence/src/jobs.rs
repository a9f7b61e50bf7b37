//! `scraping_jobs` table: job lifecycle rows.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use scrape_types::{JobStatus, Result, ScrapeError, ScrapingJob};

#[derive(sqlx::FromRow)]
struct JobRow {
    job_id: Uuid,
    status: String,
    sources_requested: Vec<String>,
    articles_per_source: i32,
    total_articles_scraped: i32,
    total_errors: i32,
    enable_tracking: bool,
    triggered_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<JobRow> for ScrapingJob {
    type Error = ScrapeError;

    fn try_from(row: JobRow) -> Result<Self> {
        let status: JobStatus = row
            .status
            .parse()
            .map_err(|e| ScrapeError::Database(format!("corrupt job status: {e}")))?;
        Ok(ScrapingJob {
            job_id: row.job_id,
            status,
            sources_requested: row.sources_requested,
            articles_per_source: row.articles_per_source as u32,
            total_articles_scraped: row.total_articles_scraped as u32,
            total_errors: row.total_errors as u32,
            enable_tracking: row.enable_tracking,
            triggered_at: row.triggered_at,
            completed_at: row.completed_at,
        })
    }
}

#[derive(Clone)]
pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, job))]
    pub async fn create(&self, job: &ScrapingJob) -> Result<()> {
        sqlx::query(
            "INSERT INTO scraping_jobs
                (job_id, status, sources_requested, articles_per_source,
                 total_articles_scraped, total_errors, enable_tracking, triggered_at, completed_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(job.job_id)
        .bind(job.status.to_string())
        .bind(&job.sources_requested)
        .bind(job.articles_per_source as i32)
        .bind(job.total_articles_scraped as i32)
        .bind(job.total_errors as i32)
        .bind(job.enable_tracking)
        .bind(job.triggered_at)
        .bind(job.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ScrapeError::Database(format!("failed to insert job: {e}")))?;

        debug!(job_id = %job.job_id, "job created");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn mark_in_progress(&self, job_id: Uuid) -> Result<()> {
        self.set_status(job_id, JobStatus::InProgress).await
    }

    async fn set_status(&self, job_id: Uuid, status: JobStatus) -> Result<()> {
        sqlx::query("UPDATE scraping_jobs SET status = $2 WHERE job_id = $1")
            .bind(job_id)
            .bind(status.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| ScrapeError::Database(format!("failed to update job status: {e}")))?;
        Ok(())
    }

    /// Close out a job with its final counters. `status` must already be
    /// one of the terminal states; the caller (the persister) computes
    /// which one based on how many articles were actually saved.
    #[instrument(skip(self))]
    pub async fn finalize(
        &self,
        job_id: Uuid,
        status: JobStatus,
        total_articles_scraped: u32,
        total_errors: u32,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE scraping_jobs
             SET status = $2, total_articles_scraped = $3, total_errors = $4, completed_at = $5
             WHERE job_id = $1",
        )
        .bind(job_id)
        .bind(status.to_string())
        .bind(total_articles_scraped as i32)
        .bind(total_errors as i32)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| ScrapeError::Database(format!("failed to finalize job: {e}")))?;

        debug!(job_id = %job_id, %status, "job finalized");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, job_id: Uuid) -> Result<ScrapingJob> {
        let job = self.get_by_id(job_id).await?;
        if job.status.is_terminal() {
            return Err(ScrapeError::JobNotCancellable(job_id));
        }

        sqlx::query(
            "UPDATE scraping_jobs SET status = $2, completed_at = $3 WHERE job_id = $1",
        )
        .bind(job_id)
        .bind(JobStatus::Cancelled.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| ScrapeError::Database(format!("failed to cancel job: {e}")))?;

        self.get_by_id(job_id).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, job_id: Uuid) -> Result<ScrapingJob> {
        let row: Option<JobRow> = sqlx::query_as("SELECT * FROM scraping_jobs WHERE job_id = $1")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ScrapeError::Database(format!("failed to fetch job: {e}")))?;

        match row {
            Some(row) => ScrapingJob::try_from(row),
            None => Err(ScrapeError::JobNotFound(job_id)),
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<ScrapingJob>> {
        let rows: Vec<JobRow> = sqlx::query_as(
            "SELECT * FROM scraping_jobs ORDER BY triggered_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ScrapeError::Database(format!("failed to list jobs: {e}")))?;

        rows.into_iter().map(ScrapingJob::try_from).collect()
    }

    /// Jobs triggered since `since`, newest first. Backs the dashboard
    /// metrics rollup, which windows over the last 7 days.
    #[instrument(skip(self))]
    pub async fn list_recent(&self, since: DateTime<Utc>) -> Result<Vec<ScrapingJob>> {
        let rows: Vec<JobRow> = sqlx::query_as(
            "SELECT * FROM scraping_jobs WHERE triggered_at >= $1 ORDER BY triggered_at DESC",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ScrapeError::Database(format!("failed to list recent jobs: {e}")))?;

        rows.into_iter().map(ScrapingJob::try_from).collect()
    }

    /// Jobs left in `new`/`in-progress` from before the process started,
    /// older than the stuck-job age threshold. The startup recoverer marks
    /// these `failed` since no worker is coming back to finish them.
    #[instrument(skip(self))]
    pub async fn find_stuck(&self, older_than: DateTime<Utc>) -> Result<Vec<ScrapingJob>> {
        let rows: Vec<JobRow> = sqlx::query_as(
            "SELECT * FROM scraping_jobs
             WHERE status IN ('new', 'in-progress') AND triggered_at < $1",
        )
        .bind(older_than)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ScrapeError::Database(format!("failed to query stuck jobs: {e}")))?;

        rows.into_iter().map(ScrapingJob::try_from).collect()
    }
}
