//! Transactional persister: every article extracted across every source in
//! a job is written inside a single transaction, committed once at the
//! end. A single row's insert failure is isolated to a savepoint so it
//! doesn't poison the rest of the job's writes; only an error opening or
//! committing the transaction itself aborts everything. The job's final
//! status is computed and written in that same transaction, so a crash
//! between persisting articles and recording the outcome is impossible.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use scrape_events::StructuredLogger;
use scrape_persistence::ArticleRepository;
use scrape_types::{
    EventData, ExtractedArticle, JobStatus, LogLevel, PersistenceEvent, Result, ScrapeError,
    SourceAttribution, SourceMetrics,
};

pub struct PersistOutcome {
    pub per_source: HashMap<String, SourceMetrics>,
    pub total_saved: u32,
    pub total_errors: u32,
    pub final_status: JobStatus,
}

pub struct TransactionalPersister<'p> {
    pool: &'p sqlx::PgPool,
    articles: ArticleRepository,
    logger: StructuredLogger,
}

impl<'p> TransactionalPersister<'p> {
    pub fn new(pool: &'p sqlx::PgPool, articles: ArticleRepository, logger: StructuredLogger) -> Self {
        Self { pool, articles, logger }
    }

    /// `extracted` carries, per source, the articles it produced and how
    /// many extraction-phase failures already counted against it.
    /// `target` is `sources_requested.len() * articles_per_source` (N in
    /// the final-status computation); `cancelled` overrides the computed
    /// status with `Cancelled` when the job was aborted mid-run.
    pub async fn persist(
        &self,
        job_id: Uuid,
        extracted: Vec<(String, Vec<ExtractedArticle>, u32)>,
        target: u32,
        cancelled: bool,
    ) -> Result<PersistOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ScrapeError::Database(format!("failed to begin transaction: {e}")))?;

        let mut per_source: HashMap<String, SourceMetrics> = HashMap::new();
        let mut total_saved = 0u32;
        let mut total_extracted = 0u32;

        for (source_name, articles, extraction_failures) in extracted {
            let mut metrics = SourceMetrics {
                failures: extraction_failures,
                ..SourceMetrics::default()
            };

            for article in &articles {
                metrics.extracted += 1;
                total_extracted += 1;

                let mut savepoint = tx.begin().await.map_err(|e| {
                    ScrapeError::Database(format!("failed to open savepoint: {e}"))
                })?;

                match self.articles.insert_if_new(&mut savepoint, Some(job_id), article).await {
                    Ok(Some(saved)) => {
                        savepoint.commit().await.map_err(|e| {
                            ScrapeError::Database(format!("failed to release savepoint: {e}"))
                        })?;
                        metrics.saved += 1;
                        total_saved += 1;
                        let attribution = SourceAttribution {
                            source_name: source_name.clone(),
                            source_id: article.source_id,
                            source_url: article.source_url.clone(),
                            source_url_domain: domain_of(&article.source_url),
                        };
                        self.logger
                            .log(
                                job_id,
                                Some(article.source_id),
                                LogLevel::Info,
                                format!("persisted {}", article.source_url),
                                EventData::Persistence(PersistenceEvent::ArticleInsertSuccess {
                                    article_tracking_id: saved.article_id.to_string(),
                                    source_attribution: attribution,
                                    database_article_id: saved.article_id,
                                }),
                            )
                            .await
                            .ok();
                    }
                    Ok(None) => {
                        savepoint.commit().await.map_err(|e| {
                            ScrapeError::Database(format!("failed to release savepoint: {e}"))
                        })?;
                        metrics.duplicates += 1;
                    }
                    Err(e) => {
                        savepoint.rollback().await.ok();
                        metrics.failures += 1;
                        let attribution = SourceAttribution {
                            source_name: source_name.clone(),
                            source_id: article.source_id,
                            source_url: article.source_url.clone(),
                            source_url_domain: domain_of(&article.source_url),
                        };
                        self.logger
                            .log(
                                job_id,
                                Some(article.source_id),
                                LogLevel::Error,
                                format!("failed to persist {}", article.source_url),
                                EventData::Persistence(PersistenceEvent::ArticleInsertFailure {
                                    article_tracking_id: article.content_hash.clone(),
                                    source_attribution: attribution,
                                    error: e.to_string(),
                                }),
                            )
                            .await
                            .ok();
                    }
                }
            }

            metrics.success = metrics.saved > 0;
            self.logger
                .log(
                    job_id,
                    None,
                    LogLevel::Info,
                    format!("source {source_name} persistence complete"),
                    EventData::Persistence(PersistenceEvent::SourcePersistenceCompleted {
                        saved: metrics.saved,
                        duplicates: metrics.duplicates,
                        failures: metrics.failures,
                        success: metrics.success,
                    }),
                )
                .await
                .ok();

            per_source.insert(source_name, metrics);
        }

        let total_errors = total_extracted.saturating_sub(total_saved);
        let final_status = compute_final_status(total_saved, target, cancelled);

        sqlx::query(
            "UPDATE scraping_jobs
             SET status = $2, total_articles_scraped = $3, total_errors = $4, completed_at = $5
             WHERE job_id = $1",
        )
        .bind(job_id)
        .bind(final_status.to_string())
        .bind(total_saved as i32)
        .bind(total_errors as i32)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| ScrapeError::Database(format!("failed to finalize job: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| ScrapeError::Database(format!("failed to commit transaction: {e}")))?;

        Ok(PersistOutcome { per_source, total_saved, total_errors, final_status })
    }
}

fn domain_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

/// `saved ≥ target` is successful, `0 < saved < target` is partial, `saved
/// == 0` is failed; `cancelled` overrides all of that.
fn compute_final_status(saved: u32, target: u32, cancelled: bool) -> JobStatus {
    if cancelled {
        JobStatus::Cancelled
    } else if saved >= target {
        JobStatus::Successful
    } else if saved > 0 {
        JobStatus::Partial
    } else {
        JobStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_successful_when_saved_meets_target() {
        assert_eq!(compute_final_status(3, 3, false), JobStatus::Successful);
        assert_eq!(compute_final_status(5, 3, false), JobStatus::Successful);
    }

    #[test]
    fn status_partial_when_some_saved_below_target() {
        assert_eq!(compute_final_status(2, 5, false), JobStatus::Partial);
    }

    #[test]
    fn status_failed_when_nothing_saved() {
        assert_eq!(compute_final_status(0, 5, false), JobStatus::Failed);
    }

    #[test]
    fn status_zero_target_with_nothing_saved_is_successful() {
        assert_eq!(compute_final_status(0, 0, false), JobStatus::Successful);
    }

    #[test]
    fn cancellation_overrides_any_computed_status() {
        assert_eq!(compute_final_status(5, 3, true), JobStatus::Cancelled);
        assert_eq!(compute_final_status(0, 5, true), JobStatus::Cancelled);
    }
}
