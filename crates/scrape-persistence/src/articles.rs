//! `scraped_content` table: deduplicated, persisted articles.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use scrape_types::{ExtractedArticle, ProcessingStatus, Result, ScrapeError, ScrapedArticle};

#[derive(sqlx::FromRow)]
struct ArticleRow {
    article_id: Uuid,
    source_id: Uuid,
    job_id: Option<Uuid>,
    source_url: String,
    title: String,
    content: String,
    author: Option<String>,
    publication_date: Option<DateTime<Utc>>,
    language: String,
    content_hash: String,
    created_at: DateTime<Utc>,
}

impl From<ArticleRow> for ScrapedArticle {
    fn from(row: ArticleRow) -> Self {
        ScrapedArticle {
            article_id: row.article_id,
            source_id: row.source_id,
            job_id: row.job_id,
            source_url: row.source_url,
            title: row.title,
            content: row.content,
            author: row.author,
            publication_date: row.publication_date,
            language: row.language,
            content_hash: row.content_hash,
            processing_status: ProcessingStatus::Completed,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct ArticleRepository {
    pool: PgPool,
}

impl ArticleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one extracted article inside the caller's transaction.
    /// `source_url` and `content_hash` are both unique; a row matching
    /// either means another run already has this article, so the insert
    /// is skipped and `Ok(None)` returned rather than treated as an error.
    #[instrument(skip(self, tx, article))]
    pub async fn insert_if_new(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job_id: Option<Uuid>,
        article: &ExtractedArticle,
    ) -> Result<Option<ScrapedArticle>> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM scraped_content WHERE source_url = $1 OR content_hash = $2)",
        )
        .bind(&article.source_url)
        .bind(&article.content_hash)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| ScrapeError::Database(format!("failed to check for duplicate article: {e}")))?;

        if exists {
            debug!(source_url = %article.source_url, "duplicate article skipped");
            return Ok(None);
        }

        let article_id = Uuid::new_v4();
        let created_at = Utc::now();

        let result: std::result::Result<ArticleRow, sqlx::Error> = sqlx::query_as(
            "INSERT INTO scraped_content
                (article_id, source_id, job_id, source_url, title, content, author,
                 publication_date, language, content_hash, processing_status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'completed', $11)
             RETURNING article_id, source_id, job_id, source_url, title, content, author,
                       publication_date, language, content_hash, created_at",
        )
        .bind(article_id)
        .bind(article.source_id)
        .bind(job_id)
        .bind(&article.source_url)
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.author)
        .bind(article.publication_date)
        .bind(&article.language)
        .bind(&article.content_hash)
        .bind(created_at)
        .fetch_one(&mut **tx)
        .await;

        match result {
            Ok(row) => Ok(Some(ScrapedArticle::from(row))),
            // A concurrent job can still win the race between the check above
            // and this insert; treat the resulting unique violation as the
            // duplicate it is rather than a save failure.
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
                debug!(source_url = %article.source_url, "duplicate article skipped (race)");
                Ok(None)
            }
            Err(e) => Err(ScrapeError::Database(format!("failed to insert article: {e}"))),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_by_job(&self, job_id: Uuid) -> Result<Vec<ScrapedArticle>> {
        let rows: Vec<ArticleRow> = sqlx::query_as(
            "SELECT article_id, source_id, job_id, source_url, title, content, author,
                    publication_date, language, content_hash, created_at
             FROM scraped_content WHERE job_id = $1 ORDER BY created_at",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ScrapeError::Database(format!("failed to list articles: {e}")))?;

        Ok(rows.into_iter().map(ScrapedArticle::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<ScrapedArticle>> {
        let rows: Vec<ArticleRow> = sqlx::query_as(
            "SELECT article_id, source_id, job_id, source_url, title, content, author,
                    publication_date, language, content_hash, created_at
             FROM scraped_content ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ScrapeError::Database(format!("failed to list articles: {e}")))?;

        Ok(rows.into_iter().map(ScrapedArticle::from).collect())
    }

    /// Actual row count for one source within a job, used by the
    /// verification pass to check claimed-vs-persisted article counts.
    #[instrument(skip(self))]
    pub async fn count_for_source(&self, job_id: Uuid, source_id: Uuid) -> Result<u32> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM scraped_content WHERE job_id = $1 AND source_id = $2",
        )
        .bind(job_id)
        .bind(source_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ScrapeError::Database(format!("failed to count articles: {e}")))?;
        Ok(count as u32)
    }

    /// Pre-filter check: has this URL already been saved by any job? Used
    /// to avoid spending a page fetch on a candidate that would just be
    /// rejected by the `source_url` conflict at insert time.
    #[instrument(skip(self))]
    pub async fn exists_by_source_url(&self, source_url: &str) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM scraped_content WHERE source_url = $1)",
        )
        .bind(source_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ScrapeError::Database(format!("failed to check article existence: {e}")))?;
        Ok(exists)
    }

    /// A small sample of article ids for one source/job, attached to the
    /// verification event so a human can spot-check a discrepancy.
    #[instrument(skip(self))]
    pub async fn sample_ids(&self, job_id: Uuid, source_id: Uuid, limit: i64) -> Result<Vec<Uuid>> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT article_id FROM scraped_content
             WHERE job_id = $1 AND source_id = $2 ORDER BY created_at LIMIT $3",
        )
        .bind(job_id)
        .bind(source_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ScrapeError::Database(format!("failed to sample article ids: {e}")))?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
