//! `sources` table: the admin-managed catalog of news sources to scrape.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use scrape_types::source::{DEFAULT_DELAY_MS, DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT};
use scrape_types::{NewSource, NewsSource, Result, ScrapeError, SourceUpdate};

#[derive(sqlx::FromRow)]
struct SourceRow {
    source_id: Uuid,
    name: String,
    domain: String,
    rss_url: Option<String>,
    icon_url: Option<String>,
    user_agent: String,
    delay_between_requests_ms: i64,
    timeout_ms: i64,
    respect_robots_txt: bool,
    created_at: DateTime<Utc>,
}

impl From<SourceRow> for NewsSource {
    fn from(row: SourceRow) -> Self {
        NewsSource {
            source_id: row.source_id,
            name: row.name,
            domain: row.domain,
            rss_url: row.rss_url,
            icon_url: row.icon_url,
            user_agent: row.user_agent,
            delay_between_requests_ms: row.delay_between_requests_ms as u64,
            timeout_ms: row.timeout_ms as u64,
            respect_robots_txt: row.respect_robots_txt,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct SourceRepository {
    pool: PgPool,
}

impl SourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn create(&self, new_source: NewSource) -> Result<NewsSource> {
        let source = NewsSource {
            source_id: Uuid::new_v4(),
            name: new_source.name,
            domain: new_source.domain,
            rss_url: new_source.rss_url,
            icon_url: new_source.icon_url,
            user_agent: new_source.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            delay_between_requests_ms: new_source.delay_between_requests_ms.unwrap_or(DEFAULT_DELAY_MS),
            timeout_ms: new_source.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
            respect_robots_txt: new_source.respect_robots_txt.unwrap_or(true),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO sources
                (source_id, name, domain, rss_url, icon_url, user_agent,
                 delay_between_requests_ms, timeout_ms, respect_robots_txt, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(source.source_id)
        .bind(&source.name)
        .bind(&source.domain)
        .bind(&source.rss_url)
        .bind(&source.icon_url)
        .bind(&source.user_agent)
        .bind(source.delay_between_requests_ms as i64)
        .bind(source.timeout_ms as i64)
        .bind(source.respect_robots_txt)
        .bind(source.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ScrapeError::Database(format!("failed to insert source: {e}")))?;

        debug!(source_id = %source.source_id, "source created");
        Ok(source)
    }

    #[instrument(skip(self, update))]
    pub async fn update(&self, source_id: Uuid, update: SourceUpdate) -> Result<NewsSource> {
        let mut existing = self.get_by_id(source_id).await?;

        if let Some(name) = update.name {
            existing.name = name;
        }
        if let Some(domain) = update.domain {
            existing.domain = domain;
        }
        if update.rss_url.is_some() {
            existing.rss_url = update.rss_url;
        }
        if update.icon_url.is_some() {
            existing.icon_url = update.icon_url;
        }
        if let Some(user_agent) = update.user_agent {
            existing.user_agent = user_agent;
        }
        if let Some(delay) = update.delay_between_requests_ms {
            existing.delay_between_requests_ms = delay;
        }
        if let Some(timeout) = update.timeout_ms {
            existing.timeout_ms = timeout;
        }
        if let Some(respect) = update.respect_robots_txt {
            existing.respect_robots_txt = respect;
        }

        sqlx::query(
            "UPDATE sources SET name = $2, domain = $3, rss_url = $4, icon_url = $5,
                user_agent = $6, delay_between_requests_ms = $7, timeout_ms = $8,
                respect_robots_txt = $9
             WHERE source_id = $1",
        )
        .bind(existing.source_id)
        .bind(&existing.name)
        .bind(&existing.domain)
        .bind(&existing.rss_url)
        .bind(&existing.icon_url)
        .bind(&existing.user_agent)
        .bind(existing.delay_between_requests_ms as i64)
        .bind(existing.timeout_ms as i64)
        .bind(existing.respect_robots_txt)
        .execute(&self.pool)
        .await
        .map_err(|e| ScrapeError::Database(format!("failed to update source: {e}")))?;

        Ok(existing)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, source_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM sources WHERE source_id = $1")
            .bind(source_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ScrapeError::Database(format!("failed to delete source: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(ScrapeError::SourceNotFound(source_id.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, source_id: Uuid) -> Result<NewsSource> {
        let row: Option<SourceRow> =
            sqlx::query_as("SELECT * FROM sources WHERE source_id = $1")
                .bind(source_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| ScrapeError::Database(format!("failed to fetch source: {e}")))?;

        row.map(NewsSource::from)
            .ok_or_else(|| ScrapeError::SourceNotFound(source_id.to_string()))
    }

    /// Resolve the names a trigger request asks for. Missing names come
    /// back as an error that names the first one not found, matching how
    /// the job trigger endpoint should fail fast on a typo.
    #[instrument(skip(self, names))]
    pub async fn get_by_names(&self, names: &[String]) -> Result<Vec<NewsSource>> {
        let (found, missing) = self.resolve_names(names).await?;
        if let Some(name) = missing.into_iter().next() {
            return Err(ScrapeError::SourceNotFound(name));
        }
        Ok(found)
    }

    /// Resolve the names a trigger request asks for without failing the
    /// whole batch on a typo: returns the sources that matched alongside
    /// the names that didn't, so a caller can treat each missing name as
    /// its own per-source failure rather than aborting everyone else.
    #[instrument(skip(self, names))]
    pub async fn resolve_names(&self, names: &[String]) -> Result<(Vec<NewsSource>, Vec<String>)> {
        let rows: Vec<SourceRow> =
            sqlx::query_as("SELECT * FROM sources WHERE name = ANY($1)")
                .bind(names)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| ScrapeError::Database(format!("failed to fetch sources: {e}")))?;

        let found: Vec<NewsSource> = rows.into_iter().map(NewsSource::from).collect();
        let missing: Vec<String> = names
            .iter()
            .filter(|name| !found.iter().any(|s| &s.name == *name))
            .cloned()
            .collect();
        Ok((found, missing))
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<NewsSource>> {
        let rows: Vec<SourceRow> = sqlx::query_as("SELECT * FROM sources ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ScrapeError::Database(format!("failed to list sources: {e}")))?;
        Ok(rows.into_iter().map(NewsSource::from).collect())
    }
}
