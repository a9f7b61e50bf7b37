//! Post-job verification: the persister logs an `ArticleInsertSuccess`
//! event for every row it claims to have saved. This reconciles those
//! claims against what the `scraped_content` table actually holds, so a
//! silent write failure (a log emitted but the transaction later rolled
//! back, say) doesn't go unnoticed.

use std::collections::HashMap;

use uuid::Uuid;

use scrape_events::StructuredLogger;
use scrape_persistence::{ArticleRepository, LogRepository};
use scrape_types::{
    EventData, LogLevel, PersistenceEvent, Result, SourceVerification, VerificationEvent,
};

const SAMPLE_LIMIT: i64 = 3;

pub struct Verifier {
    logs: LogRepository,
    articles: ArticleRepository,
    logger: StructuredLogger,
}

impl Verifier {
    pub fn new(logs: LogRepository, articles: ArticleRepository, logger: StructuredLogger) -> Self {
        Self { logs, articles, logger }
    }

    pub async fn verify(&self, job_id: Uuid) -> Result<Vec<SourceVerification>> {
        let events = self.logs.list_by_job(job_id).await?;

        let mut claimed: HashMap<Uuid, (String, u32)> = HashMap::new();
        for event in &events {
            if let EventData::Persistence(PersistenceEvent::ArticleInsertSuccess {
                source_attribution,
                ..
            }) = &event.additional_data
            {
                let entry = claimed
                    .entry(source_attribution.source_id)
                    .or_insert_with(|| (source_attribution.source_name.clone(), 0));
                entry.1 += 1;
            }
        }

        let mut results = Vec::new();
        let mut total_claimed = 0u32;
        let mut total_actual = 0u32;

        for (source_id, (source_name, claimed_count)) in claimed {
            let actual = self.articles.count_for_source(job_id, source_id).await?;
            total_claimed += claimed_count;
            total_actual += actual;

            let discrepancy = actual as i64 - claimed_count as i64;
            let sample_article_ids = if discrepancy != 0 {
                self.articles.sample_ids(job_id, source_id, SAMPLE_LIMIT).await?
            } else {
                Vec::new()
            };

            results.push(SourceVerification {
                source_name,
                claimed: claimed_count,
                actual,
                discrepancy,
                sample_article_ids,
            });
        }

        let has_discrepancies = results.iter().any(|r| r.discrepancy != 0);
        let level = if has_discrepancies { LogLevel::Warning } else { LogLevel::Info };

        self.logger
            .log(
                job_id,
                None,
                level,
                "database verification complete",
                EventData::Verification(VerificationEvent::DatabaseVerificationCompleted {
                    verification_results: results.clone(),
                    total_claimed,
                    total_actual,
                    has_discrepancies,
                }),
            )
            .await
            .ok();

        Ok(results)
    }
}
