//! Per-source extraction: fetch a source's RSS feed, pre-filter candidates
//! against what's already persisted, fetch and extract pages concurrently,
//! and hand back the articles ready for the transactional persister.
//!
//! Nothing here writes to the database. Keeping the extraction phase
//! entirely in memory means a mid-run failure never leaves partial rows
//! behind; the persister is the only writer, and it runs after this phase
//! is completely done.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use scraper::{Html, Selector};
use uuid::Uuid;

use scrape_events::StructuredLogger;
use scrape_extraction::{content_hash, ExtractionResult, LanguageDetector};
use scrape_fetch::{BackoffPolicy, FetchClient};
use scrape_types::{
    EventData, ExtractedArticle, HttpEvent, LogLevel, NewsSource, SourceEvent, TraceEntry,
};

use crate::cancellation::CancellationToken;

/// Scan at most this many feed items even if more pass the pre-filter check.
const MAX_CANDIDATES_SCANNED: usize = 50;
/// Pre-filter examines up to `articles_per_source * CANDIDATE_SCAN_MULTIPLIER` items.
const CANDIDATE_SCAN_MULTIPLIER: usize = 3;
/// Target non-duplicate candidates to gather before fetching pages.
const CANDIDATE_TARGET_MULTIPLIER: usize = 2;
/// Max concurrent page fetches per source.
const PAGE_FETCH_CONCURRENCY: usize = 4;
/// Per-page extraction handler timeout.
const PAGE_HANDLER_TIMEOUT: Duration = Duration::from_secs(60);

/// A fallback candidate must clear this many characters to be worth
/// treating as a recovered article; shorter than the cascade's floor
/// because these pages are already known to be non-semantic HTML.
const FALLBACK_MIN_LEN: usize = 200;
/// Raw-body last resort is truncated here rather than left unbounded.
const FALLBACK_BODY_MAX_LEN: usize = 10_000;
const MIN_TITLE_LEN: usize = 5;
const MIN_CONTENT_LEN: usize = 100;

pub struct SourceRunOutcome {
    pub source_name: String,
    pub articles: Vec<ExtractedArticle>,
    pub candidates_processed: u32,
    pub extracted: u32,
    pub failed: bool,
}

pub struct SourceExtractor {
    fetch: Arc<FetchClient>,
    logger: StructuredLogger,
}

impl SourceExtractor {
    pub fn new(fetch: Arc<FetchClient>, logger: StructuredLogger) -> Self {
        Self { fetch, logger }
    }

    /// `already_persisted` checks whether a candidate URL has already been
    /// saved (by any prior job), so the pre-filter can skip it before
    /// spending a page fetch on it.
    pub async fn run<F, Fut>(
        &self,
        job_id: Uuid,
        source: &NewsSource,
        articles_per_source: u32,
        enable_tracking: bool,
        token: &CancellationToken,
        already_persisted: F,
    ) -> SourceRunOutcome
    where
        F: Fn(String) -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        let start = Instant::now();

        self.logger
            .log(
                job_id,
                Some(source.source_id),
                LogLevel::Info,
                format!("starting source {}", source.name),
                EventData::Source(SourceEvent::SourceStarted {
                    source_name: source.name.clone(),
                    rss_url: source.rss_url.clone().unwrap_or_default(),
                    target_articles: articles_per_source,
                }),
            )
            .await
            .ok();

        let Some(rss_url) = source.usable_rss_url() else {
            self.logger
                .log(
                    job_id,
                    Some(source.source_id),
                    LogLevel::Error,
                    "source has no usable rss_url",
                    EventData::Source(SourceEvent::SourceExtractionFailed {
                        error: "missing rss_url".to_string(),
                    }),
                )
                .await
                .ok();
            return SourceRunOutcome {
                source_name: source.name.clone(),
                articles: Vec::new(),
                candidates_processed: 0,
                extracted: 0,
                failed: true,
            };
        };

        let feed_items = match self.fetch_feed(job_id, source, rss_url).await {
            Ok(items) => items,
            Err(error) => {
                self.logger
                    .log(
                        job_id,
                        Some(source.source_id),
                        LogLevel::Error,
                        "rss fetch exhausted retries",
                        EventData::Source(SourceEvent::SourceExtractionFailed { error }),
                    )
                    .await
                    .ok();
                return SourceRunOutcome {
                    source_name: source.name.clone(),
                    articles: Vec::new(),
                    candidates_processed: 0,
                    extracted: 0,
                    failed: true,
                };
            }
        };

        let target = articles_per_source as usize * CANDIDATE_TARGET_MULTIPLIER;
        let scan_limit = (articles_per_source as usize * CANDIDATE_SCAN_MULTIPLIER)
            .min(MAX_CANDIDATES_SCANNED);

        let mut candidates = Vec::new();
        let mut scanned = 0usize;
        for url in feed_items {
            if scanned >= scan_limit || candidates.len() >= target {
                break;
            }
            scanned += 1;
            if already_persisted(url.clone()).await {
                continue;
            }
            candidates.push(url);
        }

        let mut articles = Vec::new();
        let mut in_flight = FuturesUnordered::new();
        let mut remaining = candidates.into_iter();
        let mut processed = 0u32;

        for _ in 0..PAGE_FETCH_CONCURRENCY {
            if let Some(url) = remaining.next() {
                in_flight.push(self.fetch_and_extract(job_id, source, url, enable_tracking));
            }
        }

        while let Some(result) = in_flight.next().await {
            processed += 1;
            if let Some(article) = result {
                articles.push(article);
            }
            if token.is_cancelled() {
                break;
            }
            if let Some(url) = remaining.next() {
                in_flight.push(self.fetch_and_extract(job_id, source, url, enable_tracking));
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        self.logger
            .log(
                job_id,
                Some(source.source_id),
                LogLevel::Info,
                format!("source {} extraction complete", source.name),
                EventData::Source(SourceEvent::SourceExtractionCompleted {
                    articles_extracted: articles.len() as u32,
                    target_articles: articles_per_source,
                    duration_ms,
                }),
            )
            .await
            .ok();

        SourceRunOutcome {
            source_name: source.name.clone(),
            extracted: articles.len() as u32,
            articles,
            candidates_processed: processed,
            failed: false,
        }
    }

    async fn fetch_feed(
        &self,
        job_id: Uuid,
        source: &NewsSource,
        rss_url: &str,
    ) -> Result<Vec<String>, String> {
        let timeout = Duration::from_millis(source.timeout_ms);
        let fetch = self.fetch.clone();
        let logger = self.logger.clone();
        let source_id = source.source_id;

        let response = fetch
            .get_with_retry(
                rss_url,
                &source.user_agent,
                timeout,
                BackoffPolicy::rss(),
                move |attempt, max_attempts, delay, err| {
                    let logger = logger.clone();
                    let error = err.to_string();
                    tokio::spawn(async move {
                        logger
                            .log(
                                job_id,
                                Some(source_id),
                                LogLevel::Warning,
                                "retrying rss fetch",
                                EventData::Source(SourceEvent::RssFetchRetry {
                                    attempt,
                                    max_attempts,
                                    retry_delay_ms: delay.as_millis() as u64,
                                    error,
                                }),
                            )
                            .await
                            .ok();
                    });
                },
            )
            .await
            .map_err(|e| e.to_string())?;

        let feed = feed_rs::parser::parse(response.body.as_bytes()).map_err(|e| e.to_string())?;
        let total_items = feed.entries.len();
        let urls: Vec<String> = feed
            .entries
            .into_iter()
            .filter_map(|entry| entry.links.first().map(|l| l.href.clone()))
            .collect();

        self.logger
            .log(
                job_id,
                Some(source.source_id),
                LogLevel::Info,
                "rss feed parsed",
                EventData::Source(SourceEvent::RssParsed {
                    feed_title: feed.title.map(|t| t.content),
                    total_items,
                    items_to_process: urls.len(),
                }),
            )
            .await
            .ok();

        Ok(urls)
    }

    async fn fetch_and_extract(
        &self,
        job_id: Uuid,
        source: &NewsSource,
        url: String,
        enable_tracking: bool,
    ) -> Option<ExtractedArticle> {
        let correlation_id = self.logger.new_correlation_id();
        let timeout = Duration::from_millis(source.timeout_ms);

        self.logger
            .log(
                job_id,
                Some(source.source_id),
                LogLevel::Info,
                format!("fetching {url}"),
                EventData::Http(HttpEvent::HttpRequest {
                    url: url.clone(),
                    correlation_id,
                }),
            )
            .await
            .ok();

        let fetch_start = Instant::now();
        let logger = self.logger.clone();
        let source_id = source.source_id;
        let url_for_retry = url.clone();

        let fetch_result = tokio::time::timeout(
            PAGE_HANDLER_TIMEOUT,
            self.fetch.get_with_retry(
                &url,
                &source.user_agent,
                timeout,
                BackoffPolicy::page(),
                move |attempt, _max_attempts, _delay, err| {
                    let logger = logger.clone();
                    let error = err.to_string();
                    let url = url_for_retry.clone();
                    tokio::spawn(async move {
                        logger
                            .log(
                                job_id,
                                Some(source_id),
                                LogLevel::Warning,
                                "retrying page fetch",
                                EventData::Http(HttpEvent::HttpError {
                                    url,
                                    attempt,
                                    error,
                                    correlation_id,
                                }),
                            )
                            .await
                            .ok();
                    });
                },
            ),
        )
        .await;

        let response = match fetch_result {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                self.log_article_dropped(job_id, &url, &e.to_string()).await;
                return None;
            }
            Err(_) => {
                self.log_article_dropped(job_id, &url, "handler timed out").await;
                return None;
            }
        };

        self.logger
            .log(
                job_id,
                Some(source.source_id),
                LogLevel::Info,
                format!("fetched {url}"),
                EventData::Http(HttpEvent::HttpResponse {
                    url: url.clone(),
                    status: response.status,
                    duration_ms: fetch_start.elapsed().as_millis() as u64,
                    correlation_id,
                }),
            )
            .await
            .ok();

        let extraction_start = Instant::now();
        match scrape_extraction::extract(&response.body, &url, source.source_id) {
            Ok(ExtractionResult {
                article,
                method,
                quality_score,
                content_length,
                traces,
            }) => {
                self.logger
                    .log(
                        job_id,
                        Some(source.source_id),
                        LogLevel::Info,
                        format!("extracted {url}"),
                        EventData::Extraction(scrape_types::ExtractionEvent::ExtractionCompleted {
                            url: url.clone(),
                            method: method.to_string(),
                            quality_score,
                            content_length,
                            extraction_ms: extraction_start.elapsed().as_millis() as u64,
                            traces: trace_entries(enable_tracking, &traces),
                        }),
                    )
                    .await
                    .ok();
                Some(article)
            }
            Err(e) => {
                self.logger
                    .log(
                        job_id,
                        Some(source.source_id),
                        LogLevel::Warning,
                        format!("extraction failed for {url}, trying fallbacks"),
                        EventData::Extraction(scrape_types::ExtractionEvent::ExtractionFailed {
                            url: url.clone(),
                            method: "cascade".to_string(),
                            error_message: e.to_string(),
                        }),
                    )
                    .await
                    .ok();

                match extract_fallback(&response.body, &url, source.source_id) {
                    Some((article, method)) => {
                        self.logger
                            .log(
                                job_id,
                                Some(source.source_id),
                                LogLevel::Info,
                                format!("recovered {url} via fallback"),
                                EventData::Extraction(
                                    scrape_types::ExtractionEvent::ExtractionCompleted {
                                        url: url.clone(),
                                        method: method.to_string(),
                                        quality_score: 0,
                                        content_length: article.content.len(),
                                        extraction_ms: extraction_start.elapsed().as_millis() as u64,
                                        traces: Vec::new(),
                                    },
                                ),
                            )
                            .await
                            .ok();
                        Some(article)
                    }
                    None => {
                        self.log_article_dropped(job_id, &url, "extraction and fallbacks failed")
                            .await;
                        None
                    }
                }
            }
        }
    }

    async fn log_article_dropped(&self, job_id: Uuid, url: &str, reason: &str) {
        self.logger
            .log(
                job_id,
                None,
                LogLevel::Warning,
                format!("dropped {url}"),
                EventData::ArticleLifecycle(scrape_types::ArticleLifecycleEvent::ArticleDropped {
                    url: url.to_string(),
                    reason: reason.to_string(),
                }),
            )
            .await
            .ok();
    }
}

fn trace_entries(enable_tracking: bool, traces: &[scrape_extraction::ExtractionTrace]) -> Vec<TraceEntry> {
    if !enable_tracking {
        return Vec::new();
    }
    traces
        .iter()
        .map(|t| TraceEntry {
            field: t.field.clone(),
            selector: t.selector.clone(),
            method: t.method.clone(),
            value: t.value.clone(),
        })
        .collect()
}

/// Non-semantic HTML (a broadcaster page built from generic components
/// rather than `<article>`/`<p>`) fails the main cascade but often still
/// has the article text somewhere in the DOM. Tried in order, the first
/// candidate whose joined text clears `FALLBACK_MIN_LEN` wins:
///
/// 1. component-ish content blocks (`data-component="text-block"` and
///    friends), common on broadcaster sites with no semantic markup
/// 2. `<article>`'s own `<p>` descendants
/// 3. `<main>`'s flattened text
/// 4. raw `<body>` text, truncated
///
/// Returns `None` if nothing clears the floor, or the page has no title
/// long enough to pass the same validation the main cascade applies.
fn extract_fallback(
    html: &str,
    url: &str,
    source_id: Uuid,
) -> Option<(ExtractedArticle, &'static str)> {
    let document = Html::parse_document(html);

    let candidates: &[(&str, &str)] = &[
        (
            "fallback-text-block",
            r#"[data-component="text-block"], [data-testid*="paragraph"], div[class*="Text-sc"]"#,
        ),
        ("fallback-article", "article p"),
        ("fallback-main", "main"),
    ];

    for (method, selector) in candidates {
        if let Some(text) = joined_text(&document, selector) {
            if text.len() >= FALLBACK_MIN_LEN {
                if let Some(article) = build_fallback_article(&document, &text, url, source_id) {
                    return Some((article, method));
                }
            }
        }
    }

    let body_text = joined_text(&document, "body")?;
    let truncated: String = body_text.chars().take(FALLBACK_BODY_MAX_LEN).collect();
    if truncated.len() < FALLBACK_MIN_LEN {
        return None;
    }
    build_fallback_article(&document, &truncated, url, source_id).map(|a| (a, "fallback-body"))
}

fn joined_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let joined = document
        .select(&selector)
        .flat_map(|el| el.text())
        .collect::<Vec<_>>()
        .join(" ");
    let normalized = joined.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

fn build_fallback_article(
    document: &Html,
    content: &str,
    url: &str,
    source_id: Uuid,
) -> Option<ExtractedArticle> {
    if content.len() < MIN_CONTENT_LEN {
        return None;
    }

    let title_selector = Selector::parse("title").ok()?;
    let title = document
        .select(&title_selector)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string())
        .unwrap_or_default();
    if title.len() < MIN_TITLE_LEN {
        return None;
    }

    let language = LanguageDetector::detect(content);
    let hash = content_hash(&title, content);

    Some(ExtractedArticle {
        title,
        content: content.to_string(),
        author: None,
        publication_date: None,
        source_url: url.to_string(),
        source_id,
        language,
        content_hash: hash,
    })
}
