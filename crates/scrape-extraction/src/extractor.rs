//! Orchestrates the strategy cascade into a validated [`ExtractedArticle`].

use chrono::{DateTime, Utc};
use scraper::Html;
use uuid::Uuid;

use scrape_types::ExtractedArticle;

use crate::error::{ExtractionError, Result};
use crate::hash::content_hash;
use crate::language::LanguageDetector;
use crate::quality::QualityAssessor;
use crate::strategies::{run_cascade, MIN_CONTENT_LEN};
use crate::trace::ExtractionTrace;

const MIN_TITLE_LEN: usize = 5;

/// Everything a caller needs to both persist an article and log how it was
/// produced: the article itself, which strategy won, a quality score for
/// the `extraction_completed` event, and the field-level traces.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub article: ExtractedArticle,
    pub method: &'static str,
    pub quality_score: u32,
    pub content_length: usize,
    pub traces: Vec<ExtractionTrace>,
}

/// Parse `html`, run the strategy cascade, validate, and build the final
/// [`ExtractedArticle`]. `source_url` and `source_id` are supplied by the
/// caller since they come from the crawl context, not the page itself.
pub fn extract(html: &str, source_url: &str, source_id: Uuid) -> Result<ExtractionResult> {
    let document = Html::parse_document(html);
    let (method, output) = run_cascade(&document);

    let content = output.content.clone().unwrap_or_default();
    if content.len() < MIN_CONTENT_LEN {
        return Err(ExtractionError::ContentTooShort {
            min_len: MIN_CONTENT_LEN,
        });
    }

    let title = output
        .title
        .clone()
        .map(|t| t.trim().to_string())
        .unwrap_or_default();
    if title.len() < MIN_TITLE_LEN {
        return Err(ExtractionError::TitleTooShort(title));
    }

    let language = LanguageDetector::detect(&content);
    let hash = content_hash(&title, &content);
    let publication_date = output
        .publication_date
        .as_deref()
        .and_then(parse_flexible_date);
    let quality_score = QualityAssessor::calculate(&output.title, &content);

    let article = ExtractedArticle {
        title,
        content: content.clone(),
        author: output.author.clone(),
        publication_date,
        source_url: source_url.to_string(),
        source_id,
        language,
        content_hash: hash,
    };

    Ok(ExtractionResult {
        article,
        method,
        quality_score,
        content_length: content.len(),
        traces: output.traces,
    })
}

fn parse_flexible_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_id() -> Uuid {
        Uuid::nil()
    }

    #[test]
    fn extracts_valid_article_via_json_ld() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@type":"NewsArticle","headline":"A Valid Headline",
             "articleBody":"This article body is long enough to clear the minimum content length threshold required by the cascade logic.",
             "datePublished":"2026-03-01T12:00:00Z"}
        </script></head><body></body></html>"#;
        let result = extract(html, "https://example.com/a", source_id()).unwrap();
        assert_eq!(result.method, "json-ld");
        assert_eq!(result.article.title, "A Valid Headline");
        assert!(result.article.publication_date.is_some());
        assert_eq!(result.article.content_hash.len(), 64);
    }

    #[test]
    fn rejects_content_below_minimum_length() {
        let html = "<html><body><p>Too short body.</p></body></html>";
        let err = extract(html, "https://example.com/b", source_id()).unwrap_err();
        assert!(matches!(err, ExtractionError::ContentTooShort { .. }));
    }

    #[test]
    fn rejects_title_below_minimum_length() {
        let html = "<html><head><title>Hi</title></head><body>\
            <p>A body paragraph that is long enough on its own to pass the content length filter easily.</p>\
            </body></html>";
        let err = extract(html, "https://example.com/c", source_id()).unwrap_err();
        assert!(matches!(err, ExtractionError::TitleTooShort(_)));
    }

    #[test]
    fn falls_back_through_cascade_to_selectors() {
        let html = "<html><body><article><h1>Fallback Headline</h1>\
            <p>Selector-extracted paragraph content that clears both the title and content length minimums.</p>\
            </article></body></html>";
        let result = extract(html, "https://example.com/d", source_id()).unwrap();
        assert_eq!(result.method, "selectors");
    }
}
