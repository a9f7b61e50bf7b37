//! Selector-based extraction: the common CMS article container shapes,
//! tried in order of specificity.

use scraper::{ElementRef, Html, Selector};

use super::StrategyOutput;
use crate::paragraphs::{extract_paragraphs, flatten_text};
use crate::trace::ExtractionTrace;

const TITLE_SELECTORS: &[&str] = &["h1.article-title", "h1.entry-title", "article h1", "h1"];

const CONTENT_SELECTORS: &[&str] = &[
    "article .article-content",
    "article .entry-content",
    ".post-content",
    ".article-body",
    "[role='article']",
    "article",
    "main article",
];

const AUTHOR_SELECTORS: &[&str] = &[
    "[rel='author']",
    ".author-name",
    ".byline .author",
    ".byline",
];

const DATE_SELECTORS: &[&str] = &["time[datetime]", ".published-date", ".post-date"];

pub fn extract(document: &Html) -> StrategyOutput {
    let mut out = StrategyOutput::default();

    for sel_str in TITLE_SELECTORS {
        if let Some(text) = select_text(document, sel_str) {
            out.title = Some(text.clone());
            out.traces
                .push(ExtractionTrace::new("title", sel_str, "selectors", &text));
            break;
        }
    }

    for sel_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(sel_str) else {
            continue;
        };
        let Some(el) = document.select(&selector).next() else {
            continue;
        };
        let body = extract_paragraphs(el).unwrap_or_else(|| flatten_text(el));
        if body.len() >= super::MIN_CONTENT_LEN {
            out.traces
                .push(ExtractionTrace::new("content", sel_str, "selectors", &body));
            out.content = Some(body);
            break;
        }
    }

    for sel_str in AUTHOR_SELECTORS {
        if let Some(text) = select_text(document, sel_str) {
            out.traces
                .push(ExtractionTrace::new("author", sel_str, "selectors", &text));
            out.author = Some(text);
            break;
        }
    }

    for sel_str in DATE_SELECTORS {
        let Ok(selector) = Selector::parse(sel_str) else {
            continue;
        };
        let Some(el) = document.select(&selector).next() else {
            continue;
        };
        let value = el
            .value()
            .attr("datetime")
            .map(str::to_string)
            .or_else(|| Some(el.text().collect::<Vec<_>>().join(" ")))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if let Some(value) = value {
            out.traces
                .push(ExtractionTrace::new("publication_date", sel_str, "selectors", &value));
            out.publication_date = Some(value);
            break;
        }
    }

    out
}

fn select_text(document: &Html, sel_str: &str) -> Option<String> {
    let selector = Selector::parse(sel_str).ok()?;
    let el: ElementRef<'_> = document.select(&selector).next()?;
    let text = el.text().collect::<Vec<_>>().join(" ");
    let trimmed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_article_content_with_paragraphs() {
        let html = "<html><body><article><h1>Headline Text</h1>\
            <p>First paragraph of the article body long enough to clear filtering rules.</p>\
            <p>Second paragraph continues the story with more than thirty characters here.</p>\
            </article></body></html>";
        let doc = Html::parse_document(html);
        let out = extract(&doc);
        assert_eq!(out.title.as_deref(), Some("Headline Text"));
        assert!(out.content.unwrap().contains("\n\n\n"));
    }

    #[test]
    fn picks_up_byline_and_datetime() {
        let html = "<html><body><article><h1>T</h1>\
            <p class=\"byline\">By Jane Reporter</p>\
            <time datetime=\"2026-02-01T00:00:00Z\">Feb 1</time>\
            <p>Body paragraph that is definitely long enough to be accepted by the filter.</p>\
            </article></body></html>";
        let doc = Html::parse_document(html);
        let out = extract(&doc);
        assert_eq!(out.publication_date.as_deref(), Some("2026-02-01T00:00:00Z"));
        assert!(out.author.unwrap().contains("Jane Reporter"));
    }
}
