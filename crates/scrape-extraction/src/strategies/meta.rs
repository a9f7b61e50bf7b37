//! Meta-tag fallback: Open Graph and standard `<meta>` fields, used when no
//! JSON-LD is present and the selector pass didn't find a recognizable
//! article container.

use scraper::{Html, Selector};

use super::StrategyOutput;
use crate::trace::ExtractionTrace;

const TITLE_META: &[&str] = &[
    "meta[property='og:title']",
    "meta[name='twitter:title']",
    "title",
];

const CONTENT_META: &[&str] = &[
    "meta[property='og:description']",
    "meta[name='description']",
    "meta[name='twitter:description']",
];

const AUTHOR_META: &[&str] = &["meta[name='author']", "meta[property='article:author']"];

const DATE_META: &[&str] = &[
    "meta[property='article:published_time']",
    "meta[name='date']",
];

pub fn extract(document: &Html) -> StrategyOutput {
    let mut out = StrategyOutput::default();

    for sel_str in TITLE_META {
        if let Some(value) = meta_value(document, sel_str) {
            out.traces
                .push(ExtractionTrace::new("title", sel_str, "meta-tags", &value));
            out.title = Some(value);
            break;
        }
    }

    for sel_str in CONTENT_META {
        if let Some(value) = meta_value(document, sel_str) {
            if value.len() >= super::MIN_CONTENT_LEN {
                out.traces
                    .push(ExtractionTrace::new("content", sel_str, "meta-tags", &value));
                out.content = Some(value);
                break;
            }
        }
    }

    for sel_str in AUTHOR_META {
        if let Some(value) = meta_value(document, sel_str) {
            out.traces
                .push(ExtractionTrace::new("author", sel_str, "meta-tags", &value));
            out.author = Some(value);
            break;
        }
    }

    for sel_str in DATE_META {
        if let Some(value) = meta_value(document, sel_str) {
            out.traces.push(ExtractionTrace::new(
                "publication_date",
                sel_str,
                "meta-tags",
                &value,
            ));
            out.publication_date = Some(value);
            break;
        }
    }

    out
}

fn meta_value(document: &Html, sel_str: &str) -> Option<String> {
    let selector = Selector::parse(sel_str).ok()?;
    let el = document.select(&selector).next()?;
    let value = if sel_str == "title" {
        el.text().collect::<Vec<_>>().join(" ")
    } else {
        el.value().attr("content").unwrap_or_default().to_string()
    };
    let trimmed = value.trim().to_string();
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
    fn falls_back_to_document_title() {
        let html = "<html><head><title>Page Title</title></head><body></body></html>";
        let doc = Html::parse_document(html);
        let out = extract(&doc);
        assert_eq!(out.title.as_deref(), Some("Page Title"));
    }

    #[test]
    fn prefers_og_description_when_long_enough() {
        let long_desc = "D".repeat(150);
        let html = format!(
            "<html><head><meta property=\"og:description\" content=\"{}\"></head><body></body></html>",
            long_desc
        );
        let doc = Html::parse_document(&html);
        let out = extract(&doc);
        assert_eq!(out.content.unwrap().len(), 150);
    }

    #[test]
    fn rejects_short_description() {
        let html = "<html><head><meta property=\"og:description\" content=\"short\"></head><body></body></html>";
        let doc = Html::parse_document(html);
        let out = extract(&doc);
        assert!(out.content.is_none());
    }
}
