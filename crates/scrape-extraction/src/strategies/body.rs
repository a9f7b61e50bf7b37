//! Body-text last resort: whatever paragraph-shaped text exists anywhere in
//! `<body>`, or the fully flattened body text if there are no usable
//! paragraphs at all. This strategy always returns *something*; it is the
//! cascade's floor, not a "best effort" that can come back empty.

use scraper::{Html, Selector};

use super::StrategyOutput;
use crate::paragraphs::{extract_paragraphs, flatten_text};
use crate::trace::ExtractionTrace;

/// Flattened body text has no paragraph structure to bound it naturally, so
/// it's capped here; other strategies don't need this.
const MAX_FLATTENED_LEN: usize = 5_000;

pub fn extract(document: &Html) -> StrategyOutput {
    let mut out = StrategyOutput::default();

    if let Ok(selector) = Selector::parse("title") {
        if let Some(el) = document.select(&selector).next() {
            let text = el.text().collect::<Vec<_>>().join(" ");
            let trimmed = text.trim().to_string();
            if !trimmed.is_empty() {
                out.title = Some(trimmed.clone());
                out.traces
                    .push(ExtractionTrace::new("title", "title", "body-text", &trimmed));
            }
        }
    }

    let Ok(body_selector) = Selector::parse("body") else {
        return out;
    };
    let Some(body) = document.select(&body_selector).next() else {
        return out;
    };

    if let Some(paragraphs) = extract_paragraphs(body) {
        out.traces.push(ExtractionTrace::new(
            "content",
            "body p",
            "body-text",
            &paragraphs,
        ));
        out.content = Some(paragraphs);
    } else {
        let flattened: String = flatten_text(body).chars().take(MAX_FLATTENED_LEN).collect();
        out.traces.push(ExtractionTrace::new(
            "content",
            "body",
            "body-text",
            &flattened,
        ));
        out.content = Some(flattened);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_flattened_text_without_paragraphs() {
        let html = "<html><head><title>T</title></head><body><div>Loose text with no paragraph tags at all wrapping it here.</div></body></html>";
        let doc = Html::parse_document(html);
        let out = extract(&doc);
        assert!(out.content.unwrap().contains("Loose text"));
    }

    #[test]
    fn prefers_paragraph_text_when_present() {
        let html = "<html><body><p>A real paragraph with enough characters to survive the length filter rules.</p></body></html>";
        let doc = Html::parse_document(html);
        let out = extract(&doc);
        assert!(out.content.unwrap().contains("real paragraph"));
    }

    #[test]
    fn caps_flattened_text_at_five_thousand_chars() {
        let html = format!(
            "<html><body><div>{}</div></body></html>",
            "word ".repeat(2000)
        );
        let doc = Html::parse_document(&html);
        let out = extract(&doc);
        assert!(out.content.unwrap().chars().count() <= MAX_FLATTENED_LEN);
    }
}
