//! The extraction strategy cascade: JSON-LD, then article selectors, then
//! meta tags, then raw body text. Each strategy runs in turn against the
//! same parsed document; the first one whose content clears the minimum
//! length wins. Callers that want to know which strategy fired (for the
//! `extraction_completed` log event's `method` field) get that back
//! alongside the result.

pub mod body;
pub mod json_ld;
pub mod meta;
pub mod selectors;

use scraper::Html;

use crate::trace::ExtractionTrace;

/// Minimum content length for a strategy's output to be accepted.
pub const MIN_CONTENT_LEN: usize = 100;

/// Candidate fields pulled out of the document by one strategy.
#[derive(Debug, Clone, Default)]
pub struct StrategyOutput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub publication_date: Option<String>,
    pub traces: Vec<ExtractionTrace>,
}

impl StrategyOutput {
    pub fn content_len(&self) -> usize {
        self.content.as_deref().map(str::len).unwrap_or(0)
    }
}

/// Name of each strategy, used as the `method` field on extraction events.
pub const STRATEGY_NAMES: &[&str] = &["json-ld", "selectors", "meta-tags", "body-text"];

/// Run the cascade, returning the first strategy's output whose content
/// length reaches [`MIN_CONTENT_LEN`], paired with the strategy name that
/// produced it. Falls back to the last strategy's output (body text) if
/// none clear the threshold, so callers can still report a quality score
/// and a reason for rejection.
pub fn run_cascade(document: &Html) -> (&'static str, StrategyOutput) {
    let candidates: [(&'static str, fn(&Html) -> StrategyOutput); 4] = [
        ("json-ld", json_ld::extract),
        ("selectors", selectors::extract),
        ("meta-tags", meta::extract),
        ("body-text", body::extract),
    ];

    let mut last = ("body-text", StrategyOutput::default());
    for (name, strategy) in candidates {
        let output = strategy(document);
        if output.content_len() >= MIN_CONTENT_LEN {
            return (name, output);
        }
        last = (name, output);
    }
    last
}
