//! Paragraph-preserving body text assembly.
//!
//! `scraper::Html::text()` flattens a subtree into a single run of text,
//! losing the paragraph breaks a reader expects from an article body. This
//! module walks `<p>` elements individually, drops the ones that are really
//! boilerplate (captions, all-caps promo links), dedupes repeats, and joins
//! what is left with a blank line between paragraphs, matching how CMS
//! themes space article body copy.

use scraper::{ElementRef, Html, Selector};

/// Paragraphs are separated by this exact run; downstream consumers split on
/// it to recover paragraph boundaries without re-parsing HTML.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n\n";

const MIN_PARAGRAPH_LEN: usize = 30;
const PROMO_LINK_MIN_LEN: usize = 20;

const SKIP_SELECTORS: &[&str] = &[
    "figcaption",
    "figure",
    ".caption",
    ".video-caption",
    ".featured-video",
    ".video-container",
];

/// Build article body text from the `<p>` descendants of `root`, or `None`
/// if no paragraph survived filtering (callers fall back to flattened text).
pub fn extract_paragraphs(root: ElementRef<'_>) -> Option<String> {
    let p_selector = Selector::parse("p").ok()?;
    let skip_selectors: Vec<Selector> = SKIP_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect();

    let mut seen = std::collections::HashSet::new();
    let mut paragraphs = Vec::new();

    for p in root.select(&p_selector) {
        if is_inside_skipped(p, &skip_selectors) {
            continue;
        }

        let text: String = p.text().collect::<Vec<_>>().join(" ");
        let text = normalize_whitespace(&text);

        if text.is_empty() {
            continue;
        }
        if is_allcaps_promo_link(p, &text) {
            continue;
        }
        if text.len() < MIN_PARAGRAPH_LEN {
            continue;
        }
        if !seen.insert(text.clone()) {
            continue;
        }
        paragraphs.push(text);
    }

    if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join(PARAGRAPH_SEPARATOR))
    }
}

/// Flattened fallback: all text under `root`, collapsed to single spaces.
/// Used only when no `<p>` survives the paragraph pass.
pub fn flatten_text(root: ElementRef<'_>) -> String {
    let text: String = root.text().collect::<Vec<_>>().join(" ");
    normalize_whitespace(&text)
}

fn is_inside_skipped(el: ElementRef<'_>, skip: &[Selector]) -> bool {
    skip.iter().any(|sel| {
        el.ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| sel.matches(&a))
    })
}

/// A paragraph that is entirely an upper-case anchor text longer than the
/// promo threshold is almost always a "READ MORE" / "SIGN UP NOW" link, not
/// body copy.
fn is_allcaps_promo_link(p: ElementRef<'_>, text: &str) -> bool {
    if text.len() <= PROMO_LINK_MIN_LEN {
        return false;
    }
    let has_letters = text.chars().any(|c| c.is_alphabetic());
    let is_allcaps = has_letters && !text.chars().any(|c| c.is_lowercase());
    if !is_allcaps {
        return false;
    }

    let a_selector = Selector::parse("a").expect("static selector");
    let anchor_text_len: usize = p
        .select(&a_selector)
        .flat_map(|a| a.text())
        .map(|t| t.len())
        .sum();
    anchor_text_len >= text.len().saturating_sub(2)
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_body(html: &str) -> Html {
        Html::parse_document(html)
    }

    fn body_root(doc: &Html) -> ElementRef<'_> {
        let sel = Selector::parse("body").unwrap();
        doc.select(&sel).next().unwrap()
    }

    #[test]
    fn joins_paragraphs_with_triple_newline() {
        let html = "<html><body><p>This paragraph is long enough to survive filtering rules easily.</p><p>Second paragraph also clears the minimum length threshold for inclusion.</p></body></html>";
        let doc = parse_body(html);
        let result = extract_paragraphs(body_root(&doc)).unwrap();
        assert!(result.contains(PARAGRAPH_SEPARATOR));
        assert_eq!(result.matches(PARAGRAPH_SEPARATOR).count(), 1);
    }

    #[test]
    fn drops_short_paragraphs() {
        let html = "<html><body><p>Too short.</p></body></html>";
        let doc = parse_body(html);
        assert!(extract_paragraphs(body_root(&doc)).is_none());
    }

    #[test]
    fn skips_figcaption_text() {
        let html = "<html><body><figure><figcaption>A photo caption that is definitely long enough to pass the length filter alone.</figcaption></figure><p>The real article paragraph that should be kept because it reads like actual body copy.</p></body></html>";
        let doc = parse_body(html);
        let result = extract_paragraphs(body_root(&doc)).unwrap();
        assert!(result.contains("real article paragraph"));
        assert!(!result.contains("photo caption"));
    }

    #[test]
    fn skips_allcaps_promo_link_paragraphs() {
        let html = "<html><body><p><a href=\"#\">SUBSCRIBE NOW FOR UNLIMITED ACCESS TODAY</a></p><p>A normal paragraph with mixed case text that should be retained in the output.</p></body></html>";
        let doc = parse_body(html);
        let result = extract_paragraphs(body_root(&doc)).unwrap();
        assert!(!result.contains("SUBSCRIBE"));
        assert!(result.contains("normal paragraph"));
    }

    #[test]
    fn dedupes_exact_repeated_paragraphs() {
        let html = "<html><body><p>This exact sentence repeats twice in the markup for some reason.</p><p>This exact sentence repeats twice in the markup for some reason.</p></body></html>";
        let doc = parse_body(html);
        let result = extract_paragraphs(body_root(&doc)).unwrap();
        assert_eq!(result.matches("exact sentence repeats").count(), 1);
    }
}
