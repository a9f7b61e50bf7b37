//! JSON-LD structured data: the most reliable signal when a publisher ships
//! it, since the values come straight from their CMS rather than a guess
//! about DOM shape.

use scraper::{Html, Selector};
use serde_json::Value;

use super::StrategyOutput;
use crate::trace::ExtractionTrace;

const CONTENT_TYPES: &[&str] = &["NewsArticle", "Article", "BlogPosting"];

pub fn extract(document: &Html) -> StrategyOutput {
    let selector = match Selector::parse(r#"script[type="application/ld+json"]"#) {
        Ok(s) => s,
        Err(_) => return StrategyOutput::default(),
    };

    let mut out = StrategyOutput::default();
    for script in document.select(&selector) {
        let raw = script.text().collect::<String>();
        let Ok(value) = serde_json::from_str::<Value>(&raw) else {
            continue;
        };
        apply(&value, &mut out);
        if out.title.is_some() && out.content.is_some() {
            break;
        }
    }
    out
}

fn apply(value: &Value, out: &mut StrategyOutput) {
    if let Some(graph) = value.get("@graph").and_then(Value::as_array) {
        for item in graph {
            apply(item, out);
        }
        return;
    }

    let items: Vec<&Value> = if let Some(arr) = value.as_array() {
        arr.iter().collect()
    } else {
        vec![value]
    };

    for item in items {
        let Some(obj) = item.as_object() else {
            continue;
        };
        let schema_type = obj.get("@type").and_then(Value::as_str);
        let is_content_type = schema_type.map(|t| CONTENT_TYPES.contains(&t)).unwrap_or(false);

        if out.title.is_none() {
            if let Some(headline) = obj.get("headline").and_then(Value::as_str) {
                record_title(out, headline, "headline");
            } else if is_content_type {
                if let Some(name) = obj.get("name").and_then(Value::as_str) {
                    record_title(out, name, "name");
                }
            }
        }

        if out.content.is_none() {
            if let Some(body) = obj.get("articleBody").and_then(Value::as_str) {
                record_content(out, body, "articleBody");
            }
        }

        if out.author.is_none() {
            if let Some(author_value) = obj.get("author") {
                let name = extract_author(author_value);
                if !name.is_empty() {
                    out.author = Some(name.clone());
                    out.traces.push(ExtractionTrace::new(
                        "author",
                        "ld+json author",
                        "json-ld",
                        &name,
                    ));
                }
            }
        }

        if out.publication_date.is_none() {
            if let Some(date) = obj.get("datePublished").and_then(Value::as_str) {
                out.publication_date = Some(date.to_string());
                out.traces.push(ExtractionTrace::new(
                    "publication_date",
                    "ld+json datePublished",
                    "json-ld",
                    date,
                ));
            }
        }
    }
}

fn record_title(out: &mut StrategyOutput, value: &str, selector: &str) {
    out.title = Some(value.trim().to_string());
    out.traces
        .push(ExtractionTrace::new("title", selector, "json-ld", value));
}

fn record_content(out: &mut StrategyOutput, value: &str, selector: &str) {
    out.content = Some(value.trim().to_string());
    out.traces
        .push(ExtractionTrace::new("content", selector, "json-ld", value));
}

fn extract_author(value: &Value) -> String {
    if let Some(s) = value.as_str() {
        return s.to_string();
    }
    if let Some(obj) = value.as_object() {
        if let Some(name) = obj.get("name").and_then(Value::as_str) {
            return name.to_string();
        }
    }
    if let Some(arr) = value.as_array() {
        if let Some(first) = arr.first() {
            return extract_author(first);
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_news_article_fields() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@type":"NewsArticle","headline":"Storm Hits Coast",
             "articleBody":"A long storm description that easily clears the minimum content length threshold for acceptance by the cascade.",
             "author":{"name":"Jane Reporter"},"datePublished":"2026-01-05T10:00:00Z"}
        </script></head><body></body></html>"#;
        let doc = Html::parse_document(html);
        let out = extract(&doc);
        assert_eq!(out.title.as_deref(), Some("Storm Hits Coast"));
        assert_eq!(out.author.as_deref(), Some("Jane Reporter"));
        assert!(out.content.unwrap().len() > 100);
    }

    #[test]
    fn handles_graph_wrapper() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@graph":[{"@type":"Organization","name":"Acme News"},
                       {"@type":"Article","headline":"Graph Wrapped Headline",
                        "articleBody":"Body text nested inside an at-graph array that should still be discovered by the recursive walk."}]}
        </script></head><body></body></html>"#;
        let doc = Html::parse_document(html);
        let out = extract(&doc);
        assert_eq!(out.title.as_deref(), Some("Graph Wrapped Headline"));
    }

    #[test]
    fn ignores_organization_name_for_title() {
        let html = r#"<html><head><script type="application/ld+json">
            {"@type":"Organization","name":"Acme News"}
        </script></head><body></body></html>"#;
        let doc = Html::parse_document(html);
        let out = extract(&doc);
        assert!(out.title.is_none());
    }
}
