//! Content fingerprint used to deduplicate articles across sources and runs.

use sha2::{Digest, Sha256};

const CONTENT_PREFIX_LEN: usize = 2000;

/// `sha256(lower(trim(title)) + ":" + lower(trim(content))[..2000])`, hex-encoded.
///
/// Truncation is applied to the lowercased content by byte length with the
/// slice boundary pulled back to the nearest char boundary, so multi-byte
/// text never panics on a split.
pub fn content_hash(title: &str, content: &str) -> String {
    let norm_title = title.trim().to_lowercase();
    let norm_content = content.trim().to_lowercase();
    let truncated = truncate_at_char_boundary(&norm_content, CONTENT_PREFIX_LEN);

    let mut hasher = Sha256::new();
    hasher.update(norm_title.as_bytes());
    hasher.update(b":");
    hasher.update(truncated.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn truncate_at_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_case_and_whitespace_insensitive() {
        let a = content_hash("  My Title  ", "Some Body Text");
        let b = content_hash("my title", "some body text");
        assert_eq!(a, b);
    }

    #[test]
    fn differs_on_content_change() {
        let a = content_hash("Title", "Body one");
        let b = content_hash("Title", "Body two");
        assert_ne!(a, b);
    }

    #[test]
    fn truncates_content_past_prefix_length() {
        let long_a = "x".repeat(3000);
        let long_b = format!("{}{}", "x".repeat(2000), "y".repeat(1000));
        assert_eq!(content_hash("t", &long_a), content_hash("t", &long_b));
    }

    #[test]
    fn truncation_does_not_panic_on_multibyte_boundary() {
        let content = "a".repeat(1999) + "\u{1F600}\u{1F600}";
        let _ = content_hash("t", &content);
    }
}
