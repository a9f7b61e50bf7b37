//! HTML-to-article extraction: a strategy cascade (JSON-LD, CSS selectors,
//! meta tags, raw body text) that hands back the first candidate whose
//! content clears a minimum length, plus the language, content hash, and
//! quality score needed to persist and log the result.

pub mod error;
pub mod extractor;
pub mod hash;
pub mod language;
pub mod paragraphs;
pub mod quality;
pub mod strategies;
pub mod trace;

pub use error::{ExtractionError, Result};
pub use extractor::{extract, ExtractionResult};
pub use hash::content_hash;
pub use language::LanguageDetector;
pub use quality::QualityAssessor;
pub use trace::ExtractionTrace;
