//! Optional per-field extraction trace, useful when debugging why a
//! strategy picked the value it did. Traces are appended in the order
//! fields are resolved, not sorted.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionTrace {
    pub field: String,
    pub selector: String,
    pub method: String,
    pub value: String,
}

impl ExtractionTrace {
    pub fn new(field: &str, selector: &str, method: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            selector: selector.to_string(),
            method: method.to_string(),
            value: value.to_string(),
        }
    }
}
