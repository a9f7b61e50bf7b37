use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractionError>;

#[derive(Error, Debug, Clone)]
pub enum ExtractionError {
    #[error("no strategy produced content of at least {min_len} characters")]
    ContentTooShort { min_len: usize },

    #[error("extracted title '{0}' is too short to be usable")]
    TitleTooShort(String),

    #[error("document has no discoverable title or content")]
    Empty,

    #[error("malformed HTML input: {0}")]
    Malformed(String),
}
