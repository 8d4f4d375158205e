use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Index request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Index API error ({status}): {body}")]
    Index { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<serde_json::Error> for MemoryError {
    fn from(err: serde_json::Error) -> Self {
        MemoryError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MemoryError>;
