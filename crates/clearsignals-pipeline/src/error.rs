use thiserror::Error;

pub const EXCERPT_CHARS: usize = 200;
pub const BODY_EXCERPT_CHARS: usize = 300;

/// First `max` characters of `text`, cut on a char boundary
pub fn excerpt(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

/// Model output that no recovery tier could turn into a JSON object
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not recover JSON from model output: {reason} (starts with: {excerpt:?})")]
pub struct ParseError {
    pub reason: String,
    pub excerpt: String,
}

impl ParseError {
    pub(crate) fn new(reason: impl Into<String>, text: &str) -> Self {
        Self {
            reason: reason.into(),
            excerpt: excerpt(text, EXCERPT_CHARS),
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelInvocationError {
    #[error("model request failed: {0}")]
    Request(String),

    #[error("model API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model returned an empty completion")]
    EmptyCompletion,

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Model(#[from] ModelInvocationError),

    #[error("{stage} output did not match the expected shape: {message}")]
    Schema { stage: &'static str, message: String },

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl PipelineError {
    pub(crate) fn schema(stage: &'static str, err: serde_json::Error) -> Self {
        PipelineError::Schema {
            stage,
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
