use thiserror::Error;

/// Non-success HTTP status returned by a provider.
///
/// Raised inside `anyhow::Error` so callers can `downcast_ref` and tell an
/// upstream rejection apart from a transport failure.
#[derive(Debug, Clone, Error)]
#[error("API error ({status}): {body}")]
pub struct ApiStatusError {
    pub status: u16,
    pub body: String,
}
