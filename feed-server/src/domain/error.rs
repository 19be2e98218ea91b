use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("upstream responded {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    #[error("unexpected domain error: {0}")]
    Unexpected(String),
}
