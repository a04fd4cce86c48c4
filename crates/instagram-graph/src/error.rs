//! Error types for Instagram API operations

/// Errors from client operations.
///
/// API-level failures (a valid JSON body carrying an `error` object) are
/// returned as data by every operation. `Api` is only produced when the
/// caller opts in via [`crate::check_api_error`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("API error {code}: {message}")]
    Api {
        code: i64,
        error_type: Option<String>,
        message: String,
    },
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
