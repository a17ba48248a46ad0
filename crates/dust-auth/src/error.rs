//! Authentication error types

use thiserror::Error;

/// Authentication result type
pub type Result<T> = std::result::Result<T, AuthError>;

/// Reasons a request is turned away before reaching the script engine
///
/// The `Display` text is the response body. Missing credentials get a
/// `401` with a challenge, malformed ones a `400`, wrong ones a plain `401`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header, or not the `Basic` scheme
    #[error("authorization required")]
    MissingCredentials,

    /// Credentials that do not decode to `user:password`
    #[error("invalid authorization request")]
    MalformedCredentials,

    /// Wrong username or password
    #[error("access denied")]
    AccessDenied,
}
