//! Error types for the dust gateway

/// Result type alias using [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for the dust gateway
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid HTTP request
    #[error("Invalid HTTP request: {0}")]
    InvalidRequest(String),

    /// Request body exceeds the configured limit
    #[error("Request body too large: limit is {limit} bytes")]
    PayloadTooLarge {
        /// Configured limit in bytes
        limit: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document store error
    #[error("Store error: {0}")]
    Store(String),

    /// Runtime error
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Response could not be assembled
    #[error("HTTP error: {0}")]
    HttpError(#[from] http::Error),

}

impl Error {
    /// Convert error to HTTP status code
    pub fn to_status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            Error::InvalidRequest("bad escape".to_string()).to_status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::PayloadTooLarge { limit: 16 }.to_status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            Error::Store("snapshot unreadable".to_string()).to_status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_payload_error_message() {
        let err = Error::PayloadTooLarge { limit: 1024 };
        assert!(err.to_string().contains("1024"));
    }
}
