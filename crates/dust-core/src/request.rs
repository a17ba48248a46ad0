//! Request context and utilities

use uuid::Uuid;

/// Context attached to each request
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique request ID for tracing
    pub request_id: String,

    /// Authenticated username, once the Basic credentials were accepted
    pub username: Option<String>,

    /// Whether the body was sent form-url-encoded
    pub urlencoded: bool,
}

impl RequestContext {
    /// Create a new request context
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            username: None,
            urlencoded: false,
        }
    }

    /// Record the authenticated user
    pub fn authenticated(&mut self, username: impl Into<String>) {
        self.username = Some(username.into());
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
