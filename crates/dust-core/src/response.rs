//! Response builder and utilities
//!
//! Every response the gateway produces is plain text with an explicit
//! `Content-Length`.

use crate::Result;
use bytes::Bytes;
use http::{header, Response, StatusCode};
use http_body_util::Full;

/// Body type alias
pub type Body = Full<Bytes>;

/// Content type of every gateway response
pub const TEXT_PLAIN: &str = "text/plain";

/// Response builder for convenient response construction
#[derive(Debug)]
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(header::HeaderName, String)>,
}

impl ResponseBuilder {
    /// Create a new response builder
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    /// Set a header
    pub fn header(mut self, name: header::HeaderName, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Build response with text body
    pub fn text(self, body: impl Into<String>) -> Result<Response<Body>> {
        let body = Bytes::from(body.into());

        let mut response = Response::builder()
            .status(self.status)
            .header(header::CONTENT_LENGTH, body.len())
            .header(header::CONTENT_TYPE, TEXT_PLAIN);

        for (name, value) in self.headers {
            response = response.header(name, value);
        }

        Ok(response.body(Full::new(body))?)
    }
}

/// Convenience functions for common responses
pub mod responses {
    use super::*;

    /// 200 OK carrying a script result
    pub fn ok(body: impl Into<String>) -> Result<Response<Body>> {
        ResponseBuilder::new(StatusCode::OK).text(body)
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Result<Response<Body>> {
        ResponseBuilder::new(StatusCode::BAD_REQUEST).text(message)
    }

    /// 401 Unauthorized with a Basic challenge for `realm`
    pub fn challenge(realm: &str, message: impl Into<String>) -> Result<Response<Body>> {
        ResponseBuilder::new(StatusCode::UNAUTHORIZED)
            .header(header::WWW_AUTHENTICATE, format!("Basic realm=\"{realm}\""))
            .text(message)
    }

    /// 401 Unauthorized without a challenge
    pub fn unauthorized(message: impl Into<String>) -> Result<Response<Body>> {
        ResponseBuilder::new(StatusCode::UNAUTHORIZED).text(message)
    }

    /// 413 Payload Too Large
    pub fn payload_too_large(message: impl Into<String>) -> Result<Response<Body>> {
        ResponseBuilder::new(StatusCode::PAYLOAD_TOO_LARGE).text(message)
    }

    /// 500 Internal Server Error
    pub fn internal_error(message: impl Into<String>) -> Result<Response<Body>> {
        ResponseBuilder::new(StatusCode::INTERNAL_SERVER_ERROR).text(message)
    }
}
