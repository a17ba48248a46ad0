//! # Dust Core
//!
//! Core types and error handling shared by the dust script gateway crates:
//! - Error type and `Result` alias
//! - Plain-text response construction
//! - Per-request context

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod error;
pub mod request;
pub mod response;

pub use error::{Error, Result};
pub use request::RequestContext;
pub use response::{Body, ResponseBuilder};

// Re-export commonly used HTTP types
pub use bytes::Bytes;
pub use http::{Method, Request, Response, StatusCode};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::request::RequestContext;
    pub use crate::response::{responses, Body, ResponseBuilder};
}
