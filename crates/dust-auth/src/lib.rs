//! HTTP Basic authentication for the dust script gateway
//!
//! [`parse_authorization`] turns an `Authorization` header into
//! [`BasicCredentials`]; an [`AuthProvider`] then decides whether they are
//! accepted. Every rejection is an [`AuthError`] whose `Display` text is the
//! response body.

#![warn(
    clippy::all,
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod basic;
pub mod error;
pub mod provider;

pub use basic::{decode_base64, parse_authorization, BasicCredentials, SCHEME};
pub use error::{AuthError, Result};
pub use provider::{AuthProvider, StaticCredentials};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::basic::{parse_authorization, BasicCredentials};
    pub use crate::error::AuthError;
    pub use crate::provider::{AuthProvider, StaticCredentials};
}
