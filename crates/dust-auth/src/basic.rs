//! HTTP Basic credential parsing

use crate::{AuthError, Result};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use http::HeaderValue;
use std::fmt;

/// Authorization scheme accepted by the gate
pub const SCHEME: &str = "Basic";

/// Decoder that accepts missing padding and non-canonical trailing bits
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decode base64 the way clients in the wild send it
///
/// Whitespace anywhere in the input is ignored. Every `=` is decoded as a
/// zero sextet and the output is then shortened by the number of `=` seen.
/// Returns `None` for characters outside the base64 alphabet.
pub fn decode_base64(input: impl AsRef<[u8]>) -> Option<Vec<u8>> {
    let cleaned: Vec<u8> = input
        .as_ref()
        .iter()
        .filter(|b| !b.is_ascii_whitespace())
        .map(|&b| if b == b'=' { b'A' } else { b })
        .collect();
    let padding = input.as_ref().iter().filter(|&&b| b == b'=').count();

    let mut bytes = LENIENT.decode(cleaned).ok()?;
    bytes.truncate(bytes.len().saturating_sub(padding));
    Some(bytes)
}

/// Username and password taken from an `Authorization` header
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    /// Username, everything before the first `:`
    pub username: String,
    /// Password, everything after the first `:`
    pub password: String,
}

impl BasicCredentials {
    /// Create credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Extract Basic credentials from an `Authorization` header value
///
/// The scheme check is a literal prefix match on `Basic`; the credential
/// token is the whitespace-trimmed remainder.
pub fn parse_authorization(header: Option<&HeaderValue>) -> Result<BasicCredentials> {
    let value = header
        .map(HeaderValue::as_bytes)
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingCredentials)?;

    let token = value
        .strip_prefix(SCHEME.as_bytes())
        .ok_or(AuthError::MissingCredentials)?;

    let decoded = decode_base64(token).ok_or(AuthError::MalformedCredentials)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedCredentials)?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or(AuthError::MalformedCredentials)?;

    Ok(BasicCredentials::new(username, password))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(value: &str) -> HeaderValue {
        HeaderValue::from_str(value).unwrap()
    }

    #[test]
    fn test_decode_padded() {
        assert_eq!(
            decode_base64("dGVzdHVzZXI6dGVzdHBhc3M=").unwrap(),
            b"testuser:testpass"
        );
        assert_eq!(decode_base64("YQ==").unwrap(), b"a");
        assert_eq!(decode_base64("YWI=").unwrap(), b"ab");
        assert_eq!(decode_base64("YWJj").unwrap(), b"abc");
    }

    #[test]
    fn test_decode_tolerates_whitespace_and_missing_padding() {
        assert_eq!(decode_base64(" dGVz\r\ndHVz ZXI6 ").unwrap(), b"testuser:");
        assert_eq!(decode_base64("YWI").unwrap(), b"ab");
        assert_eq!(decode_base64("").unwrap(), b"");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_base64("not*base64").is_none());
    }

    #[test]
    fn test_parse_valid() {
        let credentials = parse_authorization(Some(&header("Basic dGVzdHVzZXI6dGVzdHBhc3M="))).unwrap();
        assert_eq!(credentials, BasicCredentials::new("testuser", "testpass"));
    }

    #[test]
    fn test_password_may_contain_colons() {
        // "user:pa:ss"
        let credentials = parse_authorization(Some(&header("Basic dXNlcjpwYTpzcw=="))).unwrap();
        assert_eq!(credentials.username, "user");
        assert_eq!(credentials.password, "pa:ss");
    }

    #[test]
    fn test_missing_or_other_scheme() {
        assert_eq!(parse_authorization(None), Err(AuthError::MissingCredentials));
        assert_eq!(
            parse_authorization(Some(&header(""))),
            Err(AuthError::MissingCredentials)
        );
        assert_eq!(
            parse_authorization(Some(&header("Bearer abc"))),
            Err(AuthError::MissingCredentials)
        );
        assert_eq!(
            parse_authorization(Some(&header("basic dGVzdHVzZXI6dGVzdHBhc3M="))),
            Err(AuthError::MissingCredentials)
        );
    }

    #[test]
    fn test_malformed() {
        // "testuser" without a colon
        assert_eq!(
            parse_authorization(Some(&header("Basic dGVzdHVzZXI="))),
            Err(AuthError::MalformedCredentials)
        );
        assert_eq!(
            parse_authorization(Some(&header("Basic !!!"))),
            Err(AuthError::MalformedCredentials)
        );
        // 0xff 0xfe is not UTF-8
        assert_eq!(
            parse_authorization(Some(&header("Basic //4="))),
            Err(AuthError::MalformedCredentials)
        );
    }

    #[test]
    fn test_debug_hides_password() {
        let rendered = format!("{:?}", BasicCredentials::new("ada", "hunter2"));
        assert!(rendered.contains("ada"));
        assert!(!rendered.contains("hunter2"));
    }
}
