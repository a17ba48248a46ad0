//! Authentication providers

use crate::{AuthError, BasicCredentials, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::fmt;
use tracing::warn;

/// Authentication provider trait
#[async_trait]
pub trait AuthProvider: Send + Sync + fmt::Debug {
    /// Check credentials, returning the authenticated username
    async fn authenticate(&self, credentials: &BasicCredentials) -> Result<String>;
}

/// A single username/password pair fixed at start-up
///
/// Only a digest of the password is kept in memory. Usernames and passwords
/// are compared exactly, without any normalization.
#[derive(Clone)]
pub struct StaticCredentials {
    username: String,
    password_digest: [u8; 32],
    empty_password: bool,
}

impl StaticCredentials {
    /// Create the provider
    pub fn new(username: impl Into<String>, password: &str) -> Self {
        Self {
            username: username.into(),
            password_digest: digest(password),
            empty_password: password.is_empty(),
        }
    }

    /// Configured username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Whether the configured password is empty
    pub fn has_empty_password(&self) -> bool {
        self.empty_password
    }

    /// Whether `credentials` match the configured pair
    pub fn verify(&self, credentials: &BasicCredentials) -> bool {
        credentials.username == self.username
            && digest(&credentials.password) == self.password_digest
    }
}

fn digest(password: &str) -> [u8; 32] {
    Sha256::digest(password.as_bytes()).into()
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("username", &self.username)
            .field("empty_password", &self.empty_password)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthProvider for StaticCredentials {
    async fn authenticate(&self, credentials: &BasicCredentials) -> Result<String> {
        if !self.verify(credentials) {
            warn!(username = %credentials.username, "Invalid credentials");
            return Err(AuthError::AccessDenied);
        }

        Ok(credentials.username.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_credentials() {
        let provider = StaticCredentials::new("testuser", "testpass");

        let user = provider
            .authenticate(&BasicCredentials::new("testuser", "testpass"))
            .await
            .unwrap();
        assert_eq!(user, "testuser");

        let wrong_pass = provider
            .authenticate(&BasicCredentials::new("testuser", "wrong"))
            .await;
        assert_eq!(wrong_pass, Err(AuthError::AccessDenied));

        let wrong_user = provider
            .authenticate(&BasicCredentials::new("other", "testpass"))
            .await;
        assert_eq!(wrong_user, Err(AuthError::AccessDenied));
    }

    #[test]
    fn test_exact_comparison() {
        let provider = StaticCredentials::new("Dust", "secret");

        assert!(!provider.verify(&BasicCredentials::new("dust", "secret")));
        assert!(!provider.verify(&BasicCredentials::new("Dust", "secret ")));
        assert!(provider.verify(&BasicCredentials::new("Dust", "secret")));
    }

    #[test]
    fn test_empty_password() {
        let provider = StaticCredentials::new("dust", "");

        assert!(provider.has_empty_password());
        assert!(provider.verify(&BasicCredentials::new("dust", "")));
        assert!(!format!("{provider:?}").contains("password_digest"));
    }
}
