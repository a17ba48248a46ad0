//! Configuration builder

use crate::types::{Config, EntryArgument};
use std::path::PathBuf;
use std::time::Duration;

/// Builder for constructing configuration programmatically
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new configuration builder starting from the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Set bind host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    /// Set bind port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Set authentication realm
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.config.server.realm = realm.into();
        self
    }

    /// Set max request body size
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.server.max_body_size = size;
        self
    }

    /// Set username and password
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.auth.username = username.into();
        self.config.auth.password = password.into();
        self
    }

    /// Set password only
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.auth.password = password.into();
        self
    }

    /// Set the argument scripts receive
    pub fn entry_argument(mut self, argument: EntryArgument) -> Self {
        self.config.script.entry_argument = argument;
        self
    }

    /// Set script execution deadline
    pub fn script_timeout(mut self, timeout: Duration) -> Self {
        self.config.script.timeout = Some(timeout);
        self
    }

    /// Set store snapshot file
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.store.snapshot_path = Some(path.into());
        self
    }

    /// Take the configuration without validating it
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Validate and build the configuration
    pub fn build(self) -> dust_core::Result<Config> {
        crate::validator::validate_config(&self.config)?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .host("127.0.0.1")
            .port(8080)
            .credentials("testuser", "testpass")
            .script_timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        assert_eq!(config.server.listen_addr(), "127.0.0.1:8080");
        assert_eq!(config.auth.username, "testuser");
        assert_eq!(config.auth.password, "testpass");
        assert_eq!(config.script.timeout, Some(Duration::from_secs(2)));
        assert_eq!(config.server.realm, "dustDB");
    }

    #[test]
    fn test_builder_overrides_loaded_config() {
        let mut base = Config::default();
        base.auth.password = "from-file".to_string();

        let config = ConfigBuilder::from_config(base)
            .password("from-cli")
            .build()
            .unwrap();

        assert_eq!(config.auth.password, "from-cli");
    }

    #[test]
    fn test_builder_validates() {
        let result = ConfigBuilder::new().port(0).build();
        assert!(result.is_err());
    }
}
