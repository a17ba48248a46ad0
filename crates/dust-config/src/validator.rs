//! Configuration validation

use crate::Config;
use dust_core::{Error, Result};

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_server(config)?;
    validate_auth(config)?;
    validate_script(config)?;
    validate_logging(config)?;

    Ok(())
}

fn validate_server(config: &Config) -> Result<()> {
    let server = &config.server;

    if server.host.trim().is_empty() {
        return Err(Error::Config("server.host cannot be empty".to_string()));
    }

    if server.port == 0 {
        return Err(Error::Config("server.port must be > 0".to_string()));
    }

    // The realm is emitted inside a quoted header parameter
    if server.realm.contains('"') || server.realm.chars().any(char::is_control) {
        return Err(Error::Config(format!(
            "server.realm contains characters not allowed in a header: {:?}",
            server.realm
        )));
    }

    if server.max_body_size == 0 {
        return Err(Error::Config("server.max_body_size must be > 0".to_string()));
    }

    Ok(())
}

fn validate_auth(config: &Config) -> Result<()> {
    if config.auth.username.is_empty() {
        return Err(Error::Config("auth.username cannot be empty".to_string()));
    }

    if config.auth.username.contains(':') {
        return Err(Error::Config(
            "auth.username cannot contain ':'".to_string(),
        ));
    }

    if config.auth.password.is_empty() {
        tracing::warn!("!SECURITY WARNING! empty password, anyone knowing the username can run scripts");
    }

    Ok(())
}

fn validate_script(config: &Config) -> Result<()> {
    let script = &config.script;

    if script.timeout.map_or(false, |timeout| timeout.is_zero()) {
        return Err(Error::Config("script.timeout must be > 0".to_string()));
    }

    if script.max_call_levels == 0 {
        return Err(Error::Config("script.max_call_levels must be > 0".to_string()));
    }

    if script.timeout.is_none() && script.max_operations == 0 {
        tracing::debug!("Scripts run without a deadline or operation limit");
    }

    Ok(())
}

fn validate_logging(config: &Config) -> Result<()> {
    match config.logging.format.as_str() {
        "text" | "json" => Ok(()),
        other => Err(Error::Config(format!(
            "Invalid log format: {other} (must be text or json)"
        ))),
    }
}
