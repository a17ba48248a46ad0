//! Configuration types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration
///
/// Every section is optional; an empty document yields the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// HTTP listener
    pub server: ServerConfig,

    /// Credentials
    pub auth: AuthConfig,

    /// Script execution
    pub script: ScriptConfig,

    /// Document store
    pub store: StoreConfig,

    /// Logging
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Realm announced in the `WWW-Authenticate` challenge
    #[serde(default = "default_realm")]
    pub realm: String,

    /// Max request body size (bytes)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Graceful shutdown timeout (wait for in-flight requests)
    #[serde(default = "default_shutdown_timeout", with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

impl ServerConfig {
    /// `host:port` string to bind
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            realm: default_realm(),
            max_body_size: default_max_body_size(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

/// Credentials accepted by the gate
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthConfig {
    /// Username
    #[serde(default = "default_username")]
    pub username: String,

    /// Password, never serialized back out
    #[serde(default, skip_serializing)]
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: String::new(),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// What a script's `run` function receives
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryArgument {
    /// Root document handle
    #[default]
    Document,
    /// Database handle
    Database,
}

/// Script execution limits
///
/// A limit of `0` means unlimited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScriptConfig {
    /// Argument passed to `run`
    #[serde(default)]
    pub entry_argument: EntryArgument,

    /// Max interpreter operations per execution
    #[serde(default)]
    pub max_operations: u64,

    /// Max function call nesting
    #[serde(default = "default_max_call_levels")]
    pub max_call_levels: usize,

    /// Max expression nesting at the top level
    #[serde(default = "default_max_expr_depth")]
    pub max_expr_depth: usize,

    /// Max expression nesting inside functions
    #[serde(default = "default_max_function_expr_depth")]
    pub max_function_expr_depth: usize,

    /// Max string length
    #[serde(default = "default_max_string_size")]
    pub max_string_size: usize,

    /// Max array length
    #[serde(default)]
    pub max_array_size: usize,

    /// Max object map size
    #[serde(default)]
    pub max_map_size: usize,

    /// Wall-clock deadline per execution
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            entry_argument: EntryArgument::default(),
            max_operations: 0,
            max_call_levels: default_max_call_levels(),
            max_expr_depth: default_max_expr_depth(),
            max_function_expr_depth: default_max_function_expr_depth(),
            max_string_size: default_max_string_size(),
            max_array_size: 0,
            max_map_size: 0,
            timeout: None,
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// JSON snapshot loaded at start-up and written on shutdown
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, text)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9091
}

fn default_realm() -> String {
    "dustDB".to_string()
}

fn default_max_body_size() -> usize {
    1024 * 1024 // 1MB
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_username() -> String {
    "dust".to_string()
}

fn default_max_call_levels() -> usize {
    64
}

fn default_max_expr_depth() -> usize {
    64
}

fn default_max_function_expr_depth() -> usize {
    32
}

fn default_max_string_size() -> usize {
    16 * 1024 * 1024 // 16MB
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}
