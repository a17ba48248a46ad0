//! dust-server: authenticated script execution over a document store

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dust_config::{load_from_file, Config, ConfigBuilder, LoggingConfig};
use dust_runtime::{ServerBuilder, SignalHandler};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dust-server")]
#[command(about = "Run scripts against a document store over HTTP", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        #[command(flatten)]
        settings: Settings,

        /// Log level (trace, debug, info, warn, error)
        #[arg(short, long)]
        log_level: Option<String>,
    },

    /// Validate configuration file
    Validate {
        #[command(flatten)]
        settings: Settings,
    },

    /// Show version information
    Version,
}

/// Configuration file plus command-line overrides
#[derive(Args, Debug, Default)]
struct Settings {
    /// Path to configuration file (YAML, TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind host
    #[arg(long)]
    host: Option<String>,

    /// Bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// Password for the configured user
    #[arg(long, env = "DUST_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl Settings {
    /// Configuration file contents with the overrides applied, not yet validated
    fn load(&self) -> Result<Config> {
        let config = match &self.config {
            Some(path) => load_from_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => Config::default(),
        };

        let mut builder = ConfigBuilder::from_config(config);
        if let Some(host) = &self.host {
            builder = builder.host(host.clone());
        }
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        if let Some(password) = &self.password {
            builder = builder.password(password.clone());
        }

        Ok(builder.into_config())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            settings,
            log_level,
        } => {
            let config = settings.load()?;
            init_tracing(&config.logging, log_level.as_deref())?;

            tracing::info!("Starting dust-server");
            if let Some(path) = &settings.config {
                tracing::info!("Config file: {}", path.display());
            }

            let config = ConfigBuilder::from_config(config).build()?;

            tracing::info!(
                listen = %config.server.listen_addr(),
                entry_argument = ?config.script.entry_argument,
                snapshot = ?config.store.snapshot_path,
                "Configuration loaded"
            );

            let server = ServerBuilder::new().config(config).build()?;

            let shutdown_signal = server.shutdown_signal();
            tokio::spawn(async move {
                let handler = SignalHandler::new(shutdown_signal);
                handler.run().await;
            });

            server.run().await?;
            Ok(())
        }

        Commands::Validate { settings } => {
            tracing_subscriber::fmt().with_target(false).init();

            let validated = settings
                .load()
                .and_then(|config| Ok(ConfigBuilder::from_config(config).build()?));

            match validated {
                Ok(cfg) => {
                    tracing::info!("✓ Configuration is valid");
                    tracing::info!("  Listen: {}", cfg.server.listen_addr());
                    tracing::info!("  Realm: {}", cfg.server.realm);
                    tracing::info!("  User: {}", cfg.auth.username);
                    tracing::info!("  Entry argument: {:?}", cfg.script.entry_argument);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!("✗ Configuration validation failed: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Version => {
            println!("dust-server");
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing(logging: &LoggingConfig, level_override: Option<&str>) -> Result<()> {
    let level = level_override.unwrap_or(&logging.level);
    let filter = match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(filter.into())
        .add_directive("hyper=warn".parse()?);

    let registry = tracing_subscriber::registry().with(env_filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_level(true),
            )
            .init();
    }

    Ok(())
}
