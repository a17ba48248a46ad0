//! HTTP server implementation

use crate::handler::RequestHandler;
use crate::shutdown::ShutdownSignal;
use crate::RuntimeState;
use dust_auth::StaticCredentials;
use dust_config::{Config, EntryArgument as ConfiguredArgument, ScriptConfig};
use dust_core::{Error, Result};
use dust_scripting::{EntryArgument, ExecutorOptions, RhaiExecutor, ScriptExecutor};
use dust_store::{snapshot, DocumentStore, InMemoryStore};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

/// HTTP server
pub struct Server {
    config: Config,
    store: Arc<dyn DocumentStore>,
    handler: RequestHandler,
    state: Arc<RwLock<RuntimeState>>,
    shutdown: ShutdownSignal,
    request_count: Arc<AtomicUsize>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("request_count", &self.request_count)
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Create a new server builder
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Get the current state
    pub async fn state(&self) -> RuntimeState {
        *self.state.read().await
    }

    /// Get listen address
    pub fn listen_addr(&self) -> String {
        self.config.server.listen_addr()
    }

    /// Number of requests in flight
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Get shutdown signal
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Get the request handler
    pub fn handler(&self) -> &RequestHandler {
        &self.handler
    }

    /// Get the document store
    pub fn store(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.store)
    }

    /// Bind the configured address and run until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.listen_addr()).await.map_err(|e| {
            Error::Runtime(format!("Failed to bind to {}: {}", self.listen_addr(), e))
        })?;

        self.serve(listener).await
    }

    /// Serve connections from `listener` until shutdown
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        self.set_state(RuntimeState::Running).await;

        let local_addr: Option<SocketAddr> = listener.local_addr().ok();
        tracing::info!(
            listen = ?local_addr,
            realm = %self.config.server.realm,
            "Server listening (HTTP)"
        );

        let mut shutdown_rx = self.shutdown.subscribe();

        while !self.shutdown.is_triggered() {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            tracing::trace!("Accepted connection from {}", addr);
                            let handler = self.handler.clone();

                            tokio::spawn(async move {
                                let service = hyper::service::service_fn(move |req| {
                                    let handler = handler.clone();
                                    async move {
                                        handler.handle(req).await.or_else(|e| {
                                            tracing::error!("Request handler error: {}", e);
                                            http::Response::builder()
                                                .status(e.to_status_code())
                                                .body(dust_core::Body::from(e.to_string()))
                                        })
                                    }
                                });

                                let io = hyper_util::rt::TokioIo::new(stream);
                                if let Err(e) = hyper::server::conn::http1::Builder::new()
                                    .serve_connection(io, service)
                                    .await
                                {
                                    tracing::debug!("HTTP connection error: {}", e);
                                }
                            });
                        }
                        Err(e) => {
                            tracing::error!("Failed to accept connection: {}", e);
                        }
                    }
                }

                _ = shutdown_rx.recv() => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.set_state(RuntimeState::ShuttingDown).await;
        tracing::info!("Server shutting down gracefully");

        let start = std::time::Instant::now();
        self.drain(self.config.server.shutdown_timeout).await;
        self.save_snapshot().await;

        self.set_state(RuntimeState::Stopped).await;
        tracing::info!(
            shutdown_duration_ms = start.elapsed().as_millis() as u64,
            "Server stopped"
        );

        Ok(())
    }

    async fn set_state(&self, state: RuntimeState) {
        *self.state.write().await = state;
    }

    /// Wait for in-flight requests to finish, at most `timeout`
    async fn drain(&self, timeout: Duration) {
        let start = std::time::Instant::now();

        tracing::info!(
            timeout_secs = timeout.as_secs(),
            "Waiting for in-flight requests to complete"
        );

        loop {
            let active = self.request_count();

            if active == 0 {
                tracing::info!("All requests completed, shutting down cleanly");
                break;
            }

            if start.elapsed() >= timeout {
                tracing::warn!(
                    active_requests = active,
                    "Shutdown timeout reached, forcing shutdown"
                );
                break;
            }

            tracing::debug!(
                active_requests = active,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Waiting for active requests to complete"
            );

            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    async fn save_snapshot(&self) {
        let Some(path) = self.config.store.snapshot_path.clone() else {
            return;
        };

        let store = Arc::clone(&self.store);
        let saved =
            tokio::task::spawn_blocking(move || snapshot::save(store.as_ref(), &path)).await;

        match saved {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "Failed to save snapshot"),
            Err(e) => tracing::error!(error = %e, "Snapshot task failed"),
        }
    }
}

/// Interpreter options for a script configuration
pub fn executor_options(script: &ScriptConfig) -> ExecutorOptions {
    let entry_argument = match script.entry_argument {
        ConfiguredArgument::Document => EntryArgument::Document,
        ConfiguredArgument::Database => EntryArgument::Database,
    };

    let options = ExecutorOptions::default()
        .with_entry_argument(entry_argument)
        .with_max_operations(script.max_operations)
        .with_max_call_levels(script.max_call_levels)
        .with_max_expr_depths(script.max_expr_depth, script.max_function_expr_depth)
        .with_max_string_size(script.max_string_size)
        .with_max_collection_sizes(script.max_array_size, script.max_map_size);

    match script.timeout {
        Some(timeout) => options.with_timeout(timeout),
        None => options,
    }
}

/// Server builder
#[derive(Debug, Default)]
pub struct ServerBuilder {
    config: Option<Config>,
    store: Option<Arc<dyn DocumentStore>>,
    executor: Option<Arc<dyn ScriptExecutor>>,
    shutdown: Option<ShutdownSignal>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Use an existing store instead of loading the configured snapshot
    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a custom script executor
    pub fn executor(mut self, executor: Arc<dyn ScriptExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Use an existing shutdown signal
    pub fn shutdown_signal(mut self, signal: ShutdownSignal) -> Self {
        self.shutdown = Some(signal);
        self
    }

    /// Build the server
    pub fn build(self) -> Result<Server> {
        let config = self
            .config
            .ok_or_else(|| Error::Config("config is required".to_string()))?;

        let store = match self.store {
            Some(store) => store,
            None => load_store(&config)?,
        };

        let executor = self.executor.unwrap_or_else(|| {
            Arc::new(RhaiExecutor::with_options(
                Arc::clone(&store),
                executor_options(&config.script),
            ))
        });

        let credentials = StaticCredentials::new(&config.auth.username, &config.auth.password);

        let request_count = Arc::new(AtomicUsize::new(0));
        let handler = RequestHandler::new(Arc::new(credentials), executor)
            .with_realm(&config.server.realm)
            .with_max_body_size(config.server.max_body_size)
            .with_request_count(Arc::clone(&request_count));

        Ok(Server {
            config,
            store,
            handler,
            state: Arc::new(RwLock::new(RuntimeState::Initializing)),
            shutdown: self.shutdown.unwrap_or_default(),
            request_count,
        })
    }
}

fn load_store(config: &Config) -> Result<Arc<dyn DocumentStore>> {
    let store = match &config.store.snapshot_path {
        Some(path) => snapshot::load(path).map_err(|e| Error::Store(e.to_string()))?,
        None => InMemoryStore::new(),
    };
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dust_config::ConfigBuilder;
    use dust_store::Document;

    fn test_config() -> Config {
        ConfigBuilder::new()
            .host("127.0.0.1")
            .credentials("testuser", "testpass")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_server_builder() {
        let server = ServerBuilder::new().config(test_config()).build().unwrap();

        assert_eq!(server.state().await, RuntimeState::Initializing);
        assert_eq!(server.listen_addr(), "127.0.0.1:9091");
        assert_eq!(server.request_count(), 0);
    }

    #[test]
    fn test_builder_requires_config() {
        assert!(ServerBuilder::new().build().is_err());
    }

    #[test]
    fn test_executor_options() {
        let mut script = ScriptConfig::default();
        script.entry_argument = ConfiguredArgument::Database;
        script.max_operations = 500;
        script.timeout = Some(Duration::from_secs(3));

        let options = executor_options(&script);
        assert_eq!(options.entry_argument, EntryArgument::Database);
        assert_eq!(options.max_operations, 500);
        assert_eq!(options.timeout, Some(Duration::from_secs(3)));
        assert_eq!(options.max_call_levels, script.max_call_levels);
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dust.json");

        let mut config = test_config();
        config.store.snapshot_path = Some(path.clone());

        let server = ServerBuilder::new().config(config.clone()).build().unwrap();
        Document::root(server.store()).get("greeting").set("hi").unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        server.shutdown_signal().trigger();
        server.serve(listener).await.unwrap();
        assert_eq!(server.state().await, RuntimeState::Stopped);
        assert!(path.exists());

        let restarted = ServerBuilder::new().config(config).build().unwrap();
        assert_eq!(
            Document::root(restarted.store()).get("greeting").val().unwrap(),
            "hi"
        );
    }
}
