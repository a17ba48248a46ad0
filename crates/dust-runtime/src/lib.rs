//! # Dust Runtime
//!
//! The request gate and the server around it:
//! - Basic authentication, body limits and form decoding
//! - Script execution on blocking workers
//! - Server lifecycle (startup, running, shutdown)
//! - Graceful shutdown with signal handling and store snapshots

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod encoding;
pub mod handler;
pub mod server;
pub mod shutdown;

pub use encoding::url_decode;
pub use handler::RequestHandler;
pub use server::{executor_options, Server, ServerBuilder};
pub use shutdown::{ShutdownSignal, SignalHandler};

/// Runtime state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    /// Server is initializing
    Initializing,
    /// Server is running
    Running,
    /// Server is shutting down
    ShuttingDown,
    /// Server is stopped
    Stopped,
}

/// Re-export commonly used types
pub mod prelude {
    pub use crate::handler::RequestHandler;
    pub use crate::server::{Server, ServerBuilder};
    pub use crate::shutdown::{ShutdownSignal, SignalHandler};
    pub use crate::RuntimeState;
}
