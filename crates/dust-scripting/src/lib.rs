//! # Dust Scripting Engine
//!
//! Executes submitted Rhai scripts against the document store.
//!
//! Each call to [`ScriptExecutor::apply_script`] builds a brand new Rhai
//! engine and scope, registers the document bindings, compiles and runs the
//! script, invokes its `run` function and tears everything down again.
//! Nothing survives from one call to the next except the store itself.
//!
//! ```rust
//! use dust_scripting::{RhaiExecutor, ScriptExecutor};
//! use dust_store::InMemoryStore;
//! use std::sync::Arc;
//!
//! let executor = RhaiExecutor::new(Arc::new(InMemoryStore::new()));
//! let result = executor.apply_script(
//!     r#"fn run(doc) { doc.get("foo").set("Hello"); doc.get("foo").val() }"#,
//! );
//! assert_eq!(result, "Hello");
//! ```
//!
//! Every outcome is a single string: the script's result on success, or a
//! rendering of the failure (see [`ScriptError`]).

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod bindings;
pub mod engine;
pub mod error;
pub mod rhai_engine;

pub use bindings::Database;
pub use engine::{EntryArgument, ExecutorOptions, ScriptExecutor, DEFAULT_ENTRY_POINT};
pub use error::{FailureKind, Result, ScriptError};
pub use rhai_engine::RhaiExecutor;

/// Prelude with commonly used types
pub mod prelude {
    pub use crate::engine::{EntryArgument, ExecutorOptions, ScriptExecutor};
    pub use crate::error::{FailureKind, Result, ScriptError};
    pub use crate::rhai_engine::RhaiExecutor;
}
