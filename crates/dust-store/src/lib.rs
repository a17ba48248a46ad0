//! # Dust Store
//!
//! Tree-structured document store addressed by paths of name segments.
//!
//! Every node is either a scalar value (a string) or a composite holding
//! named children, never both. A composite always has at least one child:
//! removing the last child removes the composite as well.
//!
//! ## Example
//!
//! ```rust
//! use dust_store::{Document, InMemoryStore};
//! use std::sync::Arc;
//!
//! # fn main() -> dust_store::Result<()> {
//! let root = Document::root(Arc::new(InMemoryStore::new()));
//!
//! root.get("foo").get("bar").set("Hello")?;
//! assert_eq!(root.get("foo/bar").val()?, "Hello");
//! assert_eq!(root.to_json()?, r#"{"foo":{"bar":"Hello"}}"#);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

mod backend;
mod document;
mod error;
mod inmemory;
mod node;
mod path;
pub mod snapshot;

pub use backend::DocumentStore;
pub use document::Document;
pub use error::{Result, StoreError};
pub use inmemory::InMemoryStore;
pub use node::Node;
pub use path::DocumentPath;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::backend::DocumentStore;
    pub use crate::document::Document;
    pub use crate::error::{Result, StoreError};
    pub use crate::inmemory::InMemoryStore;
    pub use crate::path::DocumentPath;
}
