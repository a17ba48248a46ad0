//! Document store trait definition

use crate::{DocumentPath, Node, Result};
use std::fmt;

/// Document store trait
///
/// The interface the gateway consumes from a hierarchical store. One store
/// is shared by every script execution, so implementations must be safe for
/// concurrent use; each call is expected to be atomic on its own.
pub trait DocumentStore: Send + Sync + fmt::Debug {
    /// Read the scalar stored at `path`
    ///
    /// Fails with [`StoreError::ValueNotFound`](crate::StoreError::ValueNotFound)
    /// when the node is absent or a composite.
    fn value(&self, path: &DocumentPath) -> Result<String>;

    /// Store a scalar at `path`, creating composite ancestors as needed
    fn assign(&self, path: &DocumentPath, value: &str) -> Result<()>;

    /// Whether a node exists at `path`
    fn exists(&self, path: &DocumentPath) -> bool;

    /// Whether the node at `path` has children
    fn is_composite(&self, path: &DocumentPath) -> bool;

    /// Remove the subtree rooted at `path`
    ///
    /// Removing an absent node is not an error.
    fn remove(&self, path: &DocumentPath);

    /// Names of the children of `path`, in ascending order
    ///
    /// An absent node has no children; a scalar node is an error.
    fn children(&self, path: &DocumentPath) -> Result<Vec<String>>;

    /// Copy of the subtree rooted at `path`, `None` when absent
    fn snapshot(&self, path: &DocumentPath) -> Option<Node>;

    /// Replace the subtree rooted at `path` as one operation
    ///
    /// `None` (or an empty composite) removes the subtree.
    fn replace(&self, path: &DocumentPath, node: Option<Node>) -> Result<()>;
}
