//! Document handles

use crate::{DocumentPath, DocumentStore, Node, Result};
use std::fmt;
use std::sync::Arc;

/// Handle to a node of a [`DocumentStore`]
///
/// A handle is only a (store, path) pair: creating one never touches the
/// store, and a handle may point at a node that does not exist yet.
#[derive(Clone)]
pub struct Document {
    store: Arc<dyn DocumentStore>,
    path: DocumentPath,
}

impl Document {
    /// Handle to the node at `path`
    pub fn new(store: Arc<dyn DocumentStore>, path: DocumentPath) -> Self {
        Self { store, path }
    }

    /// Handle to the root of `store`
    pub fn root(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(store, DocumentPath::root())
    }

    /// Path of this document
    pub fn path(&self) -> &DocumentPath {
        &self.path
    }

    /// Child handle; `name` may contain several `/`-separated segments
    pub fn get(&self, name: &str) -> Document {
        Self::new(Arc::clone(&self.store), self.path.join(name))
    }

    /// Store a scalar value
    pub fn set(&self, value: &str) -> Result<()> {
        self.store.assign(&self.path, value)
    }

    /// Read the scalar value
    pub fn val(&self) -> Result<String> {
        self.store.value(&self.path)
    }

    /// Whether the node exists
    pub fn exists(&self) -> bool {
        self.store.exists(&self.path)
    }

    /// Whether the node has children
    pub fn is_composite(&self) -> bool {
        self.store.is_composite(&self.path)
    }

    /// Remove the node and everything below it
    pub fn remove(&self) {
        self.store.remove(&self.path)
    }

    /// Handles to the children, ordered by name
    pub fn children(&self) -> Result<Vec<Document>> {
        Ok(self
            .store
            .children(&self.path)?
            .iter()
            .map(|name| self.get(name))
            .collect())
    }

    /// Name of the last path segment, `""` for the root
    pub fn index(&self) -> String {
        self.path.name().to_string()
    }

    /// Render the subtree as JSON; an absent node renders as `{}`
    pub fn to_json(&self) -> Result<String> {
        self.store
            .snapshot(&self.path)
            .unwrap_or_else(Node::empty)
            .to_json()
    }

    /// Replace the subtree with the document described by `json`
    pub fn from_json(&self, json: &str) -> Result<()> {
        let node = Node::from_json(json)?;
        self.store.replace(&self.path, Some(node))
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path.to_string())
            .finish()
    }
}
