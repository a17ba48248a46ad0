//! In-memory document store implementation

use crate::{DocumentPath, DocumentStore, Node, Result, StoreError};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::trace;

/// In-memory document store
///
/// Holds the whole tree behind a single read/write lock, so every
/// operation is atomic with respect to every other. Clones share the tree.
/// The root is always a composite, possibly empty.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    root: Arc<RwLock<Node>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            root: Arc::new(RwLock::new(Node::empty())),
        }
    }

    /// Create a store holding `root`
    ///
    /// Fails when `root` is a scalar.
    pub fn with_root(mut root: Node) -> Result<Self> {
        if matches!(root, Node::Value(_)) {
            return Err(StoreError::OverrideComposite);
        }
        root.prune();
        Ok(Self {
            root: Arc::new(RwLock::new(root)),
        })
    }

    /// Whether the store holds no data
    pub fn is_empty(&self) -> bool {
        self.root.read().is_empty()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk down `segments` without creating anything
fn find<'a>(mut node: &'a Node, segments: &[String]) -> Option<&'a Node> {
    for segment in segments {
        node = match node {
            Node::Composite(children) => children.get(segment)?,
            Node::Value(_) => return None,
        };
    }
    (!node.is_empty()).then_some(node)
}

/// Walk down `segments`, creating missing nodes as empty composites
///
/// Fails before inserting anything when a scalar lies on the way.
fn slot<'a>(mut node: &'a mut Node, segments: &[String]) -> Result<&'a mut Node> {
    for segment in segments {
        node = match node {
            Node::Composite(children) => children
                .entry(segment.clone())
                .or_insert_with(Node::empty),
            Node::Value(_) => return Err(StoreError::ParentNotComposite),
        };
    }
    Ok(node)
}

/// Remove the node at `segments`, pruning composites left empty
fn remove_at(node: &mut Node, segments: &[String]) {
    match segments.split_first() {
        None => *node = Node::empty(),
        Some((head, rest)) => {
            if let Node::Composite(children) = node {
                if let Some(child) = children.get_mut(head) {
                    remove_at(child, rest);
                    if child.is_empty() {
                        children.remove(head);
                    }
                }
            }
        }
    }
}

impl DocumentStore for InMemoryStore {
    fn value(&self, path: &DocumentPath) -> Result<String> {
        trace!(path = %path, "InMemory VALUE");

        match find(&self.root.read(), path.segments()) {
            Some(Node::Value(value)) => Ok(value.clone()),
            _ => Err(StoreError::ValueNotFound),
        }
    }

    fn assign(&self, path: &DocumentPath, value: &str) -> Result<()> {
        trace!(path = %path, len = value.len(), "InMemory ASSIGN");

        if path.is_root() {
            return Err(StoreError::OverrideComposite);
        }

        let mut root = self.root.write();
        let target = slot(&mut root, path.segments())?;
        if target.is_composite() {
            return Err(StoreError::OverrideComposite);
        }
        *target = Node::Value(value.to_string());
        Ok(())
    }

    fn exists(&self, path: &DocumentPath) -> bool {
        find(&self.root.read(), path.segments()).is_some()
    }

    fn is_composite(&self, path: &DocumentPath) -> bool {
        find(&self.root.read(), path.segments()).map_or(false, Node::is_composite)
    }

    fn remove(&self, path: &DocumentPath) {
        trace!(path = %path, "InMemory REMOVE");

        remove_at(&mut self.root.write(), path.segments());
    }

    fn children(&self, path: &DocumentPath) -> Result<Vec<String>> {
        match find(&self.root.read(), path.segments()) {
            Some(Node::Composite(children)) => Ok(children.keys().cloned().collect()),
            Some(Node::Value(_)) => Err(StoreError::ParentNotComposite),
            None => Ok(Vec::new()),
        }
    }

    fn snapshot(&self, path: &DocumentPath) -> Option<Node> {
        find(&self.root.read(), path.segments()).cloned()
    }

    fn replace(&self, path: &DocumentPath, node: Option<Node>) -> Result<()> {
        trace!(path = %path, "InMemory REPLACE");

        let mut root = self.root.write();
        match node.filter(|node| !node.is_empty()) {
            None => remove_at(&mut root, path.segments()),
            Some(Node::Value(_)) if path.is_root() => {
                return Err(StoreError::OverrideComposite);
            }
            Some(mut node) => {
                node.prune();
                *slot(&mut root, path.segments())? = node;
            }
        }
        Ok(())
    }
}
