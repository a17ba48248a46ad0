//! Whole-store JSON snapshots

use crate::{DocumentPath, DocumentStore, InMemoryStore, Node, Result, StoreError};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Load a store from a JSON snapshot; a missing file yields an empty store
pub fn load(path: impl AsRef<Path>) -> Result<InMemoryStore> {
    let path = path.as_ref();

    if !path.exists() {
        info!(path = %path.display(), "No snapshot found, starting with an empty store");
        return Ok(InMemoryStore::new());
    }

    let content = fs::read_to_string(path)?;
    let root = if content.trim().is_empty() {
        Node::empty()
    } else {
        Node::from_json(&content)?
    };

    if matches!(root, Node::Value(_)) {
        return Err(StoreError::InvalidJson(
            "snapshot root must be an object".to_string(),
        ));
    }

    debug!(path = %path.display(), bytes = content.len(), "Snapshot loaded");
    InMemoryStore::with_root(root)
}

/// Write the whole store to `path` as JSON
///
/// The snapshot is written to a sibling temporary file first and then
/// renamed over `path`.
pub fn save(store: &dyn DocumentStore, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = store
        .snapshot(&DocumentPath::root())
        .unwrap_or_else(Node::empty)
        .to_json()?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &json)?;
    fs::rename(&tmp, path)?;

    info!(path = %path.display(), bytes = json.len(), "Snapshot saved");
    Ok(())
}
