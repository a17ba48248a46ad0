//! Store nodes and their JSON form

use crate::{Result, StoreError};
use serde::Serialize;
use std::collections::BTreeMap;

/// A subtree of the store
///
/// Serializes as a JSON string for scalars and as a JSON object for
/// composites. Children are kept sorted by name, which makes both
/// enumeration and serialization deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Node {
    /// Scalar value
    Value(String),
    /// Named children
    Composite(BTreeMap<String, Node>),
}

impl Node {
    /// A composite without children, which stands for "nothing here"
    pub fn empty() -> Self {
        Node::Composite(BTreeMap::new())
    }

    /// Whether the node carries no data at all
    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Composite(children) if children.is_empty())
    }

    /// Whether the node is a composite with at least one child
    pub fn is_composite(&self) -> bool {
        matches!(self, Node::Composite(children) if !children.is_empty())
    }

    /// Parse a document from JSON text
    ///
    /// Accepts a string or an object whose leaves are strings. Empty nested
    /// objects are dropped.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let mut node = Self::from_value(value)?;
        node.prune();
        Ok(node)
    }

    /// Render the node as compact JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn from_value(value: serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::String(s) => Ok(Node::Value(s)),
            serde_json::Value::Object(map) => map
                .into_iter()
                .map(|(name, child)| {
                    if name.is_empty() || name.contains(crate::path::SEPARATOR) {
                        return Err(StoreError::InvalidJson(format!(
                            "invalid child name {name:?}"
                        )));
                    }
                    Ok((name, Self::from_value(child)?))
                })
                .collect::<Result<BTreeMap<_, _>>>()
                .map(Node::Composite),
            other => Err(StoreError::InvalidJson(format!(
                "expected string or object, found {}",
                kind_of(&other)
            ))),
        }
    }

    /// Drop empty composites below this node
    pub(crate) fn prune(&mut self) {
        if let Node::Composite(children) = self {
            children.retain(|_, child| {
                child.prune();
                !child.is_empty()
            });
        }
    }
}

fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
