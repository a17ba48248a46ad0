//! Document paths

use std::fmt;

/// Separator between segments in the textual form of a path
pub const SEPARATOR: char = '/';

/// Ordered sequence of segment names leading from the root to a node
///
/// The root is the empty path. The textual form joins segments with `/`;
/// when parsing, empty segments are ignored so `"a//b/"` equals `"a/b"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl DocumentPath {
    /// The root path
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a `/`-separated path
    pub fn parse(path: &str) -> Self {
        Self {
            segments: split(path).collect(),
        }
    }

    /// Path of a descendant named by `name`, which may span several segments
    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(split(name));
        Self { segments }
    }

    /// Last segment, `""` for the root
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// Segments from the root
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this is the root path
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

fn split(path: &str) -> impl Iterator<Item = String> + '_ {
    path.split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl From<&str> for DocumentPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}
