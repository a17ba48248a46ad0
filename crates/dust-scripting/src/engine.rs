//! Script executor trait and execution options

use std::fmt;
use std::time::Duration;

/// Name of the function every script must define
pub const DEFAULT_ENTRY_POINT: &str = "run";

/// Executes one script against the store and renders the outcome
///
/// Implementations never fail: every outcome, including interpreter
/// failures, is rendered into the returned string.
pub trait ScriptExecutor: Send + Sync + fmt::Debug {
    /// Run `script` and return its result string
    fn apply_script(&self, script: &str) -> String;
}

/// What the entry point receives as its single argument
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EntryArgument {
    /// A `Document` handle on the store root
    #[default]
    Document,
    /// A `Database` handle with `get_document(path)`
    Database,
}

/// Per-execution interpreter settings
///
/// A limit of `0` leaves the corresponding resource unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorOptions {
    /// Entry point name
    pub entry_point: String,
    /// Entry point argument
    pub entry_argument: EntryArgument,
    /// Maximum number of operations
    pub max_operations: u64,
    /// Maximum function call nesting
    pub max_call_levels: usize,
    /// Maximum expression nesting at the top level
    pub max_expr_depth: usize,
    /// Maximum expression nesting inside functions
    pub max_function_expr_depth: usize,
    /// Maximum string length
    pub max_string_size: usize,
    /// Maximum array length
    pub max_array_size: usize,
    /// Maximum object map size
    pub max_map_size: usize,
    /// Wall-clock budget of one execution
    pub timeout: Option<Duration>,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            entry_argument: EntryArgument::default(),
            max_operations: 0,
            max_call_levels: 64,
            max_expr_depth: 64,
            max_function_expr_depth: 32,
            max_string_size: 16 * 1024 * 1024,
            max_array_size: 0,
            max_map_size: 0,
            timeout: None,
        }
    }
}

impl ExecutorOptions {
    /// Set the entry point argument
    pub fn with_entry_argument(mut self, argument: EntryArgument) -> Self {
        self.entry_argument = argument;
        self
    }

    /// Set the operations limit
    pub fn with_max_operations(mut self, max_operations: u64) -> Self {
        self.max_operations = max_operations;
        self
    }

    /// Set the call nesting limit
    pub fn with_max_call_levels(mut self, levels: usize) -> Self {
        self.max_call_levels = levels;
        self
    }

    /// Set the expression depth limits
    pub fn with_max_expr_depths(mut self, expr: usize, function_expr: usize) -> Self {
        self.max_expr_depth = expr;
        self.max_function_expr_depth = function_expr;
        self
    }

    /// Set the string length limit
    pub fn with_max_string_size(mut self, size: usize) -> Self {
        self.max_string_size = size;
        self
    }

    /// Set the array and map size limits
    pub fn with_max_collection_sizes(mut self, array: usize, map: usize) -> Self {
        self.max_array_size = array;
        self.max_map_size = map;
        self
    }

    /// Set the execution deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
