//! Script execution error types
//!
//! The `Display` form of a [`ScriptError`] is exactly the string handed back
//! to the caller, so changing it changes the wire format.

use crate::bindings::{Database, DATABASE_TYPE};
use dust_store::Document;
use rhai::{Dynamic, EvalAltResult, ParseError, ParseErrorType};
use std::fmt;

/// Script execution result type
pub type Result<T> = std::result::Result<T, ScriptError>;

/// Category of an interpreter failure
///
/// Used as the message when the interpreter reports an empty one, and as a
/// structured field in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Script text could not be parsed
    Syntax,
    /// Error raised while running the script
    Runtime,
    /// A size, depth or operation limit was hit
    OutOfMemory,
    /// The configured execution deadline passed
    Deadline,
    /// Failure inside the interpreter or the host
    Internal,
    /// Anything else
    Unknown,
}

impl FailureKind {
    /// Fallback message for this category
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syntax => "syntax error",
            Self::Runtime => "runtime error",
            Self::OutOfMemory => "out of memory",
            Self::Deadline => "execution deadline exceeded",
            Self::Internal => "internal error",
            Self::Unknown => "unknown error code",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Script execution error
#[derive(Debug, Clone)]
pub enum ScriptError {
    /// Script compilation/parsing error
    CompilationError {
        /// Failure category
        kind: FailureKind,
        /// Native diagnostic, possibly empty
        message: String,
    },

    /// Error raised while running the top level or the entry point
    RuntimeError {
        /// Failure category
        kind: FailureKind,
        /// Native diagnostic, possibly empty
        message: String,
    },

    /// The script does not define the entry point
    EntryPointMissing {
        /// Entry point name
        name: String,
    },

    /// The entry point returned something other than a string
    NonStringReturn {
        /// Interpreter type name of the returned value
        type_name: String,
    },

    /// Execution panicked
    Panic {
        /// Panic message
        message: String,
    },
}

impl ScriptError {
    /// Create a compilation error
    pub fn compilation<S: Into<String>>(kind: FailureKind, message: S) -> Self {
        Self::CompilationError {
            kind,
            message: message.into(),
        }
    }

    /// Create a runtime error
    pub fn runtime<S: Into<String>>(kind: FailureKind, message: S) -> Self {
        Self::RuntimeError {
            kind,
            message: message.into(),
        }
    }

    /// Create a panic error
    pub fn panic<S: Into<String>>(message: S) -> Self {
        Self::Panic {
            message: message.into(),
        }
    }

    /// Failure category, if this error came from the interpreter
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::CompilationError { kind, .. } | Self::RuntimeError { kind, .. } => Some(*kind),
            Self::Panic { .. } => Some(FailureKind::Internal),
            Self::EntryPointMissing { .. } | Self::NonStringReturn { .. } => None,
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CompilationError { kind, message } if message.is_empty() => {
                write!(f, "error: {}", kind)
            }
            Self::CompilationError { kind, message } => write!(f, "error: {}: {}", kind, message),
            Self::RuntimeError { kind, message } if message.is_empty() => {
                write!(f, "error: {}", kind)
            }
            Self::RuntimeError { message, .. } => write!(f, "error: {}", message),
            Self::EntryPointMissing { name } => write!(f, "{} method not defined", name),
            Self::NonStringReturn { .. } => write!(f, "error: non-string return type"),
            Self::Panic { .. } => write!(f, "error: {}", FailureKind::Internal),
        }
    }
}

impl std::error::Error for ScriptError {}

impl From<ParseError> for ScriptError {
    fn from(err: ParseError) -> Self {
        let kind = match err.err_type() {
            ParseErrorType::ExprTooDeep | ParseErrorType::LiteralTooLarge(..) => {
                FailureKind::OutOfMemory
            }
            _ => FailureKind::Syntax,
        };
        Self::compilation(kind, err.to_string())
    }
}

impl From<Box<EvalAltResult>> for ScriptError {
    fn from(err: Box<EvalAltResult>) -> Self {
        let cause = innermost(&err);
        Self::runtime(classify(cause), message_of(cause))
    }
}

/// Unwrap the call-site wrappers Rhai adds around errors raised in functions
fn innermost(err: &EvalAltResult) -> &EvalAltResult {
    match err {
        EvalAltResult::ErrorInFunctionCall(_, _, inner, ..)
        | EvalAltResult::ErrorInModule(_, inner, ..) => innermost(inner),
        other => other,
    }
}

fn classify(err: &EvalAltResult) -> FailureKind {
    match err {
        EvalAltResult::ErrorRuntime(..) => FailureKind::Runtime,
        EvalAltResult::ErrorTerminated(..) => FailureKind::Deadline,
        EvalAltResult::ErrorTooManyOperations(..)
        | EvalAltResult::ErrorDataTooLarge(..)
        | EvalAltResult::ErrorStackOverflow(..) => FailureKind::OutOfMemory,
        EvalAltResult::ErrorParsing(..) => FailureKind::Syntax,
        EvalAltResult::ErrorSystem(..) => FailureKind::Internal,
        _ => FailureKind::Runtime,
    }
}

/// Message of the error without Rhai's position suffix
///
/// Values thrown by scripts and raised by the document bindings are
/// reproduced verbatim.
fn message_of(err: &EvalAltResult) -> String {
    match err {
        EvalAltResult::ErrorRuntime(value, ..) | EvalAltResult::ErrorTerminated(value, ..) => {
            thrown_text(value)
        }
        EvalAltResult::ErrorParsing(err_type, ..) => err_type.to_string(),
        other => other.to_string(),
    }
}

/// Text of a thrown value; store handles render as they do in scripts
fn thrown_text(value: &Dynamic) -> String {
    if let Some(doc) = value.clone().try_cast::<Document>() {
        return doc.to_json().unwrap_or_else(|err| err.to_string());
    }
    if value.is::<Database>() {
        return DATABASE_TYPE.to_string();
    }
    value.to_string()
}
