#[cfg(debug_assertions)]
use std::panic::Location;
use std::fmt;

use cinder_common::StorageKind;

/// An invariant violation raised while emitting commands
///
/// Contains a more specific [`EmitErrorKind`] and the chain of symbols
/// that were being emitted when it happened (outermost last).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitError {
    pub kind: EmitErrorKind,
    pub context: Vec<String>,
    /// In debug mode stores the caller to provide additional
    /// debugging help
    #[cfg(debug_assertions)]
    caller: &'static Location<'static>,
}

impl EmitError {
    #[cfg(not(debug_assertions))]
    pub fn new(kind: EmitErrorKind) -> Self {
        EmitError {
            kind,
            context: Vec::new(),
        }
    }

    #[cfg(debug_assertions)]
    #[track_caller]
    pub fn new(kind: EmitErrorKind) -> Self {
        EmitError {
            kind,
            context: Vec::new(),
            caller: Location::caller(),
        }
    }

    /// Records the symbol that was being emitted
    pub fn within(mut self, symbol: impl Into<String>) -> Self {
        self.context.push(symbol.into());
        self
    }
}

impl From<EmitErrorKind> for EmitError {
    #[track_caller]
    fn from(kind: EmitErrorKind) -> Self {
        EmitError::new(kind)
    }
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for symbol in &self.context {
            write!(f, "\n  while emitting {symbol}")?;
        }
        #[cfg(debug_assertions)]
        write!(f, "\n  (raised at {})", self.caller)?;
        Ok(())
    }
}

impl std::error::Error for EmitError {}

/// Specifies a specific error reason
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmitErrorKind {
    #[error("'{symbol}' was expected in {expected} storage, but lives in {actual} storage")]
    StorageMismatch {
        symbol: String,
        expected: StorageKind,
        actual: StorageKind,
    },
    #[error("Expected a constant value for {what}")]
    ExpectedConstant { what: String },
    #[error("Operation '{operation}' is not supported for {operands}")]
    UnsupportedOperation { operation: String, operands: String },
    #[error("Goto to label '{label}' does not target an enclosing loop")]
    UnsupportedGoto { label: String },
    #[error("Function #{0} does not exist")]
    UnknownFunction(usize),
    #[error("Class #{0} does not exist")]
    UnknownClass(usize),
    #[error("Enum #{0} does not exist")]
    UnknownEnum(usize),
    #[error("Namespace #{0} does not exist")]
    UnknownNamespace(usize),
    #[error("'this' is not available outside of methods and constructors")]
    MissingReceiver,
    #[error("{expression} cannot be assigned to")]
    InvalidAssignmentTarget { expression: String },
    #[error("Builtin '{builtin}' got invalid arguments: {message}")]
    InvalidBuiltinArguments { builtin: String, message: String },
}
