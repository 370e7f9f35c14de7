//! Compilation error handling
//!
//! The backend only ever sees clean, fully bound programs, so every [`EmitError`]
//! is an internal invariant violation. [`CompileError`] wraps it together with the
//! failures of the surrounding driver (input decoding, configuration, file system).
use std::{io, path::PathBuf};

pub use emit_error::{EmitError, EmitErrorKind};

mod emit_error;
mod macros;
pub mod utils;

/// The result type used by the driver
pub type Result<T> = std::result::Result<T, CompileError>;

/// The result type used by the backend
pub type EmitResult<T> = std::result::Result<T, EmitError>;

/// Any error that aborts a compilation
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Compiler Error: {0}")]
    Emit(#[from] EmitError),
    #[error("Could not read the bound program: {0}")]
    Input(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("The output directory '{}' already exists", .0.display())]
    OutputExists(PathBuf),
    #[error("Could not access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CompileError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CompileError::Io {
            path: path.into(),
            source,
        }
    }
}
