//! Backend implementations for the cinder compiler
//!
//! A [`Backend`] consumes a [`BoundProgram`] and produces a [`Directory`].
//!
//! The module [common] defines useful items that are specific to minecraft.

use cinder_bound::BoundProgram;
use cinder_common::CompileContext;
use cinder_error::EmitResult;
use cinder_vfs::Directory;

pub mod common;
mod datapack;
pub use datapack::DatapackBackend;

/// A Backend for cinder, which has to convert a bound program into a `Directory`
pub trait Backend {
    /// Converts the program into a directory
    ///
    /// # Errors
    /// Fails if the program violates an invariant the backend relies on
    fn generate(&self, program: &BoundProgram, ctx: &CompileContext) -> EmitResult<Directory>;
}
