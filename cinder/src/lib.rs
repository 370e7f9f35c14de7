//! The cinder compiler driver.
//!
//! Cinder turns a bound program into a minecraft datapack. Binding and type checking
//! happen upstream, the program arrives either as a [`BoundProgram`](cinder_bound::BoundProgram)
//! value or as its json representation.
//!
//! [cinder_bound] defines the program representation.
//!
//! The [cinder_backends] crate contains backend implementations that convert a program
//! into files. Right now, the only backend implementation creates datapacks.
//!
//! [`CompileConfig`] ties both together:
//! load a program, compile it and persist the resulting [`Directory`](cinder_vfs::Directory).

pub use cinder_backends as backends;
pub use cinder_bound as bound;
pub use cinder_common as common;
pub use cinder_error as error;
pub use cinder_vfs as vfs;

mod compile_config;
pub use compile_config::{CompileConfig, PersistMode};
