//! Common items used by the compiler

mod compile_context;
pub use compile_context::{CompilationId, CompileContext};

mod config;
pub use config::{BuildMode, Config};

mod storage_kind;
pub use storage_kind::StorageKind;

use indexmap::IndexMap;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;
