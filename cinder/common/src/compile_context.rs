use crate::Config;

/// The id of the current compilation unit.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Ord, PartialOrd, Hash, Default)]
pub struct CompilationId(pub u32);

/// The Compilation context stores various information about the current compilation
#[derive(Debug, Default)]
pub struct CompileContext {
    pub compilation_id: CompilationId,
    /// The current config which specifies how to compile
    pub config: Config,
}

impl CompileContext {
    pub fn new(compilation_id: CompilationId) -> Self {
        CompileContext {
            compilation_id,
            config: Config::default(),
        }
    }

    pub fn with_config(compilation_id: CompilationId, config: Config) -> Self {
        CompileContext {
            compilation_id,
            config,
        }
    }

    /// The namespace that owns generated support functions, derived from the project name
    pub fn main_namespace(&self) -> String {
        self.config.main_namespace()
    }
}
