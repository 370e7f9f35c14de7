use std::rc::Rc;

use cinder_common::Config;

use crate::common::{DataPath, DataTarget, FunctionIdent, ScoreboardPlayer};

/// Names the objective, the storage and the reserved locations of a compilation
#[derive(Debug, Clone)]
pub(crate) struct StorageContext {
    namespace: Rc<str>,
    objective: Rc<str>,
    storage: Rc<str>,
}

impl StorageContext {
    /// Holds the value of the last `return`, once per storage kind
    pub const RETURN: &'static str = "#return";
    /// Set while a `return` propagates out of fabricated sub-functions
    pub const RETURNED: &'static str = "#returned";
    /// The compound macro functions receive their arguments from
    pub const MACRO: &'static str = "#macro";
    /// Directory of the support functions inside the main namespace
    pub const GENERATED_PATH: &'static str = "__generated";

    pub fn new(config: &Config) -> Self {
        StorageContext {
            namespace: config.main_namespace().into(),
            objective: config.default_scoreboard_name.as_str().into(),
            storage: config.storage_id().into(),
        }
    }

    pub fn namespace(&self) -> &Rc<str> {
        &self.namespace
    }

    pub fn objective(&self) -> &Rc<str> {
        &self.objective
    }

    pub fn player(&self, name: impl Into<Rc<str>>) -> ScoreboardPlayer {
        ScoreboardPlayer {
            player: name.into(),
            scoreboard: self.objective.clone(),
        }
    }

    pub fn path(&self, path: impl Into<Rc<str>>) -> DataPath {
        DataPath {
            target: DataTarget::Storage(self.storage.clone()),
            path: path.into(),
        }
    }

    pub fn returned_flag(&self) -> ScoreboardPlayer {
        self.player(Self::RETURNED)
    }

    /// The register that macro functions write integer results to
    pub fn macro_register(&self) -> ScoreboardPlayer {
        self.player(Self::MACRO)
    }

    /// The compound passed to `function ... with`
    pub fn macro_arguments(&self) -> DataPath {
        self.path(Self::MACRO)
    }

    /// The path of a single macro argument
    pub fn macro_key(key: &str) -> String {
        format!("{}.{key}", Self::MACRO)
    }

    pub fn macro_path(&self, key: &str) -> DataPath {
        self.path(Self::macro_key(key))
    }

    pub fn generated_function(&self, name: &str) -> FunctionIdent {
        FunctionIdent::new(
            self.namespace.clone(),
            format!("{}/{name}", Self::GENERATED_PATH),
        )
    }
}
