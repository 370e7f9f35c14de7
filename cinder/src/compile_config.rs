use std::{
    fs,
    path::{Path, PathBuf},
};

use cinder_backends::{Backend, DatapackBackend};
use cinder_bound::BoundProgram;
use cinder_common::{CompilationId, CompileContext, Config};
use cinder_error::{CompileError, Result};
use cinder_vfs::Directory;
use log::{debug, info, warn};
use serde::Deserialize;

/// What happens if the output directory already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistMode {
    #[default]
    Fail,
    Overwrite,
}

/// The layout of a `cinder.toml` project file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProjectFile {
    project: Config,
}

#[derive(Debug)]
pub struct CompileConfig {
    pub compile_context: CompileContext,
}

impl CompileConfig {
    pub fn new(config: Config) -> Self {
        CompileConfig {
            compile_context: CompileContext::with_config(CompilationId(0), config),
        }
    }

    /// Reads the `[project]` table of a project file
    pub fn from_project_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|err| CompileError::io(path, err))?;
        Self::from_project_str(&contents)
    }

    pub fn from_project_str(contents: &str) -> Result<Self> {
        let file: ProjectFile =
            toml::from_str(contents).map_err(|err| CompileError::Config(err.to_string()))?;
        Ok(Self::new(file.project))
    }

    pub fn config(&self) -> &Config {
        &self.compile_context.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.compile_context.config
    }

    /// Decodes a bound program from its json representation
    pub fn load_program(path: &Path) -> Result<BoundProgram> {
        let contents = fs::read_to_string(path).map_err(|err| CompileError::io(path, err))?;
        debug!("Read {} bytes from {}", contents.len(), path.display());
        Self::parse_program(&contents)
    }

    pub fn parse_program(contents: &str) -> Result<BoundProgram> {
        serde_json::from_str(contents).map_err(|err| CompileError::Input(err.to_string()))
    }

    pub fn compile(&self, program: &BoundProgram) -> Result<Directory> {
        Ok(DatapackBackend.generate(program, &self.compile_context)?)
    }

    /// Writes the pack into `output_dir`, named after the project.
    /// Returns the path of the written pack.
    pub fn persist(&self, pack: &Directory, output_dir: &Path, mode: PersistMode) -> Result<PathBuf> {
        let name = self.config().project_name.as_str();
        let target = output_dir.join(name);

        if target.exists() {
            match mode {
                PersistMode::Fail => return Err(CompileError::OutputExists(target)),
                PersistMode::Overwrite => {
                    warn!("Overwriting existing directory {}", target.display());
                }
            }
        }

        pack.persist_clean(name, output_dir)
            .map_err(|err| CompileError::io(&target, err))?;
        info!("Wrote datapack to {}", target.display());
        Ok(target)
    }
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use cinder_common::BuildMode;
    use cinder_error::CompileError;

    use super::CompileConfig;

    #[test]
    fn test_project_file() {
        let config = CompileConfig::from_project_str(
            r#"
            [project]
            project_name = "Fancy Pack"
            build_mode = "debug"
            pack_format = 41
            "#,
        )
        .unwrap();
        let config = config.config();
        assert_eq!(config.project_name, "Fancy Pack");
        assert_eq!(config.build_mode, BuildMode::Debug);
        assert_eq!(config.pack_format, 41);
        assert_eq!(config.default_scoreboard_name, "cinder");
        assert_eq!(config.main_namespace(), "fancy_pack");
    }

    #[test]
    fn test_empty_project_file() {
        let config = CompileConfig::from_project_str("").unwrap();
        assert_eq!(config.config(), &cinder_common::Config::default());
    }

    #[test]
    fn test_invalid_project_file() {
        let error = CompileConfig::from_project_str("[project]\npack_format = \"new\"").unwrap_err();
        assert!(matches!(error, CompileError::Config(_)));
    }

    #[test]
    fn test_invalid_program() {
        let error = CompileConfig::parse_program("{ \"namespaces\": 3 }").unwrap_err();
        assert!(matches!(error, CompileError::Input(_)));
    }
}
