use serde::Deserialize;

/// Controls how verbose the generated functions are.
///
/// Debug builds annotate the generated commands with comments and
/// separate statements with blank lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Debug,
    #[default]
    Release,
}

/// Project wide settings.
///
/// Can be read from the `[project]` table of a `cinder.toml` file,
/// every missing key falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project_name: String,
    pub project_description: String,
    pub author: Option<String>,
    /// The `pack_format` written into `pack.mcmeta`
    pub pack_format: u32,
    /// The objective every register variable lives on
    pub default_scoreboard_name: String,
    /// The storage id (without namespace) every tree variable lives in
    pub storage_name: String,
    pub build_mode: BuildMode,
}

impl Config {
    /// Pack formats starting with 45 use singular directory names (`function`, `tags/function`)
    pub const SINGULAR_DIRECTORIES_FORMAT: u32 = 45;

    /// The namespace that contains the generated support functions
    pub fn main_namespace(&self) -> String {
        self.project_name
            .chars()
            .map(|chr| match chr {
                'a'..='z' | '0'..='9' | '_' | '-' | '.' => chr,
                'A'..='Z' => chr.to_ascii_lowercase(),
                _ => '_',
            })
            .collect()
    }

    /// The fully qualified storage all tree variables live in, e.g. `cinder:vars`
    pub fn storage_id(&self) -> String {
        format!("{}:{}", self.main_namespace(), self.storage_name)
    }

    /// The name of the directory that contains functions
    pub fn function_directory(&self) -> &'static str {
        if self.pack_format >= Self::SINGULAR_DIRECTORIES_FORMAT {
            "function"
        } else {
            "functions"
        }
    }

    pub fn is_debug(&self) -> bool {
        self.build_mode == BuildMode::Debug
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            project_name: "cinder".to_string(),
            project_description: "A datapack compiled by cinder".to_string(),
            author: None,
            pack_format: 48,
            default_scoreboard_name: "cinder".to_string(),
            storage_name: "vars".to_string(),
            build_mode: BuildMode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BuildMode, Config};

    #[test]
    fn test_main_namespace() {
        let config = Config {
            project_name: "My Cool Pack!".to_string(),
            ..Default::default()
        };
        assert_eq!(config.main_namespace(), "my_cool_pack_");
        assert_eq!(config.storage_id(), "my_cool_pack_:vars");
    }

    #[test]
    fn test_function_directory() {
        let mut config = Config::default();
        assert_eq!(config.function_directory(), "function");
        config.pack_format = 26;
        assert_eq!(config.function_directory(), "functions");
    }

    #[test]
    fn test_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            project_name = "demo"
            build_mode = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.project_name, "demo");
        assert_eq!(config.build_mode, BuildMode::Debug);
        assert_eq!(config.pack_format, Config::default().pack_format);
    }
}
