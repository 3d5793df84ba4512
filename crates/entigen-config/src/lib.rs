//! `entigen.toml` loading.
//!
//! ```toml
//! [synthesis]
//! root = "game::EntityBase"
//! max_depth = 32
//! runtime_path = "::entigen::runtime"
//!
//! [output]
//! dir = "src/generated"
//! file_per_entity = true
//! ```

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// Default file name looked up by the CLI.
pub const CONFIG_FILE: &str = "entigen.toml";

/// Default bound on ancestor-chain length.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default path of the runtime contract used by generated code.
pub const DEFAULT_RUNTIME_PATH: &str = "::entigen::runtime";

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

///
/// Config
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub synthesis: SynthesisConfig,
    pub output: OutputConfig,
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.synthesis.validate()?;

        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    /// Load `path` when it exists, defaults otherwise.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

///
/// SynthesisConfig
/// engine options for one synthesis invocation
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SynthesisConfig {
    /// Path of the designated base sentinel; chains stop at (and include) it.
    pub root: Option<String>,

    /// Upper bound on ancestor-chain length.
    pub max_depth: usize,

    /// Path of the runtime module referenced by generated code.
    pub runtime_path: String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            root: None,
            max_depth: DEFAULT_MAX_DEPTH,
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
        }
    }
}

impl SynthesisConfig {
    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid {
                key: "max_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.runtime_path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "runtime_path",
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

///
/// OutputConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub file_per_entity: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("generated"),
            file_per_entity: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.synthesis.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.synthesis.runtime_path, DEFAULT_RUNTIME_PATH);
    }

    #[test]
    fn parses_all_sections() {
        let config = Config::from_toml_str(
            r#"
            [synthesis]
            root = "game::EntityBase"
            max_depth = 8

            [output]
            dir = "src/generated"
            file_per_entity = true
            "#,
        )
        .unwrap();

        assert_eq!(config.synthesis.root.as_deref(), Some("game::EntityBase"));
        assert_eq!(config.synthesis.max_depth, 8);
        assert_eq!(config.output.dir, PathBuf::from("src/generated"));
        assert!(config.output.file_per_entity);
    }

    #[test]
    fn rejects_zero_depth_and_unknown_keys() {
        let err = Config::from_toml_str("[synthesis]\nmax_depth = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "max_depth", .. }));

        let err = Config::from_toml_str("[synthesis]\ndepth = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load_or_default("does/not/exist/entigen.toml").unwrap();
        assert_eq!(config, Config::default());
    }
}
