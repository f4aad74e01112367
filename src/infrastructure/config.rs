//! Configuration loading from `codereptile.toml`.
//!
//! ## Example
//!
//! ```toml
//! [parse]
//! clang = "clang++-17"
//! std = "c++20"
//! extra-args = ["-Iinclude", "-DNDEBUG"]
//! extensions = ["cpp", "cc"]
//! extra-std-filters = ["third_party/"]
//!
//! [view]
//! scale = 0.9
//! width = 1920
//! height = 1080
//! curve-steps = 32
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::language::Language;
use crate::domain::scaler::Scaler;

pub const CONFIG_FILE_NAME: &str = "codereptile.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Front-end settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseConfig {
    pub clang: String,
    pub std: String,
    pub extra_args: Vec<String>,
    /// Source extensions treated as translation units.
    pub extensions: Vec<String>,
    /// Path fragments added to the standard-header filter.
    pub extra_std_filters: Vec<String>,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            clang: "clang++".to_string(),
            std: "c++17".to_string(),
            extra_args: Vec::new(),
            extensions: Language::Cpp.extensions().iter().map(|e| e.to_string()).collect(),
            extra_std_filters: Vec::new(),
        }
    }
}

/// Viewport and drawing settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    pub scale: f64,
    pub width: i32,
    pub height: i32,
    pub curve_steps: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            width: 1600,
            height: 900,
            curve_steps: 20,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// File this config was read from, if any.
    pub source: Option<PathBuf>,
    pub parse: ParseConfig,
    pub view: ViewConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
struct RawConfig {
    parse: Option<RawParse>,
    view: Option<RawView>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
struct RawParse {
    clang: Option<String>,
    std: Option<String>,
    extra_args: Option<Vec<String>>,
    extensions: Option<Vec<String>>,
    extra_std_filters: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
struct RawView {
    scale: Option<f64>,
    width: Option<i32>,
    height: Option<i32>,
    curve_steps: Option<usize>,
}

impl Config {
    /// `codereptile.toml` in `directory`, or defaults when there is none.
    pub fn load(directory: &Path) -> Result<Self, ConfigError> {
        let path = directory.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content, path)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_raw(raw);
        config.validate(path)?;
        Ok(config)
    }

    fn from_raw(raw: RawConfig) -> Self {
        let mut parse = ParseConfig::default();
        if let Some(p) = raw.parse {
            if let Some(clang) = p.clang {
                parse.clang = clang;
            }
            if let Some(std) = p.std {
                parse.std = std;
            }
            if let Some(args) = p.extra_args {
                parse.extra_args = args;
            }
            if let Some(exts) = p.extensions {
                parse.extensions = exts
                    .into_iter()
                    .map(|e| e.trim_start_matches('.').to_string())
                    .collect();
            }
            if let Some(filters) = p.extra_std_filters {
                parse.extra_std_filters = filters;
            }
        }

        let mut view = ViewConfig::default();
        if let Some(v) = raw.view {
            view.scale = v.scale.unwrap_or(view.scale);
            view.width = v.width.unwrap_or(view.width);
            view.height = v.height.unwrap_or(view.height);
            view.curve_steps = v.curve_steps.unwrap_or(view.curve_steps);
        }

        Self {
            source: None,
            parse,
            view,
        }
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };
        if !Scaler::is_valid_scale(self.view.scale) {
            return Err(invalid("view.scale must be positive and at most 100"));
        }
        if self.view.width <= 0 || self.view.height <= 0 {
            return Err(invalid("view.width and view.height must be positive"));
        }
        if self.parse.extensions.is_empty() {
            return Err(invalid("parse.extensions must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.parse.std, "c++17");
        assert_eq!(config.view.curve_steps, 20);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[parse]\nstd = \"c++20\"\nextensions = [\".cpp\", \"cc\"]\n\n[view]\nscale = 0.5\n",
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.parse.std, "c++20");
        assert_eq!(config.parse.clang, "clang++");
        assert_eq!(config.parse.extensions, vec!["cpp", "cc"]);
        assert_eq!(config.view.scale, 0.5);
        assert_eq!(config.view.width, 1600);
        assert!(config.source.is_some());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = Config::from_toml_str("[view]\nscale = 0.0\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = Config::from_toml_str("[view]\nscale = 1e8\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = Config::from_toml_str("[view\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
