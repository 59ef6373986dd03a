//! User configuration.
//!
//! Griddle reads an optional `config.toml` from the platform config
//! directory (e.g. `~/.config/griddle/config.toml` on Linux). The file
//! can pre-select toolsets, fix the color mode, and pre-bind variables;
//! command-line flags always win over the config file.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Toolsets to generate when neither the CLI nor the recipe narrows
    /// the list. Must be a subset of what the recipe declares.
    #[serde(default)]
    pub default_toolsets: Vec<String>,

    /// Color mode: "auto" (default), "always", or "never".
    #[serde(default)]
    pub color: Option<String>,

    /// Variables bound at file scope before the recipe's own
    /// assignments run, as if passed with `--define`.
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
}

impl Config {
    /// Path of the user config file, if a home directory is known.
    pub fn path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "griddle").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load the user config, returning defaults when no file exists.
    pub fn load() -> Result<Self> {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Config::default()),
        }
    }

    /// Load a config file from an explicit path.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let content = r#"
default_toolsets = ["gnu"]
color = "never"

[vars]
BUILD_FLAVOR = "release"
"#;
        let config: Config = toml::from_str(content).unwrap();
        assert_eq!(config.default_toolsets, vec!["gnu"]);
        assert_eq!(config.color.as_deref(), Some("never"));
        assert_eq!(
            config.vars.get("BUILD_FLAVOR").map(String::as_str),
            Some("release")
        );
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.default_toolsets.is_empty());
        assert!(config.color.is_none());
        assert!(config.vars.is_empty());
    }

    #[test]
    fn test_load_from_missing_file_errors() {
        let path = PathBuf::from("/nonexistent/griddle/config.toml");
        assert!(Config::load_from(&path).is_err());
    }
}
