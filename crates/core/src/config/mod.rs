//! Configuration types for virt-riscv
//!
//! Read from `virt-riscv.toml`. Every field is optional; consumers apply
//! their own defaults so a missing file and an empty file behave the same.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{Error, Result};

/// File name looked up by [`Config::discover`].
pub const CONFIG_FILE_NAME: &str = "virt-riscv.toml";

/// Main configuration structure for virt-riscv
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Cross-compiler toolchain settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<ToolchainConfig>,

    /// Debug backend settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugSettings>,
}

/// Toolchain configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ToolchainConfig {
    /// Compiler package name (e.g. "riscv-none-elf-gcc")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Release version (e.g. "12.2.0-3")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// xPack host tag (e.g. "linux-x64")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Prefix prepended to generic tool names (e.g. "riscv-none-elf-")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_prefix: Option<String>,

    /// Directory holding installed packages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_root: Option<PathBuf>,

    /// Host serving release archives
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_host: Option<String>,

    /// Organisation publishing release archives
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
}

/// Debug backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DebugSettings {
    /// Board whose simulator templates are bound when a session starts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,

    /// Extra directories mounted into simulator containers at the same path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_dirs: Option<Vec<PathBuf>>,
}

impl Config {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for invalid TOML or mistyped fields.
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::configuration(e.to_string()))
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or
    /// [`Error::Configuration`] if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io(e, path, "read"))?;
        let config = Self::parse(&contents)?;
        debug!(?path, "Loaded configuration");
        Ok(config)
    }

    /// Load `virt-riscv.toml` from `dir`, or return defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be loaded.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::load(&path)
        } else {
            debug!(?path, "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Toolchain section, or an empty one.
    #[must_use]
    pub fn toolchain(&self) -> ToolchainConfig {
        self.toolchain.clone().unwrap_or_default()
    }

    /// Workspace directories to mount into simulator containers.
    #[must_use]
    pub fn workspace_dirs(&self) -> Vec<PathBuf> {
        self.debug
            .as_ref()
            .and_then(|d| d.workspace_dirs.clone())
            .unwrap_or_default()
    }

    /// Board used for debug sessions, if configured.
    #[must_use]
    pub fn debug_board(&self) -> Option<&str> {
        self.debug.as_ref().and_then(|d| d.board.as_deref())
    }
}

/// Get the default package cache root, `~/.platformio/packages`.
#[must_use]
pub fn default_cache_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".platformio")
        .join("packages")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.toolchain.is_none());
        assert!(config.debug.is_none());
        assert!(config.workspace_dirs().is_empty());
        assert!(config.debug_board().is_none());
    }

    #[test]
    fn test_config_parse_full() {
        let config = Config::parse(
            r#"
            [toolchain]
            name = "riscv-none-elf-gcc"
            version = "13.2.0-2"
            host = "darwin-arm64"
            targetPrefix = "riscv-none-elf-"
            cacheRoot = "/opt/packages"

            [debug]
            board = "spike-hifive1"
            workspaceDirs = ["/work"]
            "#,
        )
        .unwrap();

        let toolchain = config.toolchain();
        assert_eq!(toolchain.version.as_deref(), Some("13.2.0-2"));
        assert_eq!(toolchain.host.as_deref(), Some("darwin-arm64"));
        assert_eq!(toolchain.cache_root, Some(PathBuf::from("/opt/packages")));
        assert!(toolchain.download_host.is_none());
        assert_eq!(config.debug_board(), Some("spike-hifive1"));
        assert_eq!(config.workspace_dirs(), vec![PathBuf::from("/work")]);
    }

    #[test]
    fn test_config_parse_empty() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_config_parse_invalid() {
        let err = Config::parse("[toolchain]\nversion = 12").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_config_skip_none_fields() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_discover_missing_file() {
        let temp = TempDir::new().unwrap();
        assert_eq!(Config::discover(temp.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_discover_reads_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            "[toolchain]\nversion = \"12.3.0-1\"\n",
        )
        .unwrap();
        let config = Config::discover(temp.path()).unwrap();
        assert_eq!(config.toolchain().version.as_deref(), Some("12.3.0-1"));
    }

    #[test]
    fn test_default_cache_root() {
        assert!(default_cache_root().ends_with(".platformio/packages"));
    }
}
