//! Toolchain specification and the paths and URLs derived from it.
//!
//! Every name here is a pure function of the spec fields, so two equal
//! specs always agree on archive name, URL and install location.
//!
//! ```text
//! <cache_root>/
//! └── tool-xpack-<name>-<version>/
//!     ├── xpack-<name>-<version>-<host>.tar.gz
//!     └── xpack-<name>-<version>/
//!         └── bin/
//!             └── <name>
//! ```

use std::path::PathBuf;

use virt_riscv_core::config::{ToolchainConfig, default_cache_root};
use virt_riscv_core::Result;

use crate::platform::HostTag;

/// Default compiler package.
pub const DEFAULT_NAME: &str = "riscv-none-elf-gcc";
/// Default release version.
pub const DEFAULT_VERSION: &str = "12.2.0-3";
/// Default prefix of the cross tools.
pub const DEFAULT_TARGET_PREFIX: &str = "riscv-none-elf-";
/// Default host serving releases.
pub const DEFAULT_DOWNLOAD_HOST: &str = "github.com";
/// Default organisation publishing releases.
pub const DEFAULT_ORGANIZATION: &str = "xpack-dev-tools";

/// A versioned xPack toolchain and where it lives on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToolchainSpec {
    /// Compiler package name; also the compiler binary name.
    pub name: String,
    /// Release version.
    pub version: String,
    /// Host the archive is built for.
    pub host: HostTag,
    /// Directory holding installed packages.
    pub cache_root: PathBuf,
    /// Prefix prepended to generic tool names.
    pub target_prefix: String,
    /// Host serving release archives.
    pub download_host: String,
    /// Organisation publishing release archives.
    pub organization: String,
}

impl Default for ToolchainSpec {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            version: DEFAULT_VERSION.to_string(),
            host: HostTag::default(),
            cache_root: default_cache_root(),
            target_prefix: DEFAULT_TARGET_PREFIX.to_string(),
            download_host: DEFAULT_DOWNLOAD_HOST.to_string(),
            organization: DEFAULT_ORGANIZATION.to_string(),
        }
    }
}

impl ToolchainSpec {
    /// Create a spec with default prefix and download location.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        host: HostTag,
        cache_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            host,
            cache_root: cache_root.into(),
            ..Self::default()
        }
    }

    /// Build a spec from configuration, filling gaps with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`virt_riscv_core::Error::Configuration`] if the host tag is not supported.
    pub fn from_config(config: &ToolchainConfig) -> Result<Self> {
        let defaults = Self::default();
        let host = match &config.host {
            Some(tag) => tag.parse()?,
            None => defaults.host,
        };
        Ok(Self {
            name: config.name.clone().unwrap_or(defaults.name),
            version: config.version.clone().unwrap_or(defaults.version),
            host,
            cache_root: config.cache_root.clone().unwrap_or(defaults.cache_root),
            target_prefix: config
                .target_prefix
                .clone()
                .unwrap_or(defaults.target_prefix),
            download_host: config
                .download_host
                .clone()
                .unwrap_or(defaults.download_host),
            organization: config
                .organization
                .clone()
                .unwrap_or(defaults.organization),
        })
    }

    /// Set the tool prefix.
    #[must_use]
    pub fn with_target_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.target_prefix = prefix.into();
        self
    }

    /// Set the host serving release archives.
    #[must_use]
    pub fn with_download_host(mut self, host: impl Into<String>) -> Self {
        self.download_host = host.into();
        self
    }

    /// Archive file name, e.g. `xpack-riscv-none-elf-gcc-12.2.0-3-linux-x64.tar.gz`.
    #[must_use]
    pub fn archive_name(&self) -> String {
        format!("xpack-{}-{}-{}.tar.gz", self.name, self.version, self.host)
    }

    /// Release download URL.
    #[must_use]
    pub fn archive_url(&self) -> String {
        format!(
            "https://{}/{}/{}-xpack/releases/download/v{}/{}",
            self.download_host,
            self.organization,
            self.name,
            self.version,
            self.archive_name()
        )
    }

    /// Package directory name, e.g. `tool-xpack-riscv-none-elf-gcc-12.2.0-3`.
    #[must_use]
    pub fn package_name(&self) -> String {
        format!("tool-xpack-{}-{}", self.name, self.version)
    }

    /// Package directory inside the cache root.
    #[must_use]
    pub fn package_dir(&self) -> PathBuf {
        self.cache_root.join(self.package_name())
    }

    /// Where the downloaded archive is stored.
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.package_dir().join(self.archive_name())
    }

    /// Root of the extracted tree.
    #[must_use]
    pub fn extracted_root(&self) -> PathBuf {
        self.package_dir()
            .join(format!("xpack-{}-{}", self.name, self.version))
    }

    /// The extracted `bin` directory.
    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.extracted_root().join("bin")
    }

    /// The compiler binary whose presence marks a finished install.
    #[must_use]
    pub fn compiler_path(&self) -> PathBuf {
        self.bin_dir().join(&self.name)
    }
}
