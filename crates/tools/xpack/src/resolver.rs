//! Mapping generic tool names to binaries of an installed toolchain.

use std::path::{Path, PathBuf};
use tracing::trace;

/// Resolves `gcc`, `gdb`, `objcopy`, ... to `<bin_dir>/<target_prefix><tool>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPathResolver {
    bin_dir: PathBuf,
    target_prefix: String,
}

impl ToolPathResolver {
    /// Create a resolver for a toolchain `bin` directory.
    #[must_use]
    pub fn new(bin_dir: impl Into<PathBuf>, target_prefix: impl Into<String>) -> Self {
        Self {
            bin_dir: bin_dir.into(),
            target_prefix: target_prefix.into(),
        }
    }

    /// The toolchain `bin` directory.
    #[must_use]
    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// The prefix prepended to tool names.
    #[must_use]
    pub fn target_prefix(&self) -> &str {
        &self.target_prefix
    }

    /// Path of the prefixed binary for `tool`. Does not touch the filesystem.
    #[must_use]
    pub fn resolve(&self, tool: &str) -> PathBuf {
        let path = self.bin_dir.join(format!("{}{tool}", self.target_prefix));
        trace!(%tool, ?path, "Resolved tool path");
        path
    }
}
