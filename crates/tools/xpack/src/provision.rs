//! Convergent toolchain installation.
//!
//! [`ToolchainProvisioner::ensure`] moves the cache from whatever state it
//! is in to [`CacheState::Installed`]. Each step is skipped when its output
//! already exists, so a second call on an installed toolchain does no
//! network or extraction work.
//!
//! The download step is gated on both the archive and the compiler: a cache
//! holding an extracted toolchain but no archive counts as installed and is
//! never re-downloaded. Gating on the archive alone would fetch it again
//! only to skip extraction.
//!
//! Provisioning takes no locks. Two processes provisioning the same cache
//! root at once can race on directory creation and extraction; callers must
//! serialize.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use virt_riscv_core::{Error, Result};

use crate::download::{DownloadProgress, Downloader, HttpDownloader, Phase, TracingProgress};
use crate::extract::{Extractor, TarGzExtractor};
use crate::resolver::ToolPathResolver;
use crate::spec::ToolchainSpec;

/// Installation state derived from the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Neither archive nor compiler is present.
    Missing,
    /// The archive is downloaded but not extracted.
    ArchiveOnly,
    /// The compiler binary exists.
    Installed,
}

impl CacheState {
    /// Inspect the cache for `spec`.
    #[must_use]
    pub fn of(spec: &ToolchainSpec) -> Self {
        if spec.compiler_path().exists() {
            Self::Installed
        } else if spec.archive_path().exists() {
            Self::ArchiveOnly
        } else {
            Self::Missing
        }
    }
}

/// A provisioned toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledToolchain {
    compiler: PathBuf,
    resolver: ToolPathResolver,
}

impl InstalledToolchain {
    /// Path of the compiler binary.
    #[must_use]
    pub fn compiler_path(&self) -> &Path {
        &self.compiler
    }

    /// The toolchain `bin` directory.
    #[must_use]
    pub fn bin_dir(&self) -> &Path {
        self.resolver.bin_dir()
    }

    /// Resolver for the other tools in this toolchain.
    #[must_use]
    pub fn resolver(&self) -> &ToolPathResolver {
        &self.resolver
    }

    /// Path of the prefixed binary for `tool`.
    #[must_use]
    pub fn tool_path(&self, tool: &str) -> PathBuf {
        self.resolver.resolve(tool)
    }
}

/// Downloads and unpacks xPack toolchains into a package cache.
pub struct ToolchainProvisioner {
    downloader: Box<dyn Downloader>,
    extractor: Box<dyn Extractor>,
    progress: Box<dyn DownloadProgress>,
}

impl std::fmt::Debug for ToolchainProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolchainProvisioner").finish_non_exhaustive()
    }
}

impl ToolchainProvisioner {
    /// Create a provisioner from its collaborators.
    #[must_use]
    pub fn new(downloader: Box<dyn Downloader>, extractor: Box<dyn Extractor>) -> Self {
        Self {
            downloader,
            extractor,
            progress: Box::new(TracingProgress),
        }
    }

    /// HTTP downloads with in-process extraction.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn http() -> Result<Self> {
        Ok(Self::new(
            Box::new(HttpDownloader::new()?),
            Box::new(TarGzExtractor),
        ))
    }

    /// Report progress to `progress` instead of `tracing`.
    #[must_use]
    pub fn with_progress(mut self, progress: Box<dyn DownloadProgress>) -> Self {
        self.progress = progress;
        self
    }

    /// Ensure the toolchain described by `spec` is installed.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`] if the package directory cannot be created
    /// - [`Error::ProvisioningNetwork`] if the archive cannot be downloaded
    /// - [`Error::ProvisioningExtraction`] if the archive cannot be unpacked or
    ///   does not contain the compiler
    pub fn ensure(&self, spec: &ToolchainSpec) -> Result<InstalledToolchain> {
        let package_dir = spec.package_dir();
        let archive = spec.archive_path();
        let compiler = spec.compiler_path();
        debug!(state = ?CacheState::of(spec), ?package_dir, "Provisioning toolchain");

        if !package_dir.exists() {
            self.progress.on_phase(Phase::CreatingCache);
            std::fs::create_dir_all(&package_dir)
                .map_err(|e| Error::io(e, &package_dir, "create"))?;
        }

        if !archive.exists() && !compiler.exists() {
            self.progress.on_phase(Phase::Downloading);
            let url = spec.archive_url();
            info!(%url, "Toolchain archive missing, downloading");
            if let Err(e) = self.downloader.download(&url, &archive, self.progress.as_ref()) {
                remove_partial(&archive);
                return Err(e);
            }
        }

        if compiler.exists() {
            debug!(?compiler, "Toolchain already installed");
        } else {
            self.progress.on_phase(Phase::Extracting);
            info!(?archive, "Compiler not found, extracting");
            self.extractor.extract(&archive, &package_dir)?;
            if !compiler.exists() {
                return Err(Error::extraction(
                    &archive,
                    format!("archive did not contain {}", compiler.display()),
                ));
            }
        }

        self.progress.on_phase(Phase::Installed);
        info!(compiler = ?compiler, "Toolchain installed");
        Ok(InstalledToolchain {
            compiler,
            resolver: ToolPathResolver::new(spec.bin_dir(), spec.target_prefix.clone()),
        })
    }
}

fn remove_partial(archive: &Path) {
    if archive.exists() {
        if let Err(e) = std::fs::remove_file(archive) {
            warn!(?archive, error = %e, "Failed to remove partial download");
        }
    }
}
