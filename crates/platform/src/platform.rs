//! The composed RISC-V virtual target platform.

use std::path::PathBuf;
use tracing::{debug, instrument};
use virt_riscv_core::{BoardDescriptor, BoardRegistry, Config, Error, Result};
use virt_riscv_debug::{DebugConfigSynthesizer, DebugSessionBinder};
use virt_riscv_tools_xpack::{InstalledToolchain, ToolchainProvisioner, ToolchainSpec};

/// Board debugged when neither the session nor the configuration names one.
pub const DEFAULT_DEBUG_BOARD: &str = "spike-hifive1";

/// What a host build system needs from a development platform.
pub trait DevPlatform {
    /// Make sure the default toolchain is installed and remember where.
    ///
    /// # Errors
    ///
    /// Returns provisioning errors from download or extraction.
    fn ensure_default_packages(&mut self) -> Result<&InstalledToolchain>;

    /// Absolute path of the prefixed binary for `tool`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolchainNotInstalled`] before
    /// [`ensure_default_packages`](Self::ensure_default_packages) has succeeded.
    fn tool_path(&self, tool: &str) -> Result<PathBuf>;

    /// Look up one board, augmenting its debug section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BoardNotFound`] or a manifest error.
    fn board<'r>(
        &self,
        registry: &'r mut BoardRegistry,
        id: &str,
    ) -> Result<&'r BoardDescriptor>;

    /// Augment and return every board in `registry`.
    ///
    /// # Errors
    ///
    /// Returns the first manifest error encountered.
    fn boards<'r>(&self, registry: &'r mut BoardRegistry) -> Result<Vec<&'r BoardDescriptor>>;

    /// Bind the session's program into the board's simulator tools.
    ///
    /// # Errors
    ///
    /// Returns binding errors; the registry is unchanged on error.
    fn configure_debug_session(
        &self,
        registry: &mut BoardRegistry,
        session: &DebugSessionConfig,
    ) -> Result<()>;
}

/// A debug session about to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugSessionConfig {
    /// The firmware image to load.
    pub program_path: PathBuf,
    /// Board to debug; the platform default when `None`.
    pub board: Option<String>,
}

impl DebugSessionConfig {
    /// A session for `program_path` on the default board.
    #[must_use]
    pub fn new(program_path: impl Into<PathBuf>) -> Self {
        Self {
            program_path: program_path.into(),
            board: None,
        }
    }

    /// Debug on `board` instead of the default.
    #[must_use]
    pub fn with_board(mut self, board: impl Into<String>) -> Self {
        self.board = Some(board.into());
        self
    }
}

/// xPack toolchain plus QEMU and Spike debug backends.
#[derive(Debug)]
pub struct VirtRiscvPlatform {
    spec: ToolchainSpec,
    provisioner: ToolchainProvisioner,
    synthesizer: DebugConfigSynthesizer,
    binder: DebugSessionBinder,
    debug_board: String,
    installed: Option<InstalledToolchain>,
}

impl VirtRiscvPlatform {
    /// Assemble a platform from its parts.
    #[must_use]
    pub fn new(
        spec: ToolchainSpec,
        provisioner: ToolchainProvisioner,
        synthesizer: DebugConfigSynthesizer,
    ) -> Self {
        Self {
            spec,
            provisioner,
            synthesizer,
            binder: DebugSessionBinder,
            debug_board: DEFAULT_DEBUG_BOARD.to_string(),
            installed: None,
        }
    }

    /// Build the platform described by `config`, downloading over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for an invalid host tag, or an error
    /// if the HTTP client cannot be created.
    pub fn from_config(config: &Config) -> Result<Self> {
        let spec = ToolchainSpec::from_config(&config.toolchain())?;
        let platform = Self::new(
            spec,
            ToolchainProvisioner::http()?,
            DebugConfigSynthesizer::new(config.workspace_dirs()),
        );
        Ok(match config.debug_board() {
            Some(board) => platform.with_debug_board(board),
            None => platform,
        })
    }

    /// Use `board` for sessions that do not name one.
    #[must_use]
    pub fn with_debug_board(mut self, board: impl Into<String>) -> Self {
        self.debug_board = board.into();
        self
    }

    /// The toolchain this platform provisions.
    #[must_use]
    pub fn spec(&self) -> &ToolchainSpec {
        &self.spec
    }

    /// The default debug board.
    #[must_use]
    pub fn debug_board(&self) -> &str {
        &self.debug_board
    }

    /// The provisioned toolchain, if any.
    #[must_use]
    pub fn installed(&self) -> Option<&InstalledToolchain> {
        self.installed.as_ref()
    }
}

impl DevPlatform for VirtRiscvPlatform {
    #[instrument(skip(self), fields(version = %self.spec.version))]
    fn ensure_default_packages(&mut self) -> Result<&InstalledToolchain> {
        let installed = self.provisioner.ensure(&self.spec)?;
        Ok(self.installed.insert(installed))
    }

    fn tool_path(&self, tool: &str) -> Result<PathBuf> {
        self.installed
            .as_ref()
            .map(|toolchain| toolchain.tool_path(tool))
            .ok_or(Error::ToolchainNotInstalled)
    }

    fn board<'r>(
        &self,
        registry: &'r mut BoardRegistry,
        id: &str,
    ) -> Result<&'r BoardDescriptor> {
        let board = registry.require_mut(id)?;
        self.synthesizer.augment(board)?;
        Ok(board)
    }

    fn boards<'r>(&self, registry: &'r mut BoardRegistry) -> Result<Vec<&'r BoardDescriptor>> {
        for board in registry.iter_mut() {
            self.synthesizer.augment(board)?;
        }
        debug!(count = registry.len(), "Augmented boards");
        Ok(registry.iter().collect())
    }

    fn configure_debug_session(
        &self,
        registry: &mut BoardRegistry,
        session: &DebugSessionConfig,
    ) -> Result<()> {
        let board = session.board.as_deref().unwrap_or(&self.debug_board);
        self.binder.bind(registry, board, &session.program_path)
    }
}
