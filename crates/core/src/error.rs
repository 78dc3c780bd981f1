//! Error types for the virt-riscv platform

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Main error type for virt-riscv operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The toolchain archive could not be downloaded
    #[error("Failed to download {url}: {message}")]
    #[diagnostic(
        code(virt_riscv::provision::network),
        help("Check network connectivity; the archive will be fetched again on the next run")
    )]
    ProvisioningNetwork {
        /// Archive URL that was requested
        url: String,
        /// What went wrong
        message: String,
    },

    /// The toolchain archive could not be unpacked
    #[error("Failed to extract {}: {message}", archive.display())]
    #[diagnostic(
        code(virt_riscv::provision::extraction),
        help("Delete the archive to force a fresh download")
    )]
    ProvisioningExtraction {
        /// Archive that was being extracted
        archive: Box<Path>,
        /// What went wrong
        message: String,
    },

    /// A tool path was requested before the toolchain was provisioned
    #[error("Toolchain is not installed")]
    #[diagnostic(
        code(virt_riscv::toolchain::not_installed),
        help("Provision the toolchain before resolving tool paths")
    )]
    ToolchainNotInstalled,

    /// The requested board does not exist in the registry
    #[error("Board not found: {id}")]
    #[diagnostic(code(virt_riscv::board::not_found))]
    BoardNotFound {
        /// Board id that was looked up
        id: String,
    },

    /// A debug tool is missing from a board's `debug.tools` section
    #[error("Debug tool '{tool}' is not configured for board '{board}'")]
    #[diagnostic(
        code(virt_riscv::debug::tool_not_configured),
        help("Query the board through the platform so its debug tools are synthesized first")
    )]
    ToolNotConfigured {
        /// Board id
        board: String,
        /// Debug tool name
        tool: String,
    },

    /// A command template has no occurrence of the placeholder being bound
    #[error("Placeholder '{placeholder}' not found in arguments of '{tool}'")]
    #[diagnostic(
        code(virt_riscv::debug::placeholder_not_found),
        help("The template may already be bound to a program; re-query the board to reset it")
    )]
    PlaceholderNotFound {
        /// Debug tool name
        tool: String,
        /// Placeholder name
        placeholder: String,
    },

    /// A command template has more than one occurrence of the placeholder being bound
    #[error("Placeholder '{placeholder}' occurs {count} times in arguments of '{tool}'")]
    #[diagnostic(code(virt_riscv::debug::placeholder_ambiguous))]
    PlaceholderAmbiguous {
        /// Debug tool name
        tool: String,
        /// Placeholder name
        placeholder: String,
        /// Number of occurrences found
        count: usize,
    },

    /// A board manifest value has the wrong shape
    #[error("Invalid manifest for board '{board}': {message}")]
    #[diagnostic(code(virt_riscv::board::invalid_manifest))]
    InvalidManifest {
        /// Board id
        board: String,
        /// What is wrong with it
        message: String,
    },

    /// Configuration or validation error
    #[error("Configuration error: {message}")]
    #[diagnostic(code(virt_riscv::config))]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },

    /// I/O error with path context
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(virt_riscv::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "read", "write", "create")
        operation: String,
    },

    /// JSON error while reading a board manifest
    #[error("JSON error: {0}")]
    #[diagnostic(code(virt_riscv::json))]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a network error for an archive download
    #[must_use]
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProvisioningNetwork {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an extraction error for an archive
    #[must_use]
    pub fn extraction(archive: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::ProvisioningExtraction {
            archive: archive.as_ref().into(),
            message: message.into(),
        }
    }

    /// Create a board not found error
    #[must_use]
    pub fn board_not_found(id: impl Into<String>) -> Self {
        Self::BoardNotFound { id: id.into() }
    }

    /// Create a tool not configured error
    #[must_use]
    pub fn tool_not_configured(board: impl Into<String>, tool: impl Into<String>) -> Self {
        Self::ToolNotConfigured {
            board: board.into(),
            tool: tool.into(),
        }
    }

    /// Create an invalid manifest error
    #[must_use]
    pub fn invalid_manifest(board: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidManifest {
            board: board.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create an I/O error without path context
    #[must_use]
    pub fn io_no_path(source: std::io::Error, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: None,
            operation: operation.into(),
        }
    }
}

/// Result type alias for virt-riscv operations
pub type Result<T> = std::result::Result<T, Error>;
