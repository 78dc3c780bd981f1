//! Core types and error handling for the virt-riscv platform.
//!
//! - [`BoardDescriptor`] / [`BoardRegistry`] - board manifests and the handle that owns them
//! - [`DebugTool`] / [`CommandTemplate`] - debug server invocations with named placeholders
//! - [`Config`] - `virt-riscv.toml` settings
//! - [`Error`] - the error type shared by every virt-riscv crate

pub mod board;
pub mod config;
pub mod error;
pub mod registry;
pub mod template;

pub use board::{BoardDescriptor, DebugServer, DebugTool};
pub use config::{Config, DebugSettings, ToolchainConfig};
pub use error::{Error, Result};
pub use registry::BoardRegistry;
pub use template::{CommandTemplate, ELF_FILE, PlaceholderMatch, TemplateArg};
