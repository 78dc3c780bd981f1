//! xPack cross-toolchain provider for virt-riscv.
//!
//! This crate provides functionality to:
//! - Derive archive names, URLs and install paths from a [`ToolchainSpec`]
//! - Download and unpack the toolchain into a package cache on demand
//! - Resolve generic tool names (`gcc`, `gdb`, ...) to prefixed binaries
//!
//! # Example
//!
//! ```ignore
//! use virt_riscv_tools_xpack::{ToolchainProvisioner, ToolchainSpec};
//!
//! let provisioner = ToolchainProvisioner::http()?;
//! let toolchain = provisioner.ensure(&ToolchainSpec::default())?;
//!
//! // ~/.platformio/packages/tool-xpack-.../bin/riscv-none-elf-objcopy
//! let objcopy = toolchain.tool_path("objcopy");
//! ```

mod download;
mod extract;
mod platform;
mod provision;
mod resolver;
mod spec;

pub use download::{
    CHUNK_SIZE, DownloadProgress, Downloader, HttpDownloader, NoProgress, Phase, TracingProgress,
    copy_chunked,
};
pub use extract::{Extractor, TarCommandExtractor, TarGzExtractor};
pub use platform::HostTag;
pub use provision::{CacheState, InstalledToolchain, ToolchainProvisioner};
pub use resolver::ToolPathResolver;
pub use spec::{
    DEFAULT_DOWNLOAD_HOST, DEFAULT_NAME, DEFAULT_ORGANIZATION, DEFAULT_TARGET_PREFIX,
    DEFAULT_VERSION, ToolchainSpec,
};
