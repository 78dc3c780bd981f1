//! Host platform tags used in xPack release archive names.
//!
//! xPack names its archives after the machine the toolchain runs on:
//! `linux-x64`, `linux-arm64`, `darwin-x64`, `darwin-arm64`.

use std::fmt;
use std::str::FromStr;

use virt_riscv_core::Error;

/// Host a toolchain archive is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostTag {
    /// Linux on x86_64.
    LinuxX64,
    /// Linux on aarch64.
    LinuxArm64,
    /// macOS on x86_64.
    DarwinX64,
    /// macOS on Apple silicon.
    DarwinArm64,
}

impl HostTag {
    /// Get the tag for the machine this crate was compiled for.
    ///
    /// Returns `None` on hosts xPack does not publish archives for.
    #[must_use]
    pub fn current() -> Option<Self> {
        Self::from_parts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Build a tag from an OS and architecture name, accepting common aliases.
    #[must_use]
    pub fn from_parts(os: &str, arch: &str) -> Option<Self> {
        let os = match os.to_lowercase().as_str() {
            "linux" => "linux",
            "darwin" | "macos" | "osx" => "darwin",
            _ => return None,
        };
        let arch = match arch.to_lowercase().as_str() {
            "x64" | "x86_64" | "amd64" => "x64",
            "arm64" | "aarch64" => "arm64",
            _ => return None,
        };
        match (os, arch) {
            ("linux", "x64") => Some(Self::LinuxX64),
            ("linux", "arm64") => Some(Self::LinuxArm64),
            ("darwin", "x64") => Some(Self::DarwinX64),
            ("darwin", "arm64") => Some(Self::DarwinArm64),
            _ => None,
        }
    }

    /// The tag as it appears in archive names.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LinuxX64 => "linux-x64",
            Self::LinuxArm64 => "linux-arm64",
            Self::DarwinX64 => "darwin-x64",
            Self::DarwinArm64 => "darwin-arm64",
        }
    }
}

impl Default for HostTag {
    /// The running host, or `linux-x64` when it has no xPack build.
    fn default() -> Self {
        Self::current().unwrap_or(Self::LinuxX64)
    }
}

impl fmt::Display for HostTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_once('-')
            .and_then(|(os, arch)| Self::from_parts(os, arch))
            .ok_or_else(|| Error::configuration(format!("Unsupported host tag: {s}")))
    }
}
