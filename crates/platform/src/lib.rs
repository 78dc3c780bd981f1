//! RISC-V virtual target platform.
//!
//! [`VirtRiscvPlatform`] wires the xPack toolchain provisioner and the QEMU
//! and Spike debug backends behind the [`DevPlatform`] capability trait.
//! [`BareFrameworkFlags`] supplies the machine and link flags for builds
//! that use no framework layer.

mod framework;
mod platform;

pub use framework::BareFrameworkFlags;
pub use platform::{DEFAULT_DEBUG_BOARD, DebugSessionConfig, DevPlatform, VirtRiscvPlatform};
