//! Debug backends for virt-riscv boards.
//!
//! [`DebugConfigSynthesizer`] adds QEMU and containerised Spike entries to a
//! board's `debug.tools` section. [`DebugSessionBinder`] later fills the
//! program path into the Spike argument lists once the firmware is built.

mod bind;
mod synthesize;

pub use bind::DebugSessionBinder;
pub use synthesize::{
    CONTAINER_RUNTIME, DebugConfigSynthesizer, QEMU, QEMU_PACKAGE, SPIKE, SPIKE_IMAGE,
    SimulatorVariant, VCD_LOG_FLAG, VCD_SPIKE, VCD_SPIKE_IMAGE,
};
