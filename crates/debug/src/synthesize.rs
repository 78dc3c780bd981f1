//! Debug tool synthesis for boards.
//!
//! Every board gets three debug servers:
//!
//! - `qemu`: the `sifive_e` machine model, halted and waiting for GDB on port 42123
//! - `spike`: the Spike simulator in a throwaway container, GDB on port 3333
//! - `vcd_spike`: a Spike fork that also writes a VCD waveform log
//!
//! Existing entries for other tools are kept. Entries for these three are
//! replaced wholesale on every call, so edits made to them between calls
//! are lost.

use std::path::PathBuf;
use tracing::{debug, trace};
use virt_riscv_core::{BoardDescriptor, CommandTemplate, DebugTool, ELF_FILE, Error, Result};

/// Emulator tool name.
pub const QEMU: &str = "qemu";
/// Plain simulator tool name.
pub const SPIKE: &str = "spike";
/// Waveform-logging simulator tool name.
pub const VCD_SPIKE: &str = "vcd_spike";

/// Package providing the QEMU binaries.
pub const QEMU_PACKAGE: &str = "tool-qemu-riscv";
/// Container runtime used for the simulators.
pub const CONTAINER_RUNTIME: &str = "docker";
/// Image for the plain simulator.
pub const SPIKE_IMAGE: &str = "fiveembeddev/riscv_spike_debug_sim:latest";
/// Image for the waveform-logging simulator.
pub const VCD_SPIKE_IMAGE: &str = "fiveembeddev/forked_riscv_spike_debug_sim:latest";
/// Flag enabling the waveform log.
pub const VCD_LOG_FLAG: &str = "--vcd-log=test.vcd";

const QEMU_BASE_ARGS: [&str; 10] = [
    "-nographic",
    // Instruction-count clock, not synced to realtime.
    "-icount",
    "shift=1,align=off",
    "-machine",
    "sifive_e",
    "-d",
    "unimp,guest_errors",
    "-gdb",
    "tcp::42123",
    "-S",
];

const CONTAINER_RUN_ARGS: [&str; 4] = ["run", "-p", "3333:3333", "--rm"];

/// The two containerised simulator flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatorVariant {
    /// `spike`
    Plain,
    /// `vcd_spike`
    Waveform,
}

impl SimulatorVariant {
    /// Both variants, in synthesis order.
    pub const ALL: [Self; 2] = [Self::Plain, Self::Waveform];

    /// Debug tool name.
    #[must_use]
    pub const fn tool_name(self) -> &'static str {
        match self {
            Self::Plain => SPIKE,
            Self::Waveform => VCD_SPIKE,
        }
    }

    /// Container image.
    #[must_use]
    pub const fn image(self) -> &'static str {
        match self {
            Self::Plain => SPIKE_IMAGE,
            Self::Waveform => VCD_SPIKE_IMAGE,
        }
    }
}

/// Adds the managed debug tools to board descriptors.
#[derive(Debug, Clone, Default)]
pub struct DebugConfigSynthesizer {
    workspace_dirs: Vec<PathBuf>,
}

impl DebugConfigSynthesizer {
    /// Create a synthesizer that mounts `workspace_dirs` into simulator containers.
    #[must_use]
    pub fn new(workspace_dirs: Vec<PathBuf>) -> Self {
        Self { workspace_dirs }
    }

    /// Write the `qemu`, `spike` and `vcd_spike` entries into `board`.
    ///
    /// All three entries are built before any is written, so an invalid
    /// manifest leaves the board untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidManifest`] when `build.mabi` is missing, an
    /// option list is not a list of strings, or `debug` / `debug.tools` is
    /// not an object.
    pub fn augment(&self, board: &mut BoardDescriptor) -> Result<()> {
        let qemu = Self::qemu_tool(board)?;
        let simulators = SimulatorVariant::ALL
            .into_iter()
            .map(|variant| Ok((variant.tool_name(), self.simulator_tool(board, variant)?)))
            .collect::<Result<Vec<_>>>()?;

        if let Some(protocols) = board.get_str_list("upload.protocols")? {
            trace!(board = board.id(), ?protocols, "Upload protocols");
        }

        board.set_debug_tool(QEMU, &qemu)?;
        for (name, tool) in &simulators {
            board.set_debug_tool(name, tool)?;
        }

        debug!(board = board.id(), tools = ?board.debug_tool_names(), "Synthesized debug tools");
        Ok(())
    }

    /// The QEMU entry for `board`.
    ///
    /// Uses `qemu-system-riscv64` when the board ABI mentions 64, otherwise
    /// `qemu-system-riscv32`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidManifest`] when `build.mabi` is missing or
    /// `debug.qemu_options` is not a list of strings.
    pub fn qemu_tool(board: &BoardDescriptor) -> Result<DebugTool> {
        let mabi = board
            .get_str("build.mabi")?
            .ok_or_else(|| Error::invalid_manifest(board.id(), "missing 'build.mabi'"))?;
        let bits = if mabi.contains("64") { "64" } else { "32" };
        let extra = board.get_str_list("debug.qemu_options")?.unwrap_or_default();

        let arguments = CommandTemplate::new()
            .literals(QEMU_BASE_ARGS)
            .literals(extra);
        Ok(DebugTool::packaged(
            QEMU_PACKAGE,
            format!("bin/qemu-system-riscv{bits}"),
            arguments,
        ))
    }

    /// The containerised Spike entry for `board`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidManifest`] when `debug.spike_options` is not a
    /// list of strings.
    pub fn simulator_tool(
        &self,
        board: &BoardDescriptor,
        variant: SimulatorVariant,
    ) -> Result<DebugTool> {
        let extra = board.get_str_list("debug.spike_options")?.unwrap_or_default();
        let waveform = match variant {
            SimulatorVariant::Plain => None,
            SimulatorVariant::Waveform => Some(VCD_LOG_FLAG),
        };

        let arguments = CommandTemplate::new()
            .literals(CONTAINER_RUN_ARGS)
            .literals(self.volume_args())
            .literals([variant.image()])
            .literals(waveform)
            .literals(extra)
            .placeholder(ELF_FILE);
        Ok(DebugTool::external(CONTAINER_RUNTIME, arguments))
    }

    /// `-v` mounts: the project at `/project`, then each workspace dir at its own path.
    fn volume_args(&self) -> Vec<String> {
        let mut args = vec!["-v".to_string(), ".:/project".to_string()];
        for dir in &self.workspace_dirs {
            let dir = dir.display();
            args.push("-v".to_string());
            args.push(format!("{dir}:{dir}"));
        }
        args
    }
}
