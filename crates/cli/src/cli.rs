use crate::tracing::{LogLevel, TracingConfig, TracingFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "virt-riscv")]
#[command(about = "Provision the xPack RISC-V toolchain and configure QEMU/Spike debug sessions")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'l',
        long = "log-level",
        visible_alias = "level",
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(
        long,
        global = true,
        help = "Tracing filter directive, e.g. virt_riscv_tools_xpack=trace (overrides --log-level and RUST_LOG)"
    )]
    pub log_filter: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,

    #[arg(
        short = 'c',
        long,
        global = true,
        env = "VIRT_RISCV_CONFIG",
        help = "Configuration file (default: virt-riscv.toml in the current directory)"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Download and unpack the toolchain if it is not installed")]
    Provision,
    #[command(about = "Print the path of a toolchain binary, provisioning first")]
    ToolPath {
        #[arg(help = "Generic tool name, e.g. gcc, gdb, objcopy")]
        tool: String,
    },
    #[command(about = "List boards with their synthesized debug tools")]
    Boards {
        #[arg(long, short = 'd', help = "Directory of board manifests (*.json)")]
        dir: PathBuf,
        #[arg(long, help = "Show only this board")]
        id: Option<String>,
        #[arg(long, help = "Print the augmented manifests as JSON")]
        json: bool,
    },
    #[command(about = "Bind a program into a board's simulator debug tools")]
    Debug {
        #[arg(long, short = 'd', help = "Directory of board manifests (*.json)")]
        dir: PathBuf,
        #[arg(long, short = 'p', help = "Firmware image to debug")]
        program: PathBuf,
        #[arg(long, short = 'b', help = "Board to debug (default from configuration)")]
        board: Option<String>,
    },
    #[command(about = "Print bare-metal compiler and linker flags for a board")]
    Flags {
        #[arg(long, short = 'd', help = "Directory of board manifests (*.json)")]
        dir: PathBuf,
        #[arg(long, short = 'b', help = "Board id")]
        board: String,
        #[arg(long, help = "Print the flag sets as JSON")]
        json: bool,
    },
}

impl Cli {
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig {
            format: self.log_format,
            level: self.level.into(),
            filter: self.log_filter.clone(),
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
