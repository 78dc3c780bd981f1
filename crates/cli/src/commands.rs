//! Subcommand handlers. Each returns the text to print on stdout.

use miette::IntoDiagnostic;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{info, instrument};
use virt_riscv::{BareFrameworkFlags, DebugSessionConfig, DevPlatform, VirtRiscvPlatform};
use virt_riscv_core::{BoardDescriptor, BoardRegistry, Config};

/// Load `path` if given, otherwise `virt-riscv.toml` in the current directory.
pub fn load_config(path: Option<&Path>) -> miette::Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::discover(&std::env::current_dir().into_diagnostic()?)?,
    };
    Ok(config)
}

#[instrument(skip(platform))]
pub fn provision(platform: &mut VirtRiscvPlatform) -> miette::Result<String> {
    let toolchain = platform.ensure_default_packages()?;
    info!(bin_dir = ?toolchain.bin_dir(), "Toolchain ready");
    Ok(toolchain.compiler_path().display().to_string())
}

#[instrument(skip(platform))]
pub fn tool_path(platform: &mut VirtRiscvPlatform, tool: &str) -> miette::Result<String> {
    platform.ensure_default_packages()?;
    Ok(platform.tool_path(tool)?.display().to_string())
}

#[instrument(skip(platform))]
pub fn boards(
    platform: &VirtRiscvPlatform,
    dir: &Path,
    id: Option<&str>,
    json: bool,
) -> miette::Result<String> {
    let mut registry = BoardRegistry::load_dir(dir)?;
    let boards = match id {
        Some(id) => vec![platform.board(&mut registry, id)?],
        None => platform.boards(&mut registry)?,
    };

    if json {
        let manifests: serde_json::Map<String, serde_json::Value> = boards
            .into_iter()
            .map(|board| (board.id().to_string(), board.clone().into_value()))
            .collect();
        return serde_json::to_string_pretty(&manifests).into_diagnostic();
    }

    let mut out = String::new();
    for board in boards {
        let _ = writeln!(out, "{}: {}", board.id(), board.debug_tool_names().join(", "));
    }
    Ok(out)
}

#[instrument(skip(platform))]
pub fn debug(
    platform: &VirtRiscvPlatform,
    dir: &Path,
    program: &Path,
    board: Option<&str>,
) -> miette::Result<String> {
    let mut registry = BoardRegistry::load_dir(dir)?;
    platform.boards(&mut registry)?;

    let mut session = DebugSessionConfig::new(program);
    if let Some(board) = board {
        session = session.with_board(board);
    }
    platform.configure_debug_session(&mut registry, &session)?;

    let id = board.unwrap_or_else(|| platform.debug_board());
    render_tools(registry.require(id)?)
}

fn render_tools(board: &BoardDescriptor) -> miette::Result<String> {
    let mut out = String::new();
    for name in board.debug_tool_names() {
        let Some(tool) = board.debug_tool(&name)? else {
            continue;
        };
        let _ = writeln!(
            out,
            "{name}: {} {}",
            tool.server.executable,
            tool.server.arguments.to_tokens().join(" ")
        );
    }
    Ok(out)
}

#[instrument]
pub fn flags(dir: &Path, board: &str, json: bool) -> miette::Result<String> {
    let registry = BoardRegistry::load_dir(dir)?;
    let flags = BareFrameworkFlags::for_board(registry.require(board)?)?;
    if json {
        return serde_json::to_string_pretty(&flags).into_diagnostic();
    }

    let mut out = String::new();
    for (name, values) in [
        ("ASFLAGS", &flags.as_flags),
        ("ASPPFLAGS", &flags.aspp_flags),
        ("CCFLAGS", &flags.cc_flags),
        ("LINKFLAGS", &flags.link_flags),
        ("LIBS", &flags.libs),
    ] {
        let _ = writeln!(out, "{name}={}", values.join(" "));
    }
    Ok(out)
}
