//! `virt-riscv` command-line front end.

mod cli;
mod commands;
mod tracing;

use crate::cli::{Cli, Commands, parse};
use crate::tracing::init_tracing;
use virt_riscv::VirtRiscvPlatform;

fn main() -> miette::Result<()> {
    let cli = parse();
    init_tracing(cli.tracing_config())?;

    let output = run(cli)?;
    emit(&output);
    Ok(())
}

fn run(cli: Cli) -> miette::Result<String> {
    let config = commands::load_config(cli.config.as_deref())?;
    let mut platform = VirtRiscvPlatform::from_config(&config)?;

    match cli.command {
        Commands::Provision => commands::provision(&mut platform),
        Commands::ToolPath { tool } => commands::tool_path(&mut platform, &tool),
        Commands::Boards { dir, id, json } => {
            commands::boards(&platform, &dir, id.as_deref(), json)
        }
        Commands::Debug {
            dir,
            program,
            board,
        } => commands::debug(&platform, &dir, &program, board.as_deref()),
        Commands::Flags { dir, board, json } => commands::flags(&dir, &board, json),
    }
}

#[allow(clippy::print_stdout)]
fn emit(output: &str) {
    if output.ends_with('\n') {
        print!("{output}");
    } else {
        println!("{output}");
    }
}
