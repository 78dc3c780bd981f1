//! Binding a program to a board's simulator debug tools.

use std::path::Path;
use tracing::{debug, info};
use virt_riscv_core::{BoardRegistry, DebugTool, ELF_FILE, Error, PlaceholderMatch, Result};

use crate::synthesize::SimulatorVariant;

/// Substitutes the program path into the `spike` and `vcd_spike` argument lists.
///
/// Each simulator template must contain exactly one `ELF_FILE` placeholder.
/// Binding replaces it with the program path, so a bound board has to be
/// re-augmented before it can be bound to a different program.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugSessionBinder;

impl DebugSessionBinder {
    /// Bind `program` to the simulator tools of `board_id` in `registry`.
    ///
    /// Both tools are validated before either is modified; on error the
    /// registry is unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::BoardNotFound`] if `board_id` is not registered
    /// - [`Error::ToolNotConfigured`] if a simulator tool is missing
    /// - [`Error::PlaceholderNotFound`] if a template has no `ELF_FILE` slot
    /// - [`Error::PlaceholderAmbiguous`] if a template has more than one
    /// - [`Error::Configuration`] if `program` is not valid UTF-8
    pub fn bind(
        &self,
        registry: &mut BoardRegistry,
        board_id: &str,
        program: &Path,
    ) -> Result<()> {
        let program = program.to_str().ok_or_else(|| {
            Error::configuration(format!(
                "program path is not valid UTF-8: {}",
                program.display()
            ))
        })?;

        let board = registry.require(board_id)?;
        let mut bound: Vec<(&str, DebugTool, usize)> = Vec::new();
        for variant in SimulatorVariant::ALL {
            let name = variant.tool_name();
            let tool = board
                .debug_tool(name)?
                .ok_or_else(|| Error::tool_not_configured(board_id, name))?;
            let index = match tool.server.arguments.find(ELF_FILE) {
                PlaceholderMatch::Unique(index) => index,
                PlaceholderMatch::Missing => {
                    return Err(Error::PlaceholderNotFound {
                        tool: name.to_string(),
                        placeholder: ELF_FILE.to_string(),
                    });
                }
                PlaceholderMatch::Duplicated(count) => {
                    return Err(Error::PlaceholderAmbiguous {
                        tool: name.to_string(),
                        placeholder: ELF_FILE.to_string(),
                        count,
                    });
                }
            };
            bound.push((name, tool, index));
        }

        let board = registry.require_mut(board_id)?;
        for (name, mut tool, index) in bound {
            tool.server.arguments.set_literal(index, program);
            board.set_debug_tool(name, &tool)?;
            debug!(board = board_id, tool = name, index, "Bound program");
        }
        info!(board = board_id, %program, "Debug session configured");
        Ok(())
    }
}
