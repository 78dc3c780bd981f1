//! Compiler and linker flags for bare-metal builds without a framework layer.

use serde::Serialize;
use virt_riscv_core::{BoardDescriptor, Error, Result};

/// Flags a bare-metal build passes to the cross toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BareFrameworkFlags {
    /// `-march`, `-mabi` and `-mcmodel` for the board.
    pub machine: Vec<String>,
    /// Assembler flags.
    pub as_flags: Vec<String>,
    /// Flags for preprocessed assembly.
    pub aspp_flags: Vec<String>,
    /// C and C++ compiler flags.
    pub cc_flags: Vec<String>,
    /// Linker flags.
    pub link_flags: Vec<String>,
    /// Libraries to link.
    pub libs: Vec<String>,
}

impl BareFrameworkFlags {
    /// Derive the flag sets from the board's `build` section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidManifest`] if `build.march`, `build.mabi` or
    /// `build.mcmodel` is missing or not a string.
    pub fn for_board(board: &BoardDescriptor) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            let path = format!("build.{key}");
            board
                .get_str(&path)?
                .map(|v| format!("-{key}={v}"))
                .ok_or_else(|| Error::invalid_manifest(board.id(), format!("missing '{path}'")))
        };
        let machine = vec![required("march")?, required("mabi")?, required("mcmodel")?];

        Ok(Self {
            as_flags: machine.clone(),
            aspp_flags: strings(&["-x", "assembler-with-cpp"]),
            cc_flags: with(&machine, &["-Os", "-Wall"]),
            link_flags: with(
                &machine,
                &[
                    "-Os",
                    "-ffunction-sections",
                    "-fdata-sections",
                    "-nostartfiles",
                    "--specs=nano.specs",
                    "-Wl,--gc-sections",
                ],
            ),
            libs: strings(&["c"]),
            machine,
        })
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn with(machine: &[String], extra: &[&str]) -> Vec<String> {
    machine.iter().cloned().chain(strings(extra)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hifive1() -> BoardDescriptor {
        BoardDescriptor::from_value(
            "spike-hifive1",
            json!({"build": {"march": "rv32imac", "mabi": "ilp32", "mcmodel": "medlow"}}),
        )
        .unwrap()
    }

    #[test]
    fn test_machine_flags() {
        let flags = BareFrameworkFlags::for_board(&hifive1()).unwrap();
        assert_eq!(
            flags.machine,
            vec!["-march=rv32imac", "-mabi=ilp32", "-mcmodel=medlow"]
        );
        assert_eq!(flags.as_flags, flags.machine);
    }

    #[test]
    fn test_compile_and_link_flags() {
        let flags = BareFrameworkFlags::for_board(&hifive1()).unwrap();
        assert_eq!(&flags.cc_flags[3..], &["-Os", "-Wall"]);
        assert_eq!(flags.link_flags.len(), 9);
        assert_eq!(flags.link_flags.last().unwrap(), "-Wl,--gc-sections");
        assert_eq!(flags.aspp_flags, vec!["-x", "assembler-with-cpp"]);
        assert_eq!(flags.libs, vec!["c"]);
    }

    #[test]
    fn test_missing_mcmodel() {
        let board = BoardDescriptor::from_value(
            "partial",
            json!({"build": {"march": "rv32imac", "mabi": "ilp32"}}),
        )
        .unwrap();
        let err = BareFrameworkFlags::for_board(&board).unwrap_err();
        assert!(err.to_string().contains("build.mcmodel"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(BareFrameworkFlags::for_board(&hifive1()).unwrap()).unwrap();
        assert!(value.get("ccFlags").is_some());
        assert!(value.get("linkFlags").is_some());
    }
}
