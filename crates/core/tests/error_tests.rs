//! Tests for error types

use miette::Diagnostic;
use std::path::Path;
use virt_riscv_core::Error;

#[test]
fn test_network_error() {
    let error = Error::network("https://example.com/a.tar.gz", "HTTP 404 Not Found");
    assert_eq!(
        error.to_string(),
        "Failed to download https://example.com/a.tar.gz: HTTP 404 Not Found"
    );
    assert_eq!(
        error.code().map(|c| c.to_string()),
        Some("virt_riscv::provision::network".to_string())
    );
}

#[test]
fn test_extraction_error() {
    let error = Error::extraction(Path::new("/cache/a.tar.gz"), "unexpected end of file");
    assert_eq!(
        error.to_string(),
        "Failed to extract /cache/a.tar.gz: unexpected end of file"
    );
    assert!(error.help().is_some());
}

#[test]
fn test_toolchain_not_installed_error() {
    let error = Error::ToolchainNotInstalled;
    assert_eq!(error.to_string(), "Toolchain is not installed");
    assert!(error.help().is_some());
}

#[test]
fn test_board_and_tool_errors() {
    assert_eq!(
        Error::board_not_found("spike-hifive1").to_string(),
        "Board not found: spike-hifive1"
    );
    assert_eq!(
        Error::tool_not_configured("spike-hifive1", "vcd_spike").to_string(),
        "Debug tool 'vcd_spike' is not configured for board 'spike-hifive1'"
    );
}

#[test]
fn test_placeholder_errors() {
    let error = Error::PlaceholderNotFound {
        tool: "spike".into(),
        placeholder: "ELF_FILE".into(),
    };
    assert_eq!(
        error.to_string(),
        "Placeholder 'ELF_FILE' not found in arguments of 'spike'"
    );

    let error = Error::PlaceholderAmbiguous {
        tool: "spike".into(),
        placeholder: "ELF_FILE".into(),
        count: 2,
    };
    assert_eq!(
        error.to_string(),
        "Placeholder 'ELF_FILE' occurs 2 times in arguments of 'spike'"
    );
}

#[test]
fn test_io_error_with_and_without_path() {
    let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let error = Error::io(source, "/tmp/x", "read");
    assert_eq!(error.to_string(), "I/O read failed: /tmp/x");

    let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let error = Error::io_no_path(source, "create");
    assert_eq!(error.to_string(), "I/O create failed");
}

#[test]
fn test_json_error_from() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: Error = json_err.into();
    assert!(error.to_string().starts_with("JSON error:"));
}
