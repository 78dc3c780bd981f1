//! Provisioning tests against an in-memory "server".

use flate2::Compression;
use flate2::write::GzEncoder;
use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;
use tempfile::TempDir;
use virt_riscv_core::Error;
use virt_riscv_tools_xpack::{
    CacheState, DownloadProgress, Downloader, Extractor, HostTag, Phase, TarGzExtractor,
    ToolchainProvisioner, ToolchainSpec,
};

const VERSION: &str = "12.2.0-3";

/// Serves a fixed body and counts requests.
struct FakeDownloader {
    body: Vec<u8>,
    calls: Rc<Cell<usize>>,
    urls: Rc<RefCell<Vec<String>>>,
    fail_after_partial: bool,
}

impl FakeDownloader {
    fn serving(body: Vec<u8>) -> (Self, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let fake = Self {
            body,
            calls: Rc::clone(&calls),
            urls: Rc::default(),
            fail_after_partial: false,
        };
        (fake, calls)
    }
}

impl Downloader for FakeDownloader {
    fn download(
        &self,
        url: &str,
        dest: &Path,
        progress: &dyn DownloadProgress,
    ) -> virt_riscv_core::Result<u64> {
        self.calls.set(self.calls.get() + 1);
        self.urls.borrow_mut().push(url.to_string());
        if self.fail_after_partial {
            std::fs::write(dest, &self.body[..self.body.len() / 2])
                .map_err(|e| Error::io(e, dest, "write"))?;
            return Err(Error::network(url, "connection reset"));
        }
        std::fs::write(dest, &self.body).map_err(|e| Error::io(e, dest, "write"))?;
        let total = self.body.len() as u64;
        progress.on_progress(total, total);
        Ok(total)
    }
}

/// Wraps the real extractor and counts invocations.
struct CountingExtractor {
    calls: Rc<Cell<usize>>,
}

impl Extractor for CountingExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> virt_riscv_core::Result<()> {
        self.calls.set(self.calls.get() + 1);
        TarGzExtractor.extract(archive, dest)
    }
}

#[derive(Default)]
struct PhaseRecorder {
    phases: Rc<RefCell<Vec<Phase>>>,
}

impl DownloadProgress for PhaseRecorder {
    fn on_progress(&self, _bytes_downloaded: u64, _total_bytes: u64) {}

    fn on_phase(&self, phase: Phase) {
        self.phases.borrow_mut().push(phase);
    }
}

fn spec(root: &Path) -> ToolchainSpec {
    ToolchainSpec::new("riscv-none-elf-gcc", VERSION, HostTag::LinuxX64, root)
}

/// A release archive laid out like the real xPack tarball.
fn toolchain_tarball(files: &[&str]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for name in files {
        let content = b"#!/bin/sh\nexit 0\n";
        let mut header = tar::Header::new_gnu();
        header
            .set_path(format!("xpack-riscv-none-elf-gcc-{VERSION}/bin/{name}"))
            .unwrap();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append(&header, &content[..]).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

fn full_tarball() -> Vec<u8> {
    toolchain_tarball(&["riscv-none-elf-gcc", "riscv-none-elf-gdb"])
}

#[test]
fn test_fresh_install() {
    let temp = TempDir::new().unwrap();
    let spec = spec(temp.path());
    let (downloader, downloads) = FakeDownloader::serving(full_tarball());
    let urls = Rc::clone(&downloader.urls);
    let provisioner = ToolchainProvisioner::new(Box::new(downloader), Box::new(TarGzExtractor));

    assert_eq!(CacheState::of(&spec), CacheState::Missing);
    let installed = provisioner.ensure(&spec).unwrap();

    assert_eq!(CacheState::of(&spec), CacheState::Installed);
    assert_eq!(downloads.get(), 1);
    assert_eq!(urls.borrow().as_slice(), &[spec.archive_url()]);
    assert_eq!(installed.compiler_path(), spec.compiler_path());
    assert_eq!(installed.bin_dir(), spec.bin_dir());
    assert!(spec.archive_path().exists());
    assert_eq!(
        installed.tool_path("gdb"),
        spec.bin_dir().join("riscv-none-elf-gdb")
    );
    assert!(installed.tool_path("gdb").exists());
}

#[test]
fn test_second_ensure_does_no_work() {
    let temp = TempDir::new().unwrap();
    let spec = spec(temp.path());
    let (downloader, downloads) = FakeDownloader::serving(full_tarball());
    let extractions = Rc::new(Cell::new(0));
    let provisioner = ToolchainProvisioner::new(
        Box::new(downloader),
        Box::new(CountingExtractor {
            calls: Rc::clone(&extractions),
        }),
    );

    let first = provisioner.ensure(&spec).unwrap();
    let second = provisioner.ensure(&spec).unwrap();

    assert_eq!(first, second);
    assert_eq!(downloads.get(), 1);
    assert_eq!(extractions.get(), 1);
}

#[test]
fn test_installed_without_archive_skips_download() {
    let temp = TempDir::new().unwrap();
    let spec = spec(temp.path());
    let (downloader, downloads) = FakeDownloader::serving(full_tarball());
    let provisioner = ToolchainProvisioner::new(Box::new(downloader), Box::new(TarGzExtractor));

    provisioner.ensure(&spec).unwrap();
    std::fs::remove_file(spec.archive_path()).unwrap();
    provisioner.ensure(&spec).unwrap();

    assert_eq!(downloads.get(), 1);
}

#[test]
fn test_archive_only_extracts_without_download() {
    let temp = TempDir::new().unwrap();
    let spec = spec(temp.path());
    std::fs::create_dir_all(spec.package_dir()).unwrap();
    std::fs::write(spec.archive_path(), full_tarball()).unwrap();
    assert_eq!(CacheState::of(&spec), CacheState::ArchiveOnly);

    let (downloader, downloads) = FakeDownloader::serving(Vec::new());
    let provisioner = ToolchainProvisioner::new(Box::new(downloader), Box::new(TarGzExtractor));
    provisioner.ensure(&spec).unwrap();

    assert_eq!(downloads.get(), 0);
    assert_eq!(CacheState::of(&spec), CacheState::Installed);
}

#[test]
fn test_failed_download_removes_partial_archive() {
    let temp = TempDir::new().unwrap();
    let spec = spec(temp.path());
    let (mut downloader, _) = FakeDownloader::serving(full_tarball());
    downloader.fail_after_partial = true;
    let provisioner = ToolchainProvisioner::new(Box::new(downloader), Box::new(TarGzExtractor));

    let err = provisioner.ensure(&spec).unwrap_err();

    assert!(matches!(err, Error::ProvisioningNetwork { .. }));
    assert!(spec.package_dir().exists());
    assert!(!spec.archive_path().exists());
    assert_eq!(CacheState::of(&spec), CacheState::Missing);
}

#[test]
fn test_corrupt_archive_is_extraction_error() {
    let temp = TempDir::new().unwrap();
    let spec = spec(temp.path());
    let (downloader, _) = FakeDownloader::serving(b"<html>rate limited</html>".to_vec());
    let provisioner = ToolchainProvisioner::new(Box::new(downloader), Box::new(TarGzExtractor));

    let err = provisioner.ensure(&spec).unwrap_err();

    assert!(matches!(err, Error::ProvisioningExtraction { .. }));
    assert_eq!(CacheState::of(&spec), CacheState::ArchiveOnly);
}

#[test]
fn test_archive_without_compiler_is_extraction_error() {
    let temp = TempDir::new().unwrap();
    let spec = spec(temp.path());
    let (downloader, _) = FakeDownloader::serving(toolchain_tarball(&["riscv-none-elf-gdb"]));
    let provisioner = ToolchainProvisioner::new(Box::new(downloader), Box::new(TarGzExtractor));

    let err = provisioner.ensure(&spec).unwrap_err();

    assert!(err.to_string().contains("archive did not contain"));
}

#[test]
fn test_phases_reported_in_order() {
    let temp = TempDir::new().unwrap();
    let spec = spec(temp.path());
    let (downloader, _) = FakeDownloader::serving(full_tarball());
    let recorder = PhaseRecorder::default();
    let phases = Rc::clone(&recorder.phases);
    let provisioner = ToolchainProvisioner::new(Box::new(downloader), Box::new(TarGzExtractor))
        .with_progress(Box::new(recorder));

    provisioner.ensure(&spec).unwrap();
    assert_eq!(
        phases.borrow().as_slice(),
        &[
            Phase::CreatingCache,
            Phase::Downloading,
            Phase::Extracting,
            Phase::Installed
        ]
    );

    phases.borrow_mut().clear();
    provisioner.ensure(&spec).unwrap();
    assert_eq!(phases.borrow().as_slice(), &[Phase::Installed]);
}
