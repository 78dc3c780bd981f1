//! Archive extraction into the package directory.

use flate2::read::GzDecoder;
use std::fs::File;
use std::path::Path;
use std::process::Command;
use tar::Archive;
use tracing::debug;
use virt_riscv_core::{Error, Result};

/// Unpacks a downloaded archive.
pub trait Extractor {
    /// Unpack `archive` so its top-level entries land inside `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProvisioningExtraction`] when the archive cannot be
    /// read or unpacked.
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()>;
}

/// In-process `.tar.gz` extraction.
#[derive(Debug, Default, Clone, Copy)]
pub struct TarGzExtractor;

impl Extractor for TarGzExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        debug!(?archive, ?dest, "Extracting archive");
        let file = File::open(archive).map_err(|e| Error::extraction(archive, e.to_string()))?;
        let mut tar = Archive::new(GzDecoder::new(file));
        tar.set_preserve_permissions(true);
        tar.unpack(dest)
            .map_err(|e| Error::extraction(archive, e.to_string()))
    }
}

/// Extraction through the system `tar` binary.
///
/// `tar` runs with `dest` as its working directory; the caller's working
/// directory is never changed.
#[derive(Debug, Clone)]
pub struct TarCommandExtractor {
    program: String,
}

impl Default for TarCommandExtractor {
    fn default() -> Self {
        Self {
            program: "tar".to_string(),
        }
    }
}

impl TarCommandExtractor {
    /// Use a specific `tar` executable.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Extractor for TarCommandExtractor {
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        // The child runs inside `dest`, so a relative archive path would no longer resolve.
        let archive_arg = std::path::absolute(archive)
            .map_err(|e| Error::extraction(archive, format!("cannot resolve path: {e}")))?;
        debug!(program = %self.program, archive = ?archive_arg, ?dest, "Running tar");
        let output = Command::new(&self.program)
            .arg("xzf")
            .arg(&archive_arg)
            .current_dir(dest)
            .output()
            .map_err(|e| Error::extraction(archive, format!("failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::extraction(
                archive,
                format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::path::PathBuf;
    use tar::Builder;
    use tempfile::TempDir;

    fn create_test_tarball(dir: &Path, files: &[(&str, &[u8])]) -> PathBuf {
        let tarball_path = dir.join("test.tar.gz");
        let file = File::create(&tarball_path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = Builder::new(encoder);

        for (path, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_path(path).unwrap();
            header.set_size(content.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append(&header, &content[..]).unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap();
        tarball_path
    }

    #[test]
    fn test_tar_gz_extractor() {
        let temp = TempDir::new().unwrap();
        let archive = create_test_tarball(temp.path(), &[("pkg/bin/tool", b"#!/bin/sh\n")]);
        let dest = temp.path().join("out");
        std::fs::create_dir(&dest).unwrap();

        TarGzExtractor.extract(&archive, &dest).unwrap();

        assert_eq!(
            std::fs::read(dest.join("pkg/bin/tool")).unwrap(),
            b"#!/bin/sh\n"
        );
    }

    #[test]
    fn test_tar_gz_extractor_corrupt_archive() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("broken.tar.gz");
        std::fs::write(&archive, b"definitely not gzip").unwrap();

        let err = TarGzExtractor.extract(&archive, temp.path()).unwrap_err();
        assert!(matches!(err, Error::ProvisioningExtraction { .. }));
    }

    #[test]
    fn test_tar_gz_extractor_missing_archive() {
        let temp = TempDir::new().unwrap();
        let err = TarGzExtractor
            .extract(&temp.path().join("missing.tar.gz"), temp.path())
            .unwrap_err();
        assert!(matches!(err, Error::ProvisioningExtraction { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_tar_command_extractor_keeps_cwd() {
        let temp = TempDir::new().unwrap();
        let archive = create_test_tarball(temp.path(), &[("pkg/file.txt", b"hello")]);
        let dest = temp.path().join("out");
        std::fs::create_dir(&dest).unwrap();
        let before = std::env::current_dir().unwrap();

        TarCommandExtractor::default().extract(&archive, &dest).unwrap();

        assert_eq!(std::env::current_dir().unwrap(), before);
        assert_eq!(std::fs::read(dest.join("pkg/file.txt")).unwrap(), b"hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_tar_command_extractor_relative_paths() {
        let temp = tempfile::Builder::new().tempdir_in(".").unwrap();
        let name = temp.path().file_name().unwrap();
        let dest = Path::new(".").join(name).join("pkg");
        std::fs::create_dir(&dest).unwrap();
        let archive = create_test_tarball(&dest, &[("xpack/bin/gcc", b"#!/bin/sh\n")]);
        assert!(archive.is_relative());

        TarCommandExtractor::default().extract(&archive, &dest).unwrap();

        assert!(dest.join("xpack/bin/gcc").exists());
    }

    #[test]
    fn test_tar_command_extractor_missing_program() {
        let temp = TempDir::new().unwrap();
        let archive = create_test_tarball(temp.path(), &[("f", b"x")]);
        let err = TarCommandExtractor::with_program("definitely-not-a-tar-binary")
            .extract(&archive, temp.path())
            .unwrap_err();
        assert!(err.to_string().contains("definitely-not-a-tar-binary"));
    }
}
