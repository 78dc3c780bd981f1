//! Streamed archive downloads.
//!
//! Downloads run on the calling thread and block until the body is fully
//! written. There is no retry, resume or timeout.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, info, trace};
use virt_riscv_core::{Error, Result};

/// Bytes read from the response and written to disk per step.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Provisioning phases reported to a [`DownloadProgress`] sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Creating the package directory.
    CreatingCache,
    /// Fetching the archive.
    Downloading,
    /// Unpacking the archive.
    Extracting,
    /// The compiler binary is present.
    Installed,
}

/// Receiver for provisioning progress, implemented by the host UI.
pub trait DownloadProgress {
    /// Called after each chunk is written.
    fn on_progress(&self, bytes_downloaded: u64, total_bytes: u64);

    /// Called when provisioning moves to another phase.
    fn on_phase(&self, _phase: Phase) {}
}

/// Progress sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl DownloadProgress for NoProgress {
    fn on_progress(&self, _bytes_downloaded: u64, _total_bytes: u64) {}
}

/// Progress sink that emits `tracing` events, logging every tenth of the body.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl DownloadProgress for TracingProgress {
    fn on_progress(&self, bytes_downloaded: u64, total_bytes: u64) {
        if total_bytes == 0 {
            return;
        }
        let percent = bytes_downloaded * 100 / total_bytes;
        let step = (total_bytes / 10).max(1);
        if bytes_downloaded == total_bytes || bytes_downloaded % step < CHUNK_SIZE as u64 {
            debug!(bytes_downloaded, total_bytes, percent, "Download progress");
        }
    }

    fn on_phase(&self, phase: Phase) {
        info!(?phase, "Toolchain provisioning");
    }
}

/// Fetches a URL into a file.
pub trait Downloader {
    /// Stream `url` into `dest`, returning the number of bytes written.
    ///
    /// `dest` is created or truncated. On error it may hold a partial body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProvisioningNetwork`] when the request fails, the
    /// response is not successful, has no content length, or ends early.
    fn download(&self, url: &str, dest: &Path, progress: &dyn DownloadProgress) -> Result<u64>;
}

/// [`Downloader`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    /// Create a downloader with no request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("virt-riscv/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Path, progress: &dyn DownloadProgress) -> Result<u64> {
        debug!(%url, ?dest, "Downloading archive");

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::network(url, format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::network(url, format!("HTTP {}", response.status())));
        }

        let total = response
            .content_length()
            .ok_or_else(|| Error::network(url, "response has no content-length header"))?;

        let mut file = File::create(dest).map_err(|e| Error::io(e, dest, "create"))?;
        let written = copy_chunked(&mut response, &mut file, total, progress)
            .map_err(|e| Error::network(url, format!("reading body failed: {e}")))?;

        if written != total {
            return Err(Error::network(
                url,
                format!("body ended after {written} of {total} bytes"),
            ));
        }

        info!(%url, bytes = written, "Downloaded archive");
        Ok(written)
    }
}

/// Copy `reader` into `writer` in [`CHUNK_SIZE`] steps, flushing after each one.
///
/// # Errors
///
/// Returns the first read, write or flush error.
pub fn copy_chunked(
    reader: &mut dyn Read,
    writer: &mut dyn Write,
    total: u64,
    progress: &dyn DownloadProgress,
) -> std::io::Result<u64> {
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut written = 0u64;

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..n])?;
        writer.flush()?;
        written += n as u64;
        trace!(written, total, "Wrote chunk");
        progress.on_progress(written, total);
    }

    Ok(written)
}
