//! The fetch unit: one streaming HTTP GET written chunk by chunk to disk.
//!
//! Every strategy calls [`fetch_one`] with the same [`FetchSettings`], so the
//! only thing that differs between passes is how units are scheduled.

mod error;

pub use error::FetchError;

use crate::destination;
use std::cell::Cell;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Default receive buffer (and therefore maximum write) size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Read-only settings shared by every fetch unit of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Existing directory files are written into.
    pub output_dir: PathBuf,
    /// Receive buffer size handed to libcurl.
    pub chunk_size: usize,
    /// Connect timeout; `None` keeps the libcurl default.
    pub connect_timeout: Option<Duration>,
}

impl FetchSettings {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            connect_timeout: None,
        }
    }
}

/// Result of one successful fetch.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub url: String,
    pub path: PathBuf,
    pub bytes: u64,
    pub elapsed: Duration,
}

/// Destination file opened lazily on the first non-empty chunk.
struct ChunkSink<'a> {
    path: &'a Path,
    file: Option<File>,
    written: u64,
    error: Option<std::io::Error>,
}

impl<'a> ChunkSink<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            file: None,
            written: 0,
            error: None,
        }
    }

    /// Writes one chunk; returns false (and keeps the error) to abort the transfer.
    fn accept(&mut self, data: &[u8]) -> bool {
        if data.is_empty() {
            return true;
        }
        match self.write_chunk(data) {
            Ok(()) => true,
            Err(e) => {
                self.error = Some(e);
                false
            }
        }
    }

    fn write_chunk(&mut self, data: &[u8]) -> std::io::Result<()> {
        if self.file.is_none() {
            self.file = Some(File::create(self.path)?);
        }
        if let Some(file) = self.file.as_mut() {
            file.write_all(data)?;
        }
        self.written += data.len() as u64;
        Ok(())
    }

    fn storage_error(&self, source: std::io::Error) -> FetchError {
        FetchError::Storage {
            path: self.path.to_path_buf(),
            source,
        }
    }

    /// Flushes the file, creating an empty one if the body had no bytes.
    fn finish(mut self) -> Result<u64, FetchError> {
        let file = match self.file.take() {
            Some(f) => Ok(f),
            None => File::create(self.path),
        };
        file.and_then(|mut f| f.flush())
            .map_err(|e| self.storage_error(e))?;
        Ok(self.written)
    }
}

/// Status code from an HTTP status line (`HTTP/1.1 200 OK`, `HTTP/2 404`).
fn parse_status_line(line: &[u8]) -> Option<u32> {
    let line = std::str::from_utf8(line).ok()?;
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

/// 0 means no status line was seen (non-HTTP scheme).
fn is_success_status(code: u32) -> bool {
    code == 0 || (200..300).contains(&code)
}

/// Fetches `url` into `settings.output_dir`, named after the URL's final path segment.
///
/// Only a 2xx response body is written; any other final status is an error and
/// creates nothing. A transfer cut off mid-body leaves the partial file in place.
/// Blocks on network and disk I/O.
pub fn fetch_one(url: &str, settings: &FetchSettings) -> Result<FetchOutcome, FetchError> {
    let path = destination::destination_path(&settings.output_dir, url)
        .ok_or_else(|| FetchError::Destination(url.to_string()))?;
    tracing::debug!(url, path = %path.display(), "fetch start");

    let start = Instant::now();
    let mut sink = ChunkSink::new(&path);

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.fail_on_error(true)?;
    easy.buffer_size(settings.chunk_size)?;
    if let Some(timeout) = settings.connect_timeout {
        easy.connect_timeout(timeout)?;
    }

    // latest status line; redirects and 1xx interim responses each send one
    let status = Cell::new(0u32);
    let performed = {
        let mut transfer = easy.transfer();
        transfer.header_function(|line| {
            if let Some(code) = parse_status_line(line) {
                status.set(code);
            }
            true
        })?;
        transfer.write_function(|data| {
            // non-2xx bodies are drained, never stored
            if !is_success_status(status.get()) {
                return Ok(data.len());
            }
            Ok(if sink.accept(data) { data.len() } else { 0 })
        })?;
        transfer.perform()
    };

    if let Err(e) = performed {
        if e.is_write_error() {
            if let Some(io_err) = sink.error.take() {
                return Err(sink.storage_error(io_err));
            }
        }
        if e.is_http_returned_error() {
            let code = easy.response_code().unwrap_or(0);
            return Err(FetchError::Http(code));
        }
        return Err(FetchError::Transport(e));
    }

    // 0 when the scheme has no status code
    let code = easy.response_code()?;
    if !is_success_status(code) {
        return Err(FetchError::Http(code));
    }

    let bytes = sink.finish()?;
    let elapsed = start.elapsed();
    tracing::info!(
        url,
        path = %path.display(),
        bytes,
        elapsed_ms = elapsed.as_millis() as u64,
        "fetch complete"
    );
    Ok(FetchOutcome {
        url: url.to_string(),
        path,
        bytes,
        elapsed,
    })
}

/// Console line for a completed unit.
pub fn report_success(outcome: &FetchOutcome) {
    println!(
        "Downloaded {} in {:.2} seconds",
        outcome.path.display(),
        outcome.elapsed.as_secs_f64()
    );
}

/// Console line (stderr) and log entry for a failed unit.
pub fn report_failure(url: &str, err: &FetchError) {
    tracing::warn!(url, error = %err, "fetch failed");
    eprintln!("Failed to download {}: {}", url, err);
}

/// Runs [`fetch_one`] and reports the result either way.
pub fn fetch_and_report(url: &str, settings: &FetchSettings) -> Result<FetchOutcome, FetchError> {
    let result = fetch_one(url, settings);
    match &result {
        Ok(outcome) => report_success(outcome),
        Err(e) => report_failure(url, e),
    }
    result
}
