//! Fetch unit error type.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single fetch failed. Never retried; the caller decides how to report it.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL has no usable final path segment to name the file after.
    #[error("no file name in URL: {0}")]
    Destination(String),

    /// Curl reported an error (connection refused, DNS, stream interrupted, ...).
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {0}")]
    Http(u32),

    /// Destination file could not be created or written (missing dir, permissions, disk full).
    #[error("storage {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// True for failures on the network side (as opposed to local disk or naming).
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Http(_))
    }
}
