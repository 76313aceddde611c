//! `fanfetch fetch-one <url>` – single fetch, run inside a worker process.

use fanfetch_core::fetch::{self, FetchSettings};
use std::path::PathBuf;
use std::time::Duration;

/// Fetches one URL and reports it. Returns false when the fetch failed (already reported).
pub fn run_fetch_one(
    url: &str,
    output_dir: PathBuf,
    chunk_size: usize,
    connect_timeout_secs: Option<u64>,
) -> bool {
    let settings = FetchSettings {
        output_dir,
        chunk_size: chunk_size.max(1),
        connect_timeout: connect_timeout_secs.map(Duration::from_secs),
    };
    tracing::debug!(url, pid = std::process::id(), "worker fetch");
    fetch::fetch_and_report(url, &settings).is_ok()
}
