//! Parallel-worker strategy: one OS thread per URL.
//!
//! Threads are scoped, so they borrow the shared settings directly; nothing
//! mutable is shared between them.

use anyhow::{Context, Result};
use std::thread;

use super::{panic_message, UnitError, UnitResult};
use crate::fetch::{self, FetchSettings};

/// Spawns one thread per URL, then joins every thread in launch order.
///
/// Results are returned in URL order. Fails only if a thread cannot be spawned;
/// threads already running are still joined before the error is returned.
pub fn fetch_all(urls: &[String], settings: &FetchSettings) -> Result<Vec<UnitResult>> {
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(urls.len());
        for (index, url) in urls.iter().enumerate() {
            let handle = thread::Builder::new()
                .name(format!("fanfetch-unit-{}", index))
                .spawn_scoped(scope, move || fetch::fetch_and_report(url, settings))
                .with_context(|| format!("spawn worker thread for {}", url))?;
            handles.push(handle);
        }

        Ok(handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result.map_err(UnitError::from),
                Err(payload) => Err(UnitError::Panicked(panic_message(payload))),
            })
            .collect())
    })
}
