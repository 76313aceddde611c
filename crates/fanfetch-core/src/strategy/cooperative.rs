//! Cooperative strategy: one control thread, blocking fetches offloaded.
//!
//! A current-thread tokio runtime drives the tasks. Each fetch unit runs on
//! the runtime's blocking pool via `spawn_blocking`, so the control thread only
//! ever suspends at `.await` and resumes a task once its offloaded fetch is done.

use anyhow::{Context, Result};
use futures::future::join_all;
use std::sync::Arc;

use super::{UnitError, UnitResult};
use crate::fetch::{self, FetchSettings};

/// Builds a current-thread runtime whose blocking pool holds at most
/// `blocking_threads` threads and drives [`fetch_all`] to completion.
///
/// Must not be called from inside another tokio runtime.
pub fn run(
    urls: &[String],
    settings: &FetchSettings,
    blocking_threads: usize,
) -> Result<Vec<UnitResult>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .max_blocking_threads(blocking_threads.max(1))
        .thread_name("fanfetch-offload")
        .build()
        .context("build cooperative runtime")?;
    Ok(runtime.block_on(fetch_all(urls, settings)))
}

/// Launches every unit onto the blocking pool, then awaits all of them.
///
/// Uses a join-all that never short-circuits: a failed or panicked unit is
/// recorded and every other unit still runs to completion. Results keep URL order.
pub async fn fetch_all(urls: &[String], settings: &FetchSettings) -> Vec<UnitResult> {
    let settings = Arc::new(settings.clone());
    let tasks: Vec<_> = urls
        .iter()
        .map(|url| {
            let url = url.clone();
            let settings = Arc::clone(&settings);
            tokio::task::spawn_blocking(move || fetch::fetch_and_report(&url, &settings))
        })
        .collect();

    join_all(tasks)
        .await
        .into_iter()
        .map(|joined| match joined {
            Ok(result) => result.map_err(UnitError::from),
            Err(e) => Err(UnitError::Panicked(e.to_string())),
        })
        .collect()
}
