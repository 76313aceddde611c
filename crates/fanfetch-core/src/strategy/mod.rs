//! Execution strategies: three ways of running one fetch unit per URL concurrently.
//!
//! Every strategy launches all units before waiting on any, never caps
//! concurrency, and waits for every unit whether it succeeds or fails. A unit
//! failure is reported and counted; it never aborts siblings. A pass only
//! errors when its own launch/wait machinery does (thread or process spawn,
//! runtime construction).

pub mod cooperative;
pub mod processes;
pub mod threads;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::ExitStatus;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::fetch::{FetchError, FetchOutcome, FetchSettings};

pub use processes::WorkerCommand;

/// Concurrency discipline for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One OS thread per URL, sharing the read-only settings.
    Threads,
    /// One child process per URL, no shared memory.
    Processes,
    /// Single control thread; blocking fetches offloaded to a bounded pool.
    Cooperative,
}

impl Strategy {
    /// Canonical order used when no explicit list is configured.
    pub const ALL: [Strategy; 3] = [Strategy::Threads, Strategy::Processes, Strategy::Cooperative];

    pub fn label(self) -> &'static str {
        match self {
            Strategy::Threads => "threads",
            Strategy::Processes => "processes",
            Strategy::Cooperative => "cooperative",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
#[error("unknown strategy '{0}' (expected threads, processes or cooperative)")]
pub struct UnknownStrategy(String);

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "threads" => Ok(Strategy::Threads),
            "processes" => Ok(Strategy::Processes),
            "cooperative" => Ok(Strategy::Cooperative),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

/// Why one unit did not complete. Fetch errors are already reported by the unit itself.
#[derive(Debug, Error)]
pub enum UnitError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// In-process worker (thread or offloaded task) panicked.
    #[error("worker panicked: {0}")]
    Panicked(String),
    /// Child process exited unsuccessfully or was killed.
    #[error("worker {0}")]
    Exited(ExitStatus),
}

/// Result of one in-process unit.
pub type UnitResult = Result<FetchOutcome, UnitError>;

/// Everything a pass needs besides the URL list.
#[derive(Debug, Clone)]
pub struct PassOptions {
    pub settings: FetchSettings,
    /// How to launch an isolated worker (processes strategy).
    pub worker: WorkerCommand,
    /// Bound on the cooperative strategy's background pool.
    pub blocking_threads: usize,
}

/// Totals for one pass over the URL list.
#[derive(Debug, Clone)]
pub struct PassReport {
    pub strategy: Strategy,
    pub items: usize,
    pub completed: usize,
    pub failed: usize,
    /// Wall clock from first launch to last completion.
    pub elapsed: Duration,
}

/// Runs one pass of `strategy` over every URL and waits for all units.
pub fn run_pass(strategy: Strategy, urls: &[String], opts: &PassOptions) -> Result<PassReport> {
    let span = tracing::info_span!("pass", strategy = strategy.label(), items = urls.len());
    let _enter = span.enter();

    let start = Instant::now();
    let unit_ok: Vec<bool> = match strategy {
        Strategy::Threads => log_unit_errors(threads::fetch_all(urls, &opts.settings)?),
        Strategy::Processes => processes::fetch_all(urls, &opts.settings, &opts.worker)?
            .into_iter()
            .map(|r| log_unit_error(r.err()))
            .collect(),
        Strategy::Cooperative => log_unit_errors(cooperative::run(
            urls,
            &opts.settings,
            opts.blocking_threads,
        )?),
    };
    let elapsed = start.elapsed();

    let completed = unit_ok.iter().filter(|ok| **ok).count();
    let report = PassReport {
        strategy,
        items: urls.len(),
        completed,
        failed: unit_ok.len() - completed,
        elapsed,
    };
    tracing::info!(
        completed = report.completed,
        failed = report.failed,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "pass finished"
    );
    Ok(report)
}

fn log_unit_errors(results: Vec<UnitResult>) -> Vec<bool> {
    results
        .into_iter()
        .map(|r| log_unit_error(r.err()))
        .collect()
}

/// Logs failures the unit could not report itself; returns true on success.
fn log_unit_error(err: Option<UnitError>) -> bool {
    let Some(e) = err else {
        return true;
    };
    if !matches!(e, UnitError::Fetch(_)) {
        tracing::warn!(error = %e, "unit failed");
    }
    if let Some(line) = console_line(&e) {
        eprintln!("{}", line);
    }
    false
}

/// Stderr line for a failure nobody has printed yet.
fn console_line(err: &UnitError) -> Option<String> {
    match err {
        // already reported by fetch_and_report
        UnitError::Fetch(_) => None,
        // a child that exited with a code ran fetch_and_report itself
        UnitError::Exited(status) if status.code().is_some() => None,
        e => Some(format!("Unit failed: {}", e)),
    }
}

/// Best-effort text from a thread panic payload.
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
