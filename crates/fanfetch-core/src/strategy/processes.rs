//! Isolated-worker strategy: one child process per URL.
//!
//! Each child re-runs the program's hidden worker subcommand for a single URL,
//! so a crash is confined to that unit. Children inherit stdout/stderr; their
//! per-unit lines interleave with the parent's.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};

use super::UnitError;
use crate::fetch::FetchSettings;

/// Subcommand the worker program runs to fetch a single URL.
pub const WORKER_SUBCOMMAND: &str = "fetch-one";

/// Program (plus leading arguments) that fetches one URL when given
/// `--output-dir <dir> --chunk-size <n> [--connect-timeout-secs <n>] -- <url>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl WorkerCommand {
    /// A worker program that takes the per-URL arguments directly.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// The currently running executable, invoked with the worker subcommand.
    pub fn current_exe() -> Result<Self> {
        let program = std::env::current_exe().context("locate current executable")?;
        Ok(Self::new(program).arg(WORKER_SUBCOMMAND))
    }

    /// Appends a leading argument placed before the per-URL ones.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Builds the command line for fetching `url` with `settings`.
    ///
    /// The URL follows `--`, so one starting with `-` is never read as a flag.
    pub fn command_for(&self, url: &str, settings: &FetchSettings) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg("--output-dir")
            .arg(&settings.output_dir)
            .arg("--chunk-size")
            .arg(settings.chunk_size.to_string());
        if let Some(timeout) = settings.connect_timeout {
            cmd.arg("--connect-timeout-secs")
                .arg(timeout.as_secs().max(1).to_string());
        }
        cmd.arg("--").arg(url).stdin(Stdio::null());
        cmd
    }
}

/// Starts one child per URL, then waits for every child in launch order.
///
/// A child exiting non-zero counts as a unit failure. Failing to start or wait
/// on a child fails the pass, but only after every started child has been waited on.
pub fn fetch_all(
    urls: &[String],
    settings: &FetchSettings,
    worker: &WorkerCommand,
) -> Result<Vec<Result<(), UnitError>>> {
    let mut children: Vec<(&str, Child)> = Vec::with_capacity(urls.len());
    let mut spawn_error = None;
    for url in urls {
        match worker.command_for(url, settings).spawn() {
            Ok(child) => {
                tracing::debug!(url = url.as_str(), pid = child.id(), "worker started");
                children.push((url.as_str(), child));
            }
            Err(e) => {
                spawn_error = Some(
                    anyhow::Error::new(e).context(format!("spawn worker process for {}", url)),
                );
                break;
            }
        }
    }

    let (results, wait_error) = wait_all(children, Child::wait);
    match spawn_error.or(wait_error) {
        Some(e) => Err(e),
        None => Ok(results),
    }
}

/// Waits on every child in order. A failed wait is kept (the first one wins)
/// and the remaining children are still waited on.
fn wait_all<C>(
    children: Vec<(&str, C)>,
    mut wait: impl FnMut(&mut C) -> io::Result<ExitStatus>,
) -> (Vec<Result<(), UnitError>>, Option<anyhow::Error>) {
    let mut results = Vec::with_capacity(children.len());
    let mut wait_error = None;
    for (url, mut child) in children {
        match wait(&mut child) {
            Ok(status) if status.success() => results.push(Ok(())),
            Ok(status) => {
                tracing::debug!(url, %status, "worker failed");
                results.push(Err(UnitError::Exited(status)));
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "wait for worker failed");
                if wait_error.is_none() {
                    wait_error = Some(
                        anyhow::Error::new(e)
                            .context(format!("wait for worker process for {}", url)),
                    );
                }
            }
        }
    }
    (results, wait_error)
}
