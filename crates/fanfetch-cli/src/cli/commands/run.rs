//! `fanfetch run` – fetch the URL list once per strategy.

use anyhow::Result;
use fanfetch_core::config::FanfetchConfig;
use fanfetch_core::coordinator;
use fanfetch_core::strategy::{PassOptions, WorkerCommand};

pub fn run_passes(cfg: &FanfetchConfig, urls: Vec<String>) -> Result<()> {
    let urls = coordinator::select_urls(urls, &cfg.url_list)?;
    let strategies = cfg.strategies();
    let opts = PassOptions {
        settings: cfg.fetch_settings(),
        worker: WorkerCommand::current_exe()?,
        blocking_threads: cfg.blocking_threads,
    };

    let reports = coordinator::run_passes(&urls, &strategies, &opts)?;
    for report in &reports {
        tracing::debug!(
            strategy = report.strategy.label(),
            completed = report.completed,
            failed = report.failed,
            "pass summary"
        );
    }
    tracing::info!("run completed {} pass(es) over {} URL(s)", reports.len(), urls.len());
    Ok(())
}
