//! Run coordinator: pick the URL list, then run each strategy over it in turn.

use anyhow::Result;
use std::path::Path;

use crate::strategy::{self, PassOptions, PassReport, Strategy};
use crate::url_list;

/// URLs given explicitly win; otherwise the default list file is loaded.
pub fn select_urls(explicit: Vec<String>, url_list_path: &Path) -> Result<Vec<String>> {
    if !explicit.is_empty() {
        tracing::debug!(count = explicit.len(), "using URLs from command line");
        return Ok(explicit);
    }
    Ok(url_list::load_url_list(url_list_path)?)
}

/// Runs `strategies` one after another over the same `urls`.
///
/// A pass starts only after the previous one has fully completed. Prints the
/// item count before and the total time after each pass. The first pass-level
/// error ends the run; unit failures do not.
pub fn run_passes(
    urls: &[String],
    strategies: &[Strategy],
    opts: &PassOptions,
) -> Result<Vec<PassReport>> {
    if !opts.settings.output_dir.is_dir() {
        tracing::warn!(
            dir = %opts.settings.output_dir.display(),
            "output directory does not exist; every fetch will fail"
        );
    }

    let mut reports = Vec::with_capacity(strategies.len());
    for (i, &strategy) in strategies.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!(
            "Downloading {} resources using {}...",
            urls.len(),
            strategy.label()
        );
        let report = strategy::run_pass(strategy, urls, opts)?;
        println!(
            "Total time using {}: {:.2} seconds",
            strategy.label(),
            report.elapsed.as_secs_f64()
        );
        reports.push(report);
    }
    Ok(reports)
}
