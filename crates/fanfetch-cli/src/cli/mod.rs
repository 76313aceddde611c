//! CLI for the fanfetch bulk resource fetcher.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fanfetch_core::config;
use fanfetch_core::fetch::DEFAULT_CHUNK_SIZE;
use fanfetch_core::strategy::Strategy;
use std::path::PathBuf;
use std::process::ExitCode;

use commands::{run_fetch_one, run_passes};

/// Top-level CLI for fanfetch.
#[derive(Debug, Parser)]
#[command(name = "fanfetch")]
#[command(
    about = "fanfetch: fetch a list of URLs under different concurrency strategies",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch every URL once per strategy and report each strategy's total time.
    Run {
        /// URL(s) to fetch instead of the default URL list. Repeatable.
        #[arg(long = "url", value_name = "URL", num_args = 1..)]
        urls: Vec<String>,
        /// Strategy to run: threads, processes or cooperative. Repeatable; default is the configured order.
        #[arg(long = "strategy", value_name = "STRATEGY")]
        strategies: Vec<Strategy>,
        /// Existing directory to write files into (overrides config).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
        /// URL list file used when no --url is given (overrides config).
        #[arg(long, value_name = "FILE")]
        url_list: Option<PathBuf>,
    },

    /// Fetch a single URL. Worker entry point for the processes strategy.
    #[command(hide = true)]
    FetchOne {
        /// URL to fetch.
        url: String,
        /// Existing directory to write the file into.
        #[arg(long, value_name = "DIR")]
        output_dir: PathBuf,
        /// Receive buffer size in bytes.
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, value_name = "BYTES")]
        chunk_size: usize,
        /// Connect timeout in seconds.
        #[arg(long, value_name = "SECS")]
        connect_timeout_secs: Option<u64>,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<ExitCode> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Run {
                urls,
                strategies,
                output_dir,
                url_list,
            } => {
                let mut cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                if let Some(dir) = output_dir {
                    cfg.output_dir = dir;
                }
                if let Some(path) = url_list {
                    cfg.url_list = path;
                }
                if !strategies.is_empty() {
                    cfg.strategies = Some(strategies);
                }
                run_passes(&cfg, urls)?;
                Ok(ExitCode::SUCCESS)
            }
            CliCommand::FetchOne {
                url,
                output_dir,
                chunk_size,
                connect_timeout_secs,
            } => {
                let ok = run_fetch_one(&url, output_dir, chunk_size, connect_timeout_secs);
                Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
            }
        }
    }
}

#[cfg(test)]
mod tests;
