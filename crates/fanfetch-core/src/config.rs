use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::fetch::{FetchSettings, DEFAULT_CHUNK_SIZE};
use crate::strategy::Strategy;

/// Global configuration loaded from `~/.config/fanfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanfetchConfig {
    /// Directory downloaded files are written into. Must already exist.
    pub output_dir: PathBuf,
    /// Default URL list (one URL per line), used when no URLs are given on the command line.
    pub url_list: PathBuf,
    /// Receive buffer size in bytes; each write to disk is at most this large.
    pub chunk_size: usize,
    /// Connect timeout in seconds (None = libcurl default). There is no overall transfer timeout.
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Upper bound on background threads the cooperative strategy offloads fetches onto.
    pub blocking_threads: usize,
    /// Strategies to run, in order. If missing, all three run.
    #[serde(default)]
    pub strategies: Option<Vec<Strategy>>,
}

impl Default for FanfetchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("images"),
            url_list: PathBuf::from("images.txt"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            connect_timeout_secs: Some(30),
            blocking_threads: 64,
            strategies: None,
        }
    }
}

impl FanfetchConfig {
    /// Per-unit fetch settings derived from this config.
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            output_dir: self.output_dir.clone(),
            chunk_size: self.chunk_size.max(1),
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Strategies to run, falling back to all of them in their canonical order.
    pub fn strategies(&self) -> Vec<Strategy> {
        match &self.strategies {
            Some(list) if !list.is_empty() => list.clone(),
            _ => Strategy::ALL.to_vec(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("fanfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FanfetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FanfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: FanfetchConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = FanfetchConfig::default();
        assert_eq!(cfg.output_dir, PathBuf::from("images"));
        assert_eq!(cfg.url_list, PathBuf::from("images.txt"));
        assert_eq!(cfg.chunk_size, 1024);
        assert_eq!(cfg.connect_timeout_secs, Some(30));
        assert_eq!(
            cfg.strategies(),
            vec![Strategy::Threads, Strategy::Processes, Strategy::Cooperative]
        );
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = FanfetchConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: FanfetchConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.output_dir, cfg.output_dir);
        assert_eq!(parsed.chunk_size, cfg.chunk_size);
        assert_eq!(parsed.blocking_threads, cfg.blocking_threads);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            output_dir = "/tmp/out"
            url_list = "urls.txt"
            chunk_size = 4096
            blocking_threads = 8
            strategies = ["cooperative", "threads"]
        "#;
        let cfg: FanfetchConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(cfg.chunk_size, 4096);
        assert!(cfg.connect_timeout_secs.is_none());
        assert_eq!(
            cfg.strategies(),
            vec![Strategy::Cooperative, Strategy::Threads]
        );
    }

    #[test]
    fn empty_strategy_list_means_all() {
        let mut cfg = FanfetchConfig::default();
        cfg.strategies = Some(Vec::new());
        assert_eq!(cfg.strategies(), Strategy::ALL.to_vec());
    }

    #[test]
    fn fetch_settings_clamps_zero_chunk() {
        let mut cfg = FanfetchConfig::default();
        cfg.chunk_size = 0;
        cfg.connect_timeout_secs = Some(5);
        let settings = cfg.fetch_settings();
        assert_eq!(settings.chunk_size, 1);
        assert_eq!(settings.connect_timeout, Some(Duration::from_secs(5)));
    }
}
