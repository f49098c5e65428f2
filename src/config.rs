use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub snoop: SnoopConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Polling interval between snapshots, in milliseconds.
    pub poll_interval_ms: u64,
    /// Maximum number of tracked processes; exceeding it aborts the run.
    pub max_processes: usize,
    /// Minimum CPU utilization (fraction of the elapsed window) a process
    /// must have to appear in the report.
    pub cpu_threshold: f32,
    /// Cap on printed report rows; 0 means unlimited.
    pub max_report_rows: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            poll_interval_ms: 2000,
            max_processes: 4096,
            cpu_threshold: 0.0,
            max_report_rows: 0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SnoopConfig {
    /// Address to serve the snoop protocol on, e.g. "127.0.0.1:7070".
    pub listen: Option<String>,
    /// Peers to collect from instead of monitoring locally.
    pub peers: Vec<String>,
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("procpulse").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}
