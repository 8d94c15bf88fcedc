// src/config/engine.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::heat::DEFAULT_DECAY_K;

pub const ENV_CONFIG_PATH: &str = "TRENDING_CONFIG_PATH";
pub const ENV_DECAY_K: &str = "TRENDING_DECAY_K";
pub const ENV_INTERVAL_SECS: &str = "TRENDING_INTERVAL_SECS";

fn default_decay_k() -> f64 {
    DEFAULT_DECAY_K
}
fn default_interval_secs() -> u64 {
    300
}
fn default_keywords_per_item() -> usize {
    5
}
fn default_limit() -> usize {
    10
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Heat decay constant per elapsed day.
    #[serde(default = "default_decay_k")]
    pub decay_k: f64,
    /// Seconds between scheduled cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Keywords taken from each newly published item.
    #[serde(default = "default_keywords_per_item")]
    pub keywords_per_item: usize,
    /// Limit used by query routes when none is given.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Where hotword history is stored between restarts.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
    /// JSON dataset used to seed the in-memory repository.
    #[serde(default)]
    pub dataset_path: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decay_k: default_decay_k(),
            interval_secs: default_interval_secs(),
            keywords_per_item: default_keywords_per_item(),
            default_limit: default_limit(),
            snapshot_path: None,
            dataset_path: None,
            metrics_enabled: true,
        }
    }
}

impl EngineConfig {
    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading engine config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&data, &ext)?;
        Ok(cfg.sanitized())
    }

    /// Resolve config using env var + fallbacks, then apply env overrides:
    /// 1) $TRENDING_CONFIG_PATH
    /// 2) config/trending.toml
    /// 3) config/trending.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_CONFIG_PATH} points to non-existent path");
            }
            Self::load_from_file(&pb)?
        } else if Path::new("config/trending.toml").exists() {
            Self::load_from_file("config/trending.toml")?
        } else if Path::new("config/trending.json").exists() {
            Self::load_from_file("config/trending.json")?
        } else {
            Self::default()
        };
        Ok(base.with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(k) = env::var(ENV_DECAY_K)
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
        {
            self.decay_k = k;
        }
        if let Some(secs) = env::var(ENV_INTERVAL_SECS)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            self.interval_secs = secs;
        }
        self.sanitized()
    }

    /// Out-of-range values fall back to defaults.
    fn sanitized(mut self) -> Self {
        if !self.decay_k.is_finite() || self.decay_k < 0.0 {
            self.decay_k = default_decay_k();
        }
        if self.interval_secs == 0 {
            self.interval_secs = default_interval_secs();
        }
        if self.default_limit == 0 {
            self.default_limit = default_limit();
        }
        self
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<EngineConfig> {
    match hint_ext {
        "toml" => toml::from_str(s).context("parsing TOML engine config"),
        "json" => serde_json::from_str(s).context("parsing JSON engine config"),
        _ => toml::from_str(s)
            .or_else(|_| serde_json::from_str(s))
            .map_err(|_| anyhow!("unsupported engine config format")),
    }
}
