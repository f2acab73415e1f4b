//! Host configuration.
//!
//! Read from `config.json` in the platform config directory. A missing or
//! unreadable file falls back to defaults; `LH_MAX_RESULTS` overrides the
//! result cap.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const MAX_RESULTS_ENV: &str = "LH_MAX_RESULTS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Folders offered for `@` mentions (`~/` is expanded)
    pub mention_roots: Vec<String>,
    pub max_results: usize,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mention_roots: vec![".".into()],
            max_results: 50,
            log_filter: "info".into(),
        }
    }
}

impl AppConfig {
    pub fn mention_root_paths(&self) -> Vec<PathBuf> {
        self.mention_roots.iter().map(|r| expand_user_path(r)).collect()
    }

    /// Replace values that would make the host useless with defaults.
    fn validated(mut self) -> Self {
        if self.max_results == 0 {
            warn!("max_results must be at least 1, using default");
            self.max_results = AppConfig::default().max_results;
        }
        self
    }

    fn apply_env_override(mut self, max_results: Option<String>) -> Self {
        if let Some(raw) = max_results {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.max_results = n,
                _ => warn!(value = %raw, "Ignoring invalid {}", MAX_RESULTS_ENV),
            }
        }
        self
    }
}

pub fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com.local", "Little Helper", "LittleHelper")
        .map(|proj| proj.config_dir().join("config.json"))
}

pub fn load_config_or_default() -> AppConfig {
    let config = config_path()
        .map(|path| load_from(&path))
        .unwrap_or_default();
    config.apply_env_override(std::env::var(MAX_RESULTS_ENV).ok())
}

fn load_from(path: &Path) -> AppConfig {
    if !path.exists() {
        debug!(path = %path.display(), "No config file, using defaults");
        return AppConfig::default();
    }
    match fs::read(path).map_err(anyhow::Error::from).and_then(|bytes| {
        serde_json::from_slice::<AppConfig>(&bytes).map_err(anyhow::Error::from)
    }) {
        Ok(config) => config.validated(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        }
    }
}

pub fn expand_user_path(path_str: &str) -> PathBuf {
    if let Some(stripped) = path_str.strip_prefix("~/") {
        if let Some(base) = directories::BaseDirs::new() {
            return base.home_dir().join(stripped);
        }
    }
    PathBuf::from(path_str)
}
