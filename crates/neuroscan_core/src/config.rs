//! Application settings loaded from `config.toml`.

use crate::analysis::{GLIOMA_VERDICT, SIMULATED_DELAY};
use crate::preview::PREVIEW_SIZE;
use anyhow::{Context, Result};
use directories_next::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "NEUROSCAN_CONFIG";

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "NeuroScan", "NeuroScan")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// How long the simulated analysis takes.
    pub analysis_delay_ms: u64,
    /// Text shown when the simulated analysis completes.
    pub verdict: String,
    /// Edge length of preview thumbnails.
    pub preview_size: u32,
    /// Overrides where the session marker is kept.
    pub session_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            analysis_delay_ms: SIMULATED_DELAY.as_millis() as u64,
            verdict: GLIOMA_VERDICT.to_string(),
            preview_size: PREVIEW_SIZE,
            session_file: None,
        }
    }
}

impl AppConfig {
    /// `$NEUROSCAN_CONFIG`, else `config.toml` in the platform config dir.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        project_dirs().map(|d| d.config_dir().join("config.toml"))
    }

    /// Loads settings, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        let cfg: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("invalid config {}", path.display()))?;
        if cfg.preview_size == 0 {
            anyhow::bail!("preview_size must be positive");
        }
        Ok(cfg)
    }

    pub fn analysis_delay(&self) -> Duration {
        Duration::from_millis(self.analysis_delay_ms)
    }
}
