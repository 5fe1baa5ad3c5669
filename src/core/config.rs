//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::workspace::Workspace;
use crate::entities::standard::DEFAULT_QUANTITY_PER_CYCLE;

/// PlasticQC configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where exported documents are written when no output path is given
    pub export_dir: Option<PathBuf>,

    /// Quantity per cycle used when a new standard does not specify one
    pub default_quantity_per_cycle: Option<u32>,

    /// Default output format
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(workspace: Option<&Workspace>) -> Self {
        let mut config = Config::default();

        // Global user config (~/.config/pqc/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // Workspace config (.pqc/config.yaml)
        if let Some(ws) = workspace {
            if let Some(local) = Self::read_file(&ws.config_path()) {
                config.merge(local);
            }
        }

        if let Ok(dir) = std::env::var("PQC_EXPORT_DIR") {
            config.export_dir = Some(PathBuf::from(dir));
        }
        if let Ok(qty) = std::env::var("PQC_DEFAULT_QUANTITY") {
            match qty.trim().parse::<u32>() {
                Ok(q) => config.default_quantity_per_cycle = Some(q),
                Err(_) => tracing::warn!(value = %qty, "ignoring invalid PQC_DEFAULT_QUANTITY"),
            }
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        let has_settings = contents
            .lines()
            .map(str::trim)
            .any(|l| !l.is_empty() && !l.starts_with('#'));
        if !has_settings {
            return None;
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "pqc")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.export_dir.is_some() {
            self.export_dir = other.export_dir;
        }
        if other.default_quantity_per_cycle.is_some() {
            self.default_quantity_per_cycle = other.default_quantity_per_cycle;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Export directory, falling back to the current directory
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Quantity per cycle for new standards; zero falls back to the default
    pub fn default_quantity(&self) -> u32 {
        self.default_quantity_per_cycle
            .filter(|q| *q > 0)
            .unwrap_or(DEFAULT_QUANTITY_PER_CYCLE)
    }
}
