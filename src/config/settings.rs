//! Application settings and paths.
//!
//! Settings live in `settings.json` under the XDG config directory
//! (`~/.config/recon` on Linux) unless a path is given explicitly. Every
//! field is optional in the file; missing fields take the built-in defaults.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/recon)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the configuration directory. Nothing is created on disk.
    pub fn discover() -> Option<Self> {
        ProjectDirs::from("com", "recon", "recon").map(|project| Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Defaults for the scan command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Port specification used when `--ports` is absent.
    pub default_ports: String,
    /// Concurrent probes.
    pub default_workers: usize,
    /// Per-attempt connect timeout in seconds.
    pub default_timeout_secs: f64,
    /// Connection attempts per task.
    pub default_retry: u32,
    /// Prefix for result files.
    pub default_output: String,
    /// Unit of the exponential backoff between retries, in milliseconds.
    pub backoff_unit_ms: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_ports: "80,443".to_string(),
            default_workers: 20,
            default_timeout_secs: 5.0,
            default_retry: 1,
            default_output: "recon_results".to_string(),
            backoff_unit_ms: 1000,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, or defaults if there is no file.
    pub fn load() -> ConfigResult<Self> {
        match Paths::discover() {
            Some(paths) if paths.settings_file().exists() => Self::load_from(&paths.settings_file()),
            _ => Ok(Self::default()),
        }
    }

    /// Load settings from a specific file, which must exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Load from `explicit` if given, otherwise from the default location.
    pub fn resolve(explicit: Option<&Path>) -> ConfigResult<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }
}
