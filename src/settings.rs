//! Runtime settings read by the widgets on every tick.
//!
//! Settings start from values seeded by the environment [`Config`] and are
//! overlaid with whatever keys an optional TOML file provides. The file can be
//! re-read while the dashboard runs; widgets pick up the new values on their
//! next tick.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::SettingsError;

pub const DEFAULT_TIMESTAMP_LAYOUT: &str = "%+";
pub const DEFAULT_NODE_BINARY: &str = "harmony";
pub const DEFAULT_LOG_CATEGORY: &str = "validator";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// chrono format string used to parse the bingo timestamp
    pub timestamp_layout: String,
    pub out_of_sync_minutes: f64,
    pub earning_rate_interval: Duration,
    pub widget_interval: Duration,
    pub node_binary_dir: PathBuf,
    pub node_binary_name: String,
    pub exec_timeout: Duration,
    pub log_category: String,
    pub log_poll_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self::seeded_from(&Config::default())
    }
}

impl Settings {
    pub fn seeded_from(config: &Config) -> Self {
        Self {
            timestamp_layout: DEFAULT_TIMESTAMP_LAYOUT.to_string(),
            out_of_sync_minutes: 30.0,
            earning_rate_interval: Duration::from_secs(60),
            widget_interval: config.widget_refresh_interval,
            node_binary_dir: config.node_binary_path.clone(),
            node_binary_name: DEFAULT_NODE_BINARY.to_string(),
            exec_timeout: Duration::from_secs(5),
            log_category: DEFAULT_LOG_CATEGORY.to_string(),
            log_poll_interval: Duration::from_millis(250),
        }
    }

    pub fn node_binary(&self) -> PathBuf {
        self.node_binary_dir.join(&self.node_binary_name)
    }

    fn overlay(mut self, file: SettingsFile) -> Self {
        if let Some(v) = file.timestamp_layout {
            self.timestamp_layout = v;
        }
        if let Some(v) = file.out_of_sync_minutes {
            self.out_of_sync_minutes = v;
        }
        if let Some(v) = file.earning_rate_interval_secs {
            self.earning_rate_interval = Duration::from_secs(v);
        }
        if let Some(v) = file.widget_interval_ms {
            // a zero period would panic the ticker
            self.widget_interval = Duration::from_millis(v.max(1));
        }
        if let Some(v) = file.node_binary_dir {
            self.node_binary_dir = v;
        }
        if let Some(v) = file.node_binary_name {
            self.node_binary_name = v;
        }
        if let Some(v) = file.exec_timeout_ms {
            self.exec_timeout = Duration::from_millis(v);
        }
        if let Some(v) = file.log_category {
            self.log_category = v;
        }
        if let Some(v) = file.log_poll_interval_ms {
            self.log_poll_interval = Duration::from_millis(v.max(1));
        }
        self
    }
}

/// On-disk shape of the settings file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    timestamp_layout: Option<String>,
    out_of_sync_minutes: Option<f64>,
    earning_rate_interval_secs: Option<u64>,
    widget_interval_ms: Option<u64>,
    node_binary_dir: Option<PathBuf>,
    node_binary_name: Option<String>,
    exec_timeout_ms: Option<u64>,
    log_category: Option<String>,
    log_poll_interval_ms: Option<u64>,
}

/// Read `path` and overlay it on `seed`. A missing file yields `seed` as is.
pub fn load_settings(seed: &Settings, path: &Path) -> Result<Settings, SettingsError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(seed.clone());
        }
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let file: SettingsFile = toml::from_str(&contents).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(seed.clone().overlay(file))
}

/// Process-wide settings handle shared by every widget task.
#[derive(Debug, Clone)]
pub struct SharedSettings {
    current: Arc<RwLock<Settings>>,
    seed: Arc<Settings>,
    path: Option<PathBuf>,
}

impl SharedSettings {
    /// Settings that are never reloaded from disk.
    #[cfg(test)]
    pub fn fixed(settings: Settings) -> Self {
        Self {
            current: Arc::new(RwLock::new(settings.clone())),
            seed: Arc::new(settings),
            path: None,
        }
    }

    /// Load `path` over `seed`. An unreadable or invalid file falls back to
    /// `seed`; the error is logged and not surfaced.
    pub fn from_file(seed: Settings, path: PathBuf) -> Self {
        let initial = match load_settings(&seed, &path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "Ignoring settings file");
                seed.clone()
            }
        };

        Self {
            current: Arc::new(RwLock::new(initial)),
            seed: Arc::new(seed),
            path: Some(path),
        }
    }

    /// Re-read the settings file. On error the previous settings stay in place.
    pub fn reload(&self) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let settings = load_settings(&self.seed, path)?;
        info!(path = %path.display(), "Settings reloaded");
        *self.current.write() = settings;
        Ok(())
    }

    pub fn current(&self) -> Settings {
        self.current.read().clone()
    }

    pub fn widget_interval(&self) -> Duration {
        self.current.read().widget_interval
    }
}
