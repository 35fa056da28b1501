use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures of the text panel a widget renders into.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PanelError {
    #[error("panel capacity of {capacity} lines exceeded")]
    CapacityExceeded { capacity: usize },
}

/// Failures of the shell-exec helper.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Failures resolving a log category to a file on disk.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("cannot read log directory {dir}: {source}")]
    ReadDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no `{category}` log file found in {dir}")]
    NotFound { category: String, dir: PathBuf },
}

/// Failures loading the runtime settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Terminal failure of a widget task.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("{widget} widget failed to render: {source}")]
    Render {
        widget: &'static str,
        #[source]
        source: PanelError,
    },

    #[error("{widget} widget task aborted: {reason}")]
    Aborted { widget: String, reason: String },
}
