use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while driving the external Bluetooth tool.
#[derive(Debug, Error)]
pub enum BluetoothError {
    #[error("{program} command not found. Please ensure it is installed.")]
    ToolNotFound { program: String },

    #[error("`{command}` failed ({status}): {diagnostic}")]
    ToolExecutionFailed {
        command: String,
        status: String,
        diagnostic: String,
    },

    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Entry(#[from] EntryError),
}

impl BluetoothError {
    /// Text captured from the tool when it exited nonzero.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::ToolExecutionFailed { diagnostic, .. } => Some(diagnostic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("no address field in device entry {0:?}")]
    MissingAddress(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
