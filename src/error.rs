// src/error.rs
//! Library error types. The CLI layer wraps these with `anyhow` context.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for map operations.
pub type Result<T> = std::result::Result<T, MapError>;

/// Errors raised while producing a repository map.
///
/// Per-file problems during a scan are not errors; they become
/// `ScanWarning`s and the scan carries on.
#[derive(Debug, Error)]
pub enum MapError {
    /// Reading the project root or writing the report failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `repomap.toml` exists but does not parse.
    #[error("invalid config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// `neira-app.json` exists but does not parse.
    #[error("invalid manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MapError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

/// Errors raised by the `export` command and its subprocess runner.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("`{0}` is not installed or not on PATH")]
    ToolMissing(String),

    #[error("failed to spawn `{tool}`: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("export tool exited with code {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("unknown export profile `{0}`")]
    UnknownProfile(String),

    #[error("no project root found above {}", .0.display())]
    NoProjectRoot(PathBuf),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
