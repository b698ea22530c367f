// src/config.rs
//! `repomap.toml` at the project root. Every key is optional; CLI flags win
//! over file values, built-in defaults fill the rest.
//!
//! ```toml
//! include = ["src/**/*.ts", "**/*.py"]
//! exclude = ["**/generated/**"]
//! output = "docs/REPOSITORY_MAP.txt"
//! respect_gitignore = true
//! ```

use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{
    error::{MapError, Result},
    scan::ScanConfig,
};

pub const CONFIG_FILE: &str = "repomap.toml";
pub const DEFAULT_OUTPUT: &str = "REPOSITORY_MAP.txt";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub output: Option<PathBuf>,
    pub respect_gitignore: Option<bool>,
}

impl MapConfig {
    /// Reads `<root>/repomap.toml`. A missing file is the empty config.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(MapError::io(path, e)),
        };
        let cfg = toml::from_str(&text).map_err(|source| MapError::Config { path: path.clone(), source })?;
        debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    /// Field-wise overlay: values set in `over` replace ours.
    #[must_use]
    pub fn overlay(self, over: MapConfig) -> Self {
        Self {
            include: over.include.or(self.include),
            exclude: over.exclude.or(self.exclude),
            output: over.output.or(self.output),
            respect_gitignore: over.respect_gitignore.or(self.respect_gitignore),
        }
    }

    pub fn scan_config(&self) -> ScanConfig {
        let defaults = ScanConfig::default();
        ScanConfig {
            include: self.include.clone().unwrap_or(defaults.include),
            exclude: self.exclude.clone().unwrap_or(defaults.exclude),
            respect_gitignore: self.respect_gitignore.unwrap_or(defaults.respect_gitignore),
        }
    }

    /// Output path; relative paths resolve against `cwd`.
    pub fn output_path(&self, cwd: &Path) -> PathBuf {
        let out = self.output.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
        if out.is_absolute() { out } else { cwd.join(out) }
    }
}
