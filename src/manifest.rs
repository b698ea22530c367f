// src/manifest.rs
//! `neira-app.json` reader. Every field is optional here; checking the values
//! belongs to a separate validation step this crate does not ship.

use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};
use tracing::debug;

use crate::error::{MapError, Result};

pub const MANIFEST_FILE: &str = "neira-app.json";

/// Keys an app manifest is expected to carry.
pub const REQUIRED_KEYS: &[&str] = &["name", "version", "description", "author", "main"];

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct AppManifest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub main: Option<String>,
    pub icon: Option<String>,
    pub permissions: Option<Vec<String>>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    /// Keys not listed above, kept as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AppManifest {
    /// Required keys that are absent or empty, in `REQUIRED_KEYS` order.
    pub fn missing_metadata(&self) -> Vec<&'static str> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        let fields = [&self.name, &self.version, &self.description, &self.author, &self.main];
        REQUIRED_KEYS
            .iter()
            .zip(fields)
            .filter(|(_, v)| !present(v))
            .map(|(k, _)| *k)
            .collect()
    }
}

/// Reads `<dir>/neira-app.json`. `Ok(None)` when the file is absent.
pub fn read_manifest(dir: &Path) -> Result<Option<AppManifest>> {
    let path = dir.join(MANIFEST_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(MapError::io(path, e)),
    };
    let manifest: AppManifest =
        serde_json::from_str(&text).map_err(|source| MapError::Manifest { path: path.clone(), source })?;
    debug!(path = %path.display(), name = ?manifest.name, "manifest loaded");
    Ok(Some(manifest))
}
