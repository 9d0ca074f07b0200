//! The runtime manifest (`zephyr-manifest.json`).
//!
//! Written next to the build output and uploaded with it, so the runtime
//! resolver can fetch current remote URLs and public environment values
//! without a rebuild.

pub mod env_vars;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::assets::Asset;
use crate::consts::{MANIFEST_FILENAME, MANIFEST_FORMAT_VERSION};
use crate::resolve::ResolvedDependency;

pub use env_vars::EnvVarCollector;

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to serialize manifest: {0}")]
  Serialize(#[source] serde_json::Error),

  #[error("failed to parse manifest: {0}")]
  Parse(#[source] serde_json::Error),

  #[error("failed to write manifest to {}: {source}", .path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZephyrManifest {
  pub version: String,
  /// RFC 3339 creation time.
  pub timestamp: String,
  /// Resolved remotes keyed by the name the bundle uses.
  pub dependencies: BTreeMap<String, ResolvedDependency>,
  #[serde(rename = "zeVars")]
  pub ze_vars: BTreeMap<String, String>,
}

impl ZephyrManifest {
  pub fn new<I>(dependencies: I, ze_vars: BTreeMap<String, String>) -> Self
  where
    I: IntoIterator<Item = ResolvedDependency>,
  {
    Self {
      version: MANIFEST_FORMAT_VERSION.to_string(),
      timestamp: chrono::Utc::now().to_rfc3339(),
      dependencies: dependencies.into_iter().map(|dep| (dep.name.clone(), dep)).collect(),
      ze_vars,
    }
  }

  pub fn to_json(&self) -> Result<String, ManifestError> {
    serde_json::to_string_pretty(self).map_err(ManifestError::Serialize)
  }

  pub fn from_json(content: &str) -> Result<Self, ManifestError> {
    serde_json::from_str(content).map_err(ManifestError::Parse)
  }

  /// Write the manifest into `dir` atomically (temp file, then rename).
  pub fn write_to(&self, dir: &Path) -> Result<PathBuf, ManifestError> {
    let path = dir.join(MANIFEST_FILENAME);
    let temp_path = dir.join(format!("{MANIFEST_FILENAME}.tmp"));
    let write_err = |source| ManifestError::Write {
      path: path.clone(),
      source,
    };

    fs::create_dir_all(dir).map_err(write_err)?;
    let content = self.to_json()?;
    fs::write(&temp_path, &content).map_err(write_err)?;
    fs::rename(&temp_path, &path).map_err(write_err)?;

    debug!(path = %path.display(), dependencies = self.dependencies.len(), "wrote manifest");
    Ok(path)
  }

  /// The manifest as a deployable asset.
  pub fn to_asset(&self) -> Result<Asset, ManifestError> {
    Ok(Asset::new(MANIFEST_FILENAME, self.to_json()?.into_bytes(), "asset"))
  }
}
