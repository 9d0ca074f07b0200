//! `package.json` discovery and the fields the deploy pipeline reads.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

const PACKAGE_JSON: &str = "package.json";

/// The subset of `package.json` used for identity, overrides and pinned remotes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub version: Option<String>,
  #[serde(default)]
  pub dependencies: BTreeMap<String, String>,
  #[serde(default)]
  pub dev_dependencies: BTreeMap<String, String>,
  #[serde(default)]
  pub peer_dependencies: BTreeMap<String, String>,
  #[serde(default)]
  pub optional_dependencies: BTreeMap<String, String>,
  /// Pinned remote versions, keyed by remote name.
  #[serde(default, rename = "zephyr:dependencies")]
  pub zephyr_dependencies: BTreeMap<String, String>,
}

/// Name and version of the application being deployed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationProperties {
  pub name: String,
  pub version: String,
}

impl PackageManifest {
  /// Find the closest `package.json`, starting at `start` and walking up.
  pub fn find(start: &Path) -> Result<PathBuf, ConfigError> {
    start
      .ancestors()
      .map(|dir| dir.join(PACKAGE_JSON))
      .find(|candidate| candidate.is_file())
      .ok_or_else(|| ConfigError::PackageJsonNotFound(start.to_path_buf()))
  }

  /// Load the closest `package.json` to `start`.
  pub fn load(start: &Path) -> Result<(Self, PathBuf), ConfigError> {
    let path = Self::find(start)?;
    debug!(path = %path.display(), "loading package.json");
    let content = fs::read_to_string(&path).map_err(|e| ConfigError::PackageJsonInvalid {
      path: path.clone(),
      message: e.to_string(),
    })?;
    let manifest = Self::parse(&content, &path)?;
    Ok((manifest, path))
  }

  pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
    serde_json::from_str(content).map_err(|e| ConfigError::PackageJsonInvalid {
      path: path.to_path_buf(),
      message: e.to_string(),
    })
  }

  /// Validate that the manifest names and versions the application.
  pub fn application_properties(&self, path: &Path) -> Result<ApplicationProperties, ConfigError> {
    let name = non_empty(self.name.as_deref()).ok_or_else(|| ConfigError::MissingPackageName(path.to_path_buf()))?;
    let version =
      non_empty(self.version.as_deref()).ok_or_else(|| ConfigError::MissingPackageVersion(path.to_path_buf()))?;
    Ok(ApplicationProperties {
      name: name.to_string(),
      version: version.to_string(),
    })
  }

  /// Declared version of `name`, searching regular, peer, optional, then dev dependencies.
  pub fn dependency_version(&self, name: &str) -> Option<&str> {
    [
      &self.dependencies,
      &self.peer_dependencies,
      &self.optional_dependencies,
      &self.dev_dependencies,
    ]
    .into_iter()
    .find_map(|deps| deps.get(name))
    .map(String::as_str)
  }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
  value.map(str::trim).filter(|v| !v.is_empty())
}
