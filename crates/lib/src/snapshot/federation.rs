//! Federation configuration as extracted by a build-tool adapter.
//!
//! Shared dependencies arrive in whichever shape the host tool uses: a list
//! of names, a map of name to version or config, or an `additionalShared`
//! list of objects. [`FederationConfig::shared_dependencies`] folds them into
//! one sorted list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FederationConfig {
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub filename: Option<String>,
  /// Remote key to declared value (`name@url`, URL or version).
  #[serde(default)]
  pub remotes: BTreeMap<String, String>,
  /// Exposed module key (e.g. `./Button`) to source file.
  #[serde(default)]
  pub exposes: BTreeMap<String, String>,
  #[serde(default)]
  pub shared: Option<SharedConfig>,
  #[serde(default)]
  pub additional_shared: Vec<AdditionalShared>,
  /// Remote modules the build imports, as observed by the adapter.
  #[serde(default)]
  pub consumed: Vec<ConsumedModule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SharedConfig {
  Names(Vec<String>),
  Map(BTreeMap<String, SharedEntry>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SharedEntry {
  Version(String),
  Config(SharedEntryConfig),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedEntryConfig {
  #[serde(default)]
  pub required_version: Option<String>,
  #[serde(default)]
  pub version: Option<String>,
  #[serde(default)]
  pub singleton: bool,
}

impl SharedEntryConfig {
  fn declared_version(&self) -> Option<&str> {
    self.required_version.as_deref().or(self.version.as_deref())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalShared {
  pub package_name: String,
  #[serde(default)]
  pub shared_config: Option<SharedEntryConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumedModule {
  pub remote: String,
  pub module: String,
  #[serde(default)]
  pub used_in: Vec<String>,
}

/// A shared library and the version the federation config declares for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedDependency {
  pub name: String,
  pub declared_version: Option<String>,
}

impl FederationConfig {
  pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(content)
  }

  /// Every shared library across all declaration shapes, sorted by name.
  ///
  /// A version declared in any shape fills in a library first listed without one.
  pub fn shared_dependencies(&self) -> Vec<SharedDependency> {
    let mut shared: BTreeMap<&str, Option<&str>> = BTreeMap::new();

    match &self.shared {
      Some(SharedConfig::Names(names)) => {
        for name in names {
          add_shared(&mut shared, name, None);
        }
      }
      Some(SharedConfig::Map(map)) => {
        for (name, entry) in map {
          let version = match entry {
            SharedEntry::Version(version) => Some(version.as_str()),
            SharedEntry::Config(config) => config.declared_version(),
          };
          add_shared(&mut shared, name, version);
        }
      }
      None => {}
    }
    for extra in &self.additional_shared {
      let version = extra.shared_config.as_ref().and_then(SharedEntryConfig::declared_version);
      add_shared(&mut shared, &extra.package_name, version);
    }

    shared
      .into_iter()
      .map(|(name, version)| SharedDependency {
        name: name.to_string(),
        declared_version: version.map(str::to_string),
      })
      .collect()
  }
}

fn add_shared<'a>(shared: &mut BTreeMap<&'a str, Option<&'a str>>, name: &'a str, version: Option<&'a str>) {
  let entry = shared.entry(name).or_insert(None);
  if entry.is_none() {
    *entry = version;
  }
}
