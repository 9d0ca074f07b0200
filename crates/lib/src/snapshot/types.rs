use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::assets::AssetRef;
use crate::resolve::ResolvedDependency;
use crate::util::hash::ContentHash;

/// The deployable description of one build, sent as the build-stats payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSnapshot {
  /// `{application_uid}_{user}_{build_id}`
  pub id: String,
  pub application_uid: String,
  pub name: String,
  /// `{package_version}-{user}.{build_id}`
  pub version: String,
  pub package_version: String,
  pub org: String,
  pub project: String,
  pub build_id: String,
  pub git: GitSnapshot,
  pub overrides: Vec<SharedOverride>,
  pub consumes: Vec<ConsumedRemote>,
  pub modules: Vec<ExposedModule>,
  pub dependencies: Vec<ResolvedDependency>,
  pub assets: BTreeMap<ContentHash, AssetRef>,
  pub build_hash: ContentHash,
  pub context: SnapshotContext,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSnapshot {
  pub name: String,
  pub email: String,
  pub branch: String,
  pub commit: String,
  pub tags: Vec<String>,
}

/// Version pin for one shared library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedOverride {
  pub id: String,
  pub name: String,
  pub version: String,
  pub location: String,
  #[serde(rename = "applicationID")]
  pub application_id: String,
}

/// A remote module this build imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumedRemote {
  #[serde(rename = "consumingApplicationID")]
  pub consuming_application_id: String,
  #[serde(rename = "applicationID")]
  pub application_id: String,
  pub name: String,
  #[serde(rename = "usedIn")]
  pub used_in: Vec<String>,
}

/// A module this build exposes to other applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposedModule {
  pub id: String,
  pub name: String,
  #[serde(rename = "applicationID")]
  pub application_id: String,
  pub file: String,
  pub requires: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotContext {
  #[serde(rename = "isCI")]
  pub is_ci: bool,
  /// Build tool integration that produced the snapshot.
  pub builder: String,
}
