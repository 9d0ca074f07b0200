//! Snapshot assembly: a pure transform over already-collected build inputs.

use crate::assets::AssetsMap;
use crate::consts::FALLBACK_SHARED_VERSION;
use crate::identity::{ApplicationIdentity, GitInfo, PackageManifest, normalize_segment};
use crate::resolve::ResolvedDependency;

use super::federation::FederationConfig;
use super::types::{BuildSnapshot, ConsumedRemote, ExposedModule, GitSnapshot, SharedOverride, SnapshotContext};

/// Everything a snapshot is assembled from.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotInputs<'a> {
  pub identity: &'a ApplicationIdentity,
  pub git: &'a GitInfo,
  pub package: &'a PackageManifest,
  pub federation: &'a FederationConfig,
  pub resolved: &'a [ResolvedDependency],
  pub assets: &'a AssetsMap,
  /// Account name the API knows the deploying user by.
  pub username: &'a str,
  pub build_id: &'a str,
  pub builder: &'a str,
  pub is_ci: bool,
}

pub fn snapshot_id(application_uid: &str, username: &str, build_id: &str) -> String {
  format!(
    "{}_{}_{}",
    application_uid,
    normalize_segment(username),
    normalize_segment(build_id)
  )
}

pub fn snapshot_version(package_version: &str, username: &str, build_id: &str) -> String {
  format!(
    "{}-{}.{}",
    package_version,
    normalize_segment(username),
    normalize_segment(build_id)
  )
}

/// Assemble the snapshot. Identical inputs give an identical snapshot.
pub fn assemble_snapshot(inputs: &SnapshotInputs<'_>) -> BuildSnapshot {
  let identity = inputs.identity;
  let git = inputs.git;

  BuildSnapshot {
    id: snapshot_id(&identity.application_uid, inputs.username, inputs.build_id),
    application_uid: identity.application_uid.clone(),
    name: identity.name.clone(),
    version: snapshot_version(&identity.version, inputs.username, inputs.build_id),
    package_version: identity.version.clone(),
    org: identity.org.clone(),
    project: identity.project.clone(),
    build_id: inputs.build_id.to_string(),
    git: GitSnapshot {
      name: git.name.clone(),
      email: git.email.clone(),
      branch: git.branch.clone(),
      commit: git.commit.clone(),
      tags: git.tags.clone(),
    },
    overrides: shared_overrides(inputs.package, inputs.federation),
    consumes: consumed_remotes(&identity.name, inputs.federation),
    modules: exposed_modules(&identity.name, inputs.federation),
    dependencies: inputs.resolved.to_vec(),
    assets: inputs.assets.index(),
    build_hash: inputs.assets.build_hash(),
    context: SnapshotContext {
      is_ci: inputs.is_ci,
      builder: inputs.builder.to_string(),
    },
  }
}

/// Pin every shared library: the package's own dependency version wins over
/// the federation config, and `0.0.0` is used when neither has one.
pub fn shared_overrides(package: &PackageManifest, federation: &FederationConfig) -> Vec<SharedOverride> {
  federation
    .shared_dependencies()
    .into_iter()
    .map(|shared| {
      let version = package
        .dependency_version(&shared.name)
        .map(str::to_string)
        .or(shared.declared_version)
        .unwrap_or_else(|| FALLBACK_SHARED_VERSION.to_string());
      SharedOverride {
        id: shared.name.clone(),
        location: shared.name.clone(),
        application_id: shared.name.clone(),
        name: shared.name,
        version,
      }
    })
    .collect()
}

/// One entry per exposed module, with id `name:name`.
pub fn exposed_modules(application_name: &str, federation: &FederationConfig) -> Vec<ExposedModule> {
  let requires: Vec<String> = federation.shared_dependencies().into_iter().map(|s| s.name).collect();
  federation
    .exposes
    .iter()
    .map(|(key, file)| {
      let name = key.trim_start_matches("./").to_string();
      ExposedModule {
        id: format!("{name}:{name}"),
        name,
        application_id: application_name.to_string(),
        file: file.clone(),
        requires: requires.clone(),
      }
    })
    .collect()
}

pub fn consumed_remotes(application_name: &str, federation: &FederationConfig) -> Vec<ConsumedRemote> {
  let mut consumed: Vec<ConsumedRemote> = federation
    .consumed
    .iter()
    .map(|module| ConsumedRemote {
      consuming_application_id: application_name.to_string(),
      application_id: module.remote.clone(),
      name: module.module.trim_start_matches("./").to_string(),
      used_in: module.used_in.clone(),
    })
    .collect();
  consumed.sort_by(|a, b| (&a.application_id, &a.name).cmp(&(&b.application_id, &b.name)));
  consumed
}
