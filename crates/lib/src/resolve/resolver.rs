//! Dependency resolution against the remote registry.
//!
//! Lookups are keyed by `(application_uid, version)`. Concurrent lookups for
//! the same key share one request, and a finished lookup is reused for the
//! rest of the build.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::api::ZephyrClient;
use crate::identity::application_uid;
use crate::util::flight::SingleFlight;

use super::parse::{apply_pin, parse_remote_version};
use super::types::{RemoteReference, ResolutionError, ResolutionFailure, ResolvedDependency};

type Lookup = SingleFlight<Result<ResolvedDependency, ResolutionFailure>>;

/// Org and project unqualified remote names are resolved in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionScope {
  pub org: String,
  pub project: String,
  pub build_target: Option<String>,
}

impl ResolutionScope {
  /// UID `reference` resolves to, qualified by this scope unless it names its own project and org.
  pub fn application_uid(&self, reference: &RemoteReference) -> String {
    let org = reference.org.as_deref().unwrap_or(&self.org);
    let project = reference.project.as_deref().unwrap_or(&self.project);
    application_uid(org, project, &reference.name)
  }
}

pub struct DependencyResolver {
  client: ZephyrClient,
  scope: ResolutionScope,
  lookups: Mutex<HashMap<(String, String), Arc<Lookup>>>,
}

impl DependencyResolver {
  pub fn new(client: ZephyrClient, scope: ResolutionScope) -> Self {
    Self {
      client,
      scope,
      lookups: Mutex::new(HashMap::new()),
    }
  }

  fn lookup(&self, uid: &str, version: &str) -> Arc<Lookup> {
    let mut lookups = self.lookups.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(lookups.entry((uid.to_string(), version.to_string())).or_default())
  }

  /// Number of `(application_uid, version)` lookups held.
  pub fn cached_lookups(&self) -> usize {
    self.lookups.lock().unwrap_or_else(PoisonError::into_inner).len()
  }

  /// Drop every memoized lookup. Later calls hit the registry again.
  pub fn clear_cache(&self) -> usize {
    let mut lookups = self.lookups.lock().unwrap_or_else(PoisonError::into_inner);
    let dropped = lookups.len();
    lookups.clear();
    dropped
  }

  /// Resolve one remote.
  pub async fn resolve(&self, reference: &RemoteReference) -> Result<ResolvedDependency, ResolutionError> {
    let org = reference.org.as_deref().unwrap_or(&self.scope.org);
    let project = reference.project.as_deref().unwrap_or(&self.scope.project);
    let uid = self.scope.application_uid(reference);

    let lookup = self.lookup(&uid, &reference.version);
    let outcome = lookup
      .run(|| async {
        debug!(application_uid = %uid, version = %reference.version, "resolving remote");
        self
          .client
          .resolve_dependency(&uid, &reference.version, self.scope.build_target.as_deref())
          .await
          .map_err(ResolutionFailure::from)
          .and_then(validate)
      })
      .await
      .clone();

    match outcome {
      Ok(resolved) => Ok(ResolvedDependency {
        name: reference.key.clone(),
        application_uid: if resolved.application_uid.is_empty() {
          uid
        } else {
          resolved.application_uid.clone()
        },
        default_url: reference.remote_url.clone().or(resolved.default_url.clone()),
        ..resolved
      }),
      Err(reason) => Err(ResolutionError {
        name: reference.name.clone(),
        version: reference.version.clone(),
        project: project.to_string(),
        org: org.to_string(),
        application_uid: uid,
        reason,
      }),
    }
  }

  /// Resolve every reference in parallel. Results keep the input order.
  pub async fn resolve_all(
    self: &Arc<Self>,
    references: Vec<RemoteReference>,
  ) -> Vec<(RemoteReference, Result<ResolvedDependency, ResolutionError>)> {
    let total = references.len();
    let mut set = JoinSet::new();
    for (index, reference) in references.into_iter().enumerate() {
      let resolver = Arc::clone(self);
      set.spawn(async move {
        let result = resolver.resolve(&reference).await;
        (index, reference, result)
      });
    }

    let mut results = Vec::with_capacity(total);
    while let Some(joined) = set.join_next().await {
      match joined {
        Ok(entry) => results.push(entry),
        Err(e) => error!(error = %e, "remote resolution task panicked"),
      }
    }
    results.sort_by_key(|(index, _, _)| *index);

    let failed = results.iter().filter(|(_, _, r)| r.is_err()).count();
    info!(remotes = total, resolved = total - failed, failed, "resolved remotes");

    results.into_iter().map(|(_, reference, result)| (reference, result)).collect()
  }
}

fn validate(resolved: ResolvedDependency) -> Result<ResolvedDependency, ResolutionFailure> {
  if resolved.remote_entry_url.is_empty() && resolved.default_url.is_none() {
    return Err(ResolutionFailure::Malformed("response has no remote_entry_url".to_string()));
  }
  Ok(resolved)
}

/// Build the references for a build from its declared remotes and its pins.
///
/// Pins may qualify a declared remote or add one the configuration does not
/// declare. Output is sorted by key.
pub fn remote_references(remotes: &BTreeMap<String, String>, pins: &BTreeMap<String, String>) -> Vec<RemoteReference> {
  let mut references: BTreeMap<&str, RemoteReference> = remotes
    .iter()
    .map(|(key, value)| (key.as_str(), parse_remote_version(key, value)))
    .collect();

  for (key, pin) in pins {
    let declared = references.remove(key.as_str());
    references.insert(key.as_str(), apply_pin(declared, key, pin));
  }

  references.into_values().collect()
}
