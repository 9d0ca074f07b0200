//! Executable model of the runtime remote resolution protocol.
//!
//! Mirrors what the injected plugin does in the browser so the precedence
//! rules can be exercised from Rust: session override, then the published
//! manifest, then the embedded map, then whatever entry the remote declared.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::manifest::ZephyrManifest;
use crate::resolve::ResolvedDependency;

/// Per-session overrides keyed by `application_uid`.
pub trait OverrideStore {
  fn get(&self, application_uid: &str) -> Option<String>;
}

/// In-memory [`OverrideStore`], the equivalent of the browser session storage.
#[derive(Debug, Clone, Default)]
pub struct SessionOverrides {
  entries: HashMap<String, String>,
}

impl SessionOverrides {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set(&mut self, application_uid: impl Into<String>, url: impl Into<String>) {
    self.entries.insert(application_uid.into(), url.into());
  }

  pub fn remove(&mut self, application_uid: &str) -> Option<String> {
    self.entries.remove(application_uid)
  }
}

impl OverrideStore for SessionOverrides {
  fn get(&self, application_uid: &str) -> Option<String> {
    self.entries.get(application_uid).cloned()
  }
}

/// A remote as the federation runtime is about to request it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
  pub name: String,
  pub entry: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlSource {
  SessionOverride,
  Manifest,
  Embedded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
  pub url: String,
  pub source: UrlSource,
}

pub struct RemoteResolver<S> {
  embedded: BTreeMap<String, ResolvedDependency>,
  manifest: Option<ZephyrManifest>,
  overrides: S,
  visited: HashSet<String>,
}

impl<S: OverrideStore> RemoteResolver<S> {
  pub fn new(embedded: BTreeMap<String, ResolvedDependency>, overrides: S) -> Self {
    Self {
      embedded,
      manifest: None,
      overrides,
      visited: HashSet::new(),
    }
  }

  /// Build from the JSON object injected in place of the remotes-map placeholder.
  pub fn from_injected(json: &str, overrides: S) -> Result<Self, serde_json::Error> {
    Ok(Self::new(serde_json::from_str(json)?, overrides))
  }

  pub fn with_manifest(mut self, manifest: ZephyrManifest) -> Self {
    self.manifest = Some(manifest);
    self
  }

  pub fn overrides_mut(&mut self) -> &mut S {
    &mut self.overrides
  }

  pub fn is_visited(&self, name: &str) -> bool {
    self.visited.contains(name)
  }

  /// Rewrite `remote.entry` before it is requested.
  ///
  /// Returns `None` when the remote was already handled or nothing is known
  /// about it; the declared entry is left untouched in both cases.
  pub fn before_request(&mut self, remote: &mut RemoteEntry) -> Option<Rewrite> {
    if !self.visited.insert(remote.name.clone()) {
      return None;
    }

    let published = self.manifest.as_ref().and_then(|m| m.dependencies.get(&remote.name));
    let (resolved, source) = match published {
      Some(dep) => (dep, UrlSource::Manifest),
      None => (self.embedded.get(&remote.name)?, UrlSource::Embedded),
    };

    let rewrite = match self.overrides.get(&resolved.application_uid) {
      Some(url) => Rewrite {
        url,
        source: UrlSource::SessionOverride,
      },
      None => {
        let url = resolved.entry_url();
        if url.is_empty() {
          return None;
        }
        Rewrite {
          url: url.to_string(),
          source,
        }
      }
    };

    remote.entry = rewrite.url.clone();
    Some(rewrite)
  }
}
