//! The runtime plugin shipped inside consuming bundles.
//!
//! The plugin hooks remote loading: before a remote is requested it looks the
//! remote up in the manifest (when one is published) or the embedded map,
//! lets a session override keyed by `application_uid` win, and rewrites the
//! remote's entry URL. Each remote name is handled once per page.

use std::collections::BTreeMap;

use tracing::debug;

use crate::assets::{Asset, AssetsMap};
use crate::resolve::ResolvedDependency;

use super::placeholder::{InjectError, Placeholder, Resolver, Substitution, substitute, to_js_literal};

const RUNTIME_PLUGIN_SOURCE: &str = r#"function zephyrRuntimePlugin() {
  var remotesMap = __ZEPHYR_REMOTES_MAP__;
  var manifestUrl = __ZEPHYR_MANIFEST_URL__;
  var visited = new Set();
  var manifestPromise = null;

  function readOverride(applicationUid) {
    try {
      if (typeof window !== 'undefined' && window.sessionStorage) {
        return window.sessionStorage.getItem(applicationUid);
      }
    } catch (e) {}
    return null;
  }

  function loadManifest() {
    if (!manifestUrl || typeof fetch !== 'function') {
      return Promise.resolve(null);
    }
    if (!manifestPromise) {
      manifestPromise = fetch(manifestUrl)
        .then(function (res) { return res.ok ? res.json() : null; })
        .catch(function () { return null; });
    }
    return manifestPromise;
  }

  return {
    name: 'zephyr-runtime-remote-resolver',
    beforeRequest: function (args) {
      var remotes = (args.options && args.options.remotes) || [];
      return loadManifest().then(function (manifest) {
        var published = (manifest && manifest.dependencies) || {};
        remotes.forEach(function (remote) {
          if (visited.has(remote.name)) return;
          visited.add(remote.name);
          var resolved = published[remote.name] || remotesMap[remote.name];
          if (!resolved) return;
          var url = readOverride(resolved.application_uid) || resolved.remote_entry_url || resolved.default_url;
          if (url) remote.entry = url;
        });
        return args;
      });
    }
  };
}
"#;

/// Typed parameters for the runtime plugin.
#[derive(Debug, Clone, Copy)]
pub struct RuntimePluginTemplate<'a> {
  pub remotes: &'a BTreeMap<String, ResolvedDependency>,
  /// Where the published manifest is served from, if anywhere.
  pub manifest_url: Option<&'a str>,
}

impl<'a> RuntimePluginTemplate<'a> {
  pub fn new(remotes: &'a BTreeMap<String, ResolvedDependency>, manifest_url: Option<&'a str>) -> Self {
    Self { remotes, manifest_url }
  }

  /// The plugin source with both placeholders filled in.
  pub fn render(&self) -> Result<String, InjectError> {
    substitute(RUNTIME_PLUGIN_SOURCE, self).map(|s| s.text)
  }

  /// Fill the placeholders already present in emitted bundle text.
  pub fn inject(&self, bundle: &str) -> Result<Substitution, InjectError> {
    substitute(bundle, self)
  }

  /// Fill the placeholders in every text asset that carries one.
  ///
  /// Rewritten assets are hashed again, so the returned map addresses the
  /// bytes that get deployed. Also returns how many assets were rewritten.
  pub fn inject_assets(&self, assets: AssetsMap) -> Result<(AssetsMap, usize), InjectError> {
    let mut out = AssetsMap::new();
    let mut rewritten = 0;

    for asset in assets {
      let substitution = match placeholder_text(&asset) {
        Some(text) => Some(self.inject(text)?),
        None => None,
      };
      match substitution {
        Some(Substitution { text, replaced }) => {
          debug!(path = %asset.path, replaced, "filled runtime placeholders");
          rewritten += 1;
          out.insert(Asset::new(asset.path, text.into_bytes(), asset.kind));
        }
        None => {
          out.insert(asset);
        }
      }
    }

    Ok((out, rewritten))
  }
}

fn placeholder_text(asset: &Asset) -> Option<&str> {
  let text = std::str::from_utf8(&asset.buffer).ok()?;
  Placeholder::ALL.iter().any(|p| text.contains(p.token())).then_some(text)
}

impl Resolver for RuntimePluginTemplate<'_> {
  fn resolve(&self, placeholder: Placeholder) -> Result<String, InjectError> {
    match placeholder {
      Placeholder::RemotesMap => to_js_literal(placeholder, self.remotes),
      Placeholder::ManifestUrl => to_js_literal(placeholder, &self.manifest_url),
    }
  }
}

/// Replace the placeholders in `bundle`, reporting how many were rewritten.
pub fn inject_remote_map(
  bundle: &str,
  remotes: &BTreeMap<String, ResolvedDependency>,
  manifest_url: Option<&str>,
) -> Result<Substitution, InjectError> {
  RuntimePluginTemplate::new(remotes, manifest_url).inject(bundle)
}
