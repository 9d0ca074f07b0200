//! Injecting resolved remotes into emitted bundles and redirecting them at runtime.

use std::collections::BTreeMap;

use zephyr_lib::consts::{MANIFEST_URL_PLACEHOLDER, REMOTES_MAP_PLACEHOLDER};
use zephyr_lib::manifest::ZephyrManifest;
use zephyr_lib::resolve::ResolvedDependency;
use zephyr_lib::runtime::{RemoteEntry, RemoteResolver, SessionOverrides, UrlSource, inject_remote_map};

fn resolved(name: &str, uid: &str, url: &str) -> ResolvedDependency {
  ResolvedDependency {
    application_uid: uid.to_string(),
    name: name.to_string(),
    remote_entry_url: url.to_string(),
    default_url: None,
    library_type: "module".to_string(),
    version: Some("1.0.0".to_string()),
  }
}

fn remotes() -> BTreeMap<String, ResolvedDependency> {
  BTreeMap::from([(
    "cart".to_string(),
    resolved("cart", "cart.storefront.acme", "https://edge.test/cart/1.0.0/remoteEntry.js"),
  )])
}

fn injected_map(bundle: &str) -> String {
  bundle
    .lines()
    .find_map(|line| line.strip_prefix("const remotes = "))
    .and_then(|rest| rest.strip_suffix(';'))
    .unwrap()
    .to_string()
}

#[test]
fn injected_bundle_drives_the_runtime_resolver() {
  let bundle = format!("const remotes = {REMOTES_MAP_PLACEHOLDER};\nconst manifestUrl = {MANIFEST_URL_PLACEHOLDER};\n");

  let substitution = inject_remote_map(&bundle, &remotes(), Some("/zephyr-manifest.json")).unwrap();
  assert_eq!(substitution.replaced, 2);
  assert!(substitution.text.contains(r#"const manifestUrl = "/zephyr-manifest.json";"#));

  let mut resolver = RemoteResolver::from_injected(&injected_map(&substitution.text), SessionOverrides::new()).unwrap();
  let mut remote = RemoteEntry {
    name: "cart".to_string(),
    entry: "http://localhost:3001/remoteEntry.js".to_string(),
  };
  let rewrite = resolver.before_request(&mut remote).unwrap();

  assert_eq!(rewrite.source, UrlSource::Embedded);
  assert_eq!(remote.entry, "https://edge.test/cart/1.0.0/remoteEntry.js");
  assert!(resolver.before_request(&mut remote).is_none());
}

#[test]
fn session_override_beats_manifest_and_embedded_map() {
  let published = ZephyrManifest::new(
    [resolved("cart", "cart.storefront.acme", "https://edge.test/cart/1.1.0/remoteEntry.js")],
    BTreeMap::new(),
  );
  let mut overrides = SessionOverrides::new();
  overrides.set("cart.storefront.acme", "https://edge.test/cart/0.9.0/remoteEntry.js");

  let mut resolver = RemoteResolver::new(remotes(), overrides).with_manifest(published.clone());
  let mut remote = RemoteEntry {
    name: "cart".to_string(),
    entry: String::new(),
  };
  let rewrite = resolver.before_request(&mut remote).unwrap();
  assert_eq!(rewrite.source, UrlSource::SessionOverride);
  assert_eq!(remote.entry, "https://edge.test/cart/0.9.0/remoteEntry.js");

  let mut without_override = RemoteResolver::new(remotes(), SessionOverrides::new()).with_manifest(published);
  let rewrite = without_override.before_request(&mut remote).unwrap();
  assert_eq!(rewrite.source, UrlSource::Manifest);
  assert_eq!(remote.entry, "https://edge.test/cart/1.1.0/remoteEntry.js");
}
