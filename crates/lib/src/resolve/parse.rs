//! Parsing declared remote values.
//!
//! A remote may be declared as a URL (`http://host/remoteEntry.js`), as
//! `name@url`, as `name@version`, or as a bare version. A fully-qualified
//! name `name.project.org` pins the remote to another project or org.

use crate::consts::DEFAULT_REMOTE_VERSION;
use crate::identity::split_application_uid;

use super::types::RemoteReference;

/// Parse the value declared under remote `key`.
pub fn parse_remote_version(key: &str, value: &str) -> RemoteReference {
  let value = value.trim();

  let (name, version, remote_url) = match value.find("://") {
    Some(scheme) => match value[..scheme].rfind('@') {
      Some(at) if at > 0 => (&value[..at], DEFAULT_REMOTE_VERSION, Some(&value[at + 1..])),
      _ => (key, DEFAULT_REMOTE_VERSION, Some(value)),
    },
    None => match value.rfind('@') {
      Some(at) if at > 0 => (&value[..at], &value[at + 1..], None),
      _ => (key, value, None),
    },
  };

  let version = if version.is_empty() { DEFAULT_REMOTE_VERSION } else { version };
  let (name, project, org) = match split_application_uid(name) {
    Some((name, project, org)) => (name, Some(project.to_string()), Some(org.to_string())),
    None => (name, None, None),
  };

  RemoteReference {
    key: key.to_string(),
    name: name.to_string(),
    version: version.to_string(),
    remote_url: remote_url.map(str::to_string),
    project,
    org,
  }
}

/// Apply a `zephyr:dependencies` pin to a declared reference.
///
/// The pin's name, version and qualification win; the declared URL is kept
/// as the fallback.
pub fn apply_pin(declared: Option<RemoteReference>, key: &str, pin: &str) -> RemoteReference {
  let pinned = parse_remote_version(key, pin);
  RemoteReference {
    remote_url: pinned
      .remote_url
      .clone()
      .or_else(|| declared.and_then(|d| d.remote_url)),
    ..pinned
  }
}
