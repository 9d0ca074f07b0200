//! Fixtures shared by unit tests.

use std::collections::BTreeMap;

use crate::identity::{GitInfo, PackageManifest};

pub fn git_info() -> GitInfo {
  GitInfo {
    name: "Jane Doe".to_string(),
    email: "jane@example.com".to_string(),
    branch: "main".to_string(),
    commit: "0123456789abcdef0123456789abcdef01234567".to_string(),
    tags: vec![],
    org: "acme".to_string(),
    project: "storefront".to_string(),
  }
}

pub fn package(name: &str, version: &str) -> PackageManifest {
  PackageManifest {
    name: Some(name.to_string()),
    version: Some(version.to_string()),
    ..Default::default()
  }
}

pub fn package_with_deps(name: &str, version: &str, deps: &[(&str, &str)]) -> PackageManifest {
  PackageManifest {
    dependencies: deps
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect::<BTreeMap<_, _>>(),
    ..package(name, version)
  }
}
