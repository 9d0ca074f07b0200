//! Application identity: who is deploying what, from where.

pub mod git;
pub mod package;
pub mod uid;

pub use git::{GitInfo, parse_git_remote};
pub use package::{ApplicationProperties, PackageManifest};
pub use uid::{application_uid, normalize_segment, split_application_uid};

use crate::consts::ENV_CI;

/// The resolved identity of the application being deployed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationIdentity {
  pub name: String,
  pub version: String,
  pub org: String,
  pub project: String,
  pub application_uid: String,
}

impl ApplicationIdentity {
  pub fn new(properties: &ApplicationProperties, git: &GitInfo) -> Self {
    Self {
      name: properties.name.clone(),
      version: properties.version.clone(),
      org: git.org.clone(),
      project: git.project.clone(),
      application_uid: application_uid(&git.org, &git.project, &properties.name),
    }
  }
}

/// Whether the process runs under a CI system.
pub fn is_ci() -> bool {
  std::env::var(ENV_CI)
    .map(|value| !matches!(value.trim(), "" | "0" | "false"))
    .unwrap_or(false)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil;
  use serial_test::serial;

  #[test]
  fn identity_combines_package_and_git() {
    let properties = ApplicationProperties {
      name: "Storefront".to_string(),
      version: "1.0.0".to_string(),
    };
    let identity = ApplicationIdentity::new(&properties, &testutil::git_info());
    assert_eq!(identity.application_uid, "storefront.storefront.acme");
    assert_eq!(identity.name, "Storefront");
  }

  #[test]
  #[serial]
  fn ci_detection_follows_env() {
    temp_env::with_var(ENV_CI, Some("true"), || assert!(is_ci()));
    temp_env::with_var(ENV_CI, Some("false"), || assert!(!is_ci()));
    temp_env::with_var(ENV_CI, None::<&str>, || assert!(!is_ci()));
  }
}
