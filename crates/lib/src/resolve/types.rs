//! Remote references and their resolved form.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ApiError;
use crate::consts::DEFAULT_LIBRARY_TYPE;

fn default_library_type() -> String {
  DEFAULT_LIBRARY_TYPE.to_string()
}

/// A remote resolved to a concrete, deployed entry URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDependency {
  pub application_uid: String,
  /// Name the consuming bundle refers to the remote by.
  pub name: String,
  pub remote_entry_url: String,
  /// URL declared in the build configuration, kept as a fallback.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default_url: Option<String>,
  #[serde(default = "default_library_type")]
  pub library_type: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
}

impl ResolvedDependency {
  /// Entry for a remote that was not resolved, pointing at its declared URL.
  ///
  /// `None` when the declaration carries no URL to fall back to.
  pub fn declared(reference: &RemoteReference, application_uid: impl Into<String>) -> Option<Self> {
    let url = reference.remote_url.as_ref()?;
    Some(Self {
      application_uid: application_uid.into(),
      name: reference.key.clone(),
      remote_entry_url: url.clone(),
      default_url: Some(url.clone()),
      library_type: default_library_type(),
      version: None,
    })
  }

  /// Entry URL the runtime should load when no override is present.
  pub fn entry_url(&self) -> &str {
    if self.remote_entry_url.is_empty() {
      self.default_url.as_deref().unwrap_or_default()
    } else {
      &self.remote_entry_url
    }
  }
}

/// A remote as declared by the build configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteReference {
  /// Key the remote is declared under.
  pub key: String,
  /// Application name to resolve.
  pub name: String,
  pub version: String,
  /// URL given in the declaration, if any.
  pub remote_url: Option<String>,
  /// Set when the reference is fully qualified (`name.project.org@version`).
  pub project: Option<String>,
  pub org: Option<String>,
}

/// A remote that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not resolve remote {name}@{version} ({application_uid}) in project `{project}` of org `{org}`: {reason}")]
pub struct ResolutionError {
  pub name: String,
  pub version: String,
  pub project: String,
  pub org: String,
  pub application_uid: String,
  pub reason: ResolutionFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionFailure {
  #[error("network error: {0}")]
  Network(String),

  #[error("remote registry answered HTTP {0}")]
  Status(u16),

  #[error("malformed response: {0}")]
  Malformed(String),
}

impl From<ApiError> for ResolutionFailure {
  fn from(err: ApiError) -> Self {
    match err {
      ApiError::Status { status, .. } => ResolutionFailure::Status(status),
      ApiError::Malformed { message, .. } => ResolutionFailure::Malformed(message),
      other => ResolutionFailure::Network(other.to_string()),
    }
  }
}
