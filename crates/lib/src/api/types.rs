//! Wire types for the deploy API.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::hash::ContentHash;

/// Every successful response wraps its payload in `{ "value": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
  pub value: T,
}

/// Per-application settings returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
  pub edge_url: String,
  pub username: String,
  #[serde(default)]
  pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BuildRegistration {
  #[serde(default)]
  pub build_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct MissingAssetsRequest<'a> {
  pub application_uid: &'a str,
  pub hashes: &'a [ContentHash],
}

#[derive(Debug, Deserialize)]
pub(crate) struct MissingAssets {
  #[serde(default)]
  pub missing: Vec<ContentHash>,
}

/// Result of a successful build-stats upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
  /// URLs the deployed build is reachable at.
  #[serde(default)]
  pub urls: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version_url: Option<String>,
}

/// A failed API call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
  #[error("invalid url `{url}`: {message}")]
  InvalidUrl { url: String, message: String },

  /// The request never produced a response (DNS, connect, timeout, ...).
  #[error("request to {url} failed: {message}")]
  Transport { url: String, message: String },

  #[error("HTTP {status} from {url}")]
  Status { url: String, status: u16, body: String },

  #[error("malformed response from {url}: {message}")]
  Malformed { url: String, message: String },
}
