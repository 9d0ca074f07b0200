//! Error classification for the deploy pipeline.
//!
//! Each concern owns its error enum (`ConfigError`, `ResolutionError`,
//! `UploadError`, ...). [`ZephyrError`] wraps them at the engine boundary and
//! maps every failure onto a stable [`ErrorCode`] that user-facing output
//! prints next to the message.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::api::ApiError;
use crate::engine::LifecycleError;
use crate::manifest::ManifestError;
use crate::resolve::ResolutionError;
use crate::runtime::InjectError;
use crate::upload::UploadError;

/// Stable, documented error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
  PackageJsonNotFound,
  PackageJsonInvalid,
  MissingPackageName,
  MissingPackageVersion,
  GitUnavailable,
  GitRemoteOrigin,
  GitIdentityMissing,
  NoBuildId,
  MissingAuthToken,
  InvalidEnv,
  ResolutionFailed,
  AssetUploadFailed,
  BuildStatsUploadFailed,
  ApiRequestFailed,
  InvalidLifecycle,
  ManifestFailed,
  InjectFailed,
}

impl ErrorCode {
  pub fn as_str(self) -> &'static str {
    match self {
      ErrorCode::PackageJsonNotFound => "ZE10010",
      ErrorCode::PackageJsonInvalid => "ZE10011",
      ErrorCode::MissingPackageName => "ZE10012",
      ErrorCode::MissingPackageVersion => "ZE10013",
      ErrorCode::GitUnavailable => "ZE10014",
      ErrorCode::GitRemoteOrigin => "ZE10015",
      ErrorCode::GitIdentityMissing => "ZE10016",
      ErrorCode::NoBuildId => "ZE10017",
      ErrorCode::MissingAuthToken => "ZE10018",
      ErrorCode::InvalidEnv => "ZE10019",
      ErrorCode::ResolutionFailed => "ZE20010",
      ErrorCode::AssetUploadFailed => "ZE30010",
      ErrorCode::BuildStatsUploadFailed => "ZE30011",
      ErrorCode::ApiRequestFailed => "ZE30020",
      ErrorCode::InvalidLifecycle => "ZE40010",
      ErrorCode::ManifestFailed => "ZE40020",
      ErrorCode::InjectFailed => "ZE40030",
    }
  }
}

impl fmt::Display for ErrorCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Configuration problems detected before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
  /// No `package.json` in the context directory or any ancestor.
  #[error("package.json not found in {} or any parent directory", .0.display())]
  PackageJsonNotFound(PathBuf),

  #[error("failed to read {}: {message}", .path.display())]
  PackageJsonInvalid { path: PathBuf, message: String },

  #[error("package.json at {} has no `name`", .0.display())]
  MissingPackageName(PathBuf),

  #[error("package.json at {} has no `version`", .0.display())]
  MissingPackageVersion(PathBuf),

  /// `git` could not be spawned, or the directory has no commits.
  #[error("git information unavailable in {}: {message}", .dir.display())]
  GitUnavailable { dir: PathBuf, message: String },

  /// The origin remote is missing or has no `org/project` path.
  #[error("could not derive organization and project from git remote `{0}`")]
  GitRemoteOrigin(String),

  #[error("git user.name and user.email must be configured")]
  GitIdentityMissing,

  #[error("no build id returned for {application_uid}")]
  NoBuildId { application_uid: String },

  #[error("no authentication token found, set {0}")]
  MissingAuthToken(&'static str),

  #[error("invalid value for {var}: `{value}`")]
  InvalidEnv { var: String, value: String },
}

impl ConfigError {
  pub fn code(&self) -> ErrorCode {
    match self {
      ConfigError::PackageJsonNotFound(_) => ErrorCode::PackageJsonNotFound,
      ConfigError::PackageJsonInvalid { .. } => ErrorCode::PackageJsonInvalid,
      ConfigError::MissingPackageName(_) => ErrorCode::MissingPackageName,
      ConfigError::MissingPackageVersion(_) => ErrorCode::MissingPackageVersion,
      ConfigError::GitUnavailable { .. } => ErrorCode::GitUnavailable,
      ConfigError::GitRemoteOrigin(_) => ErrorCode::GitRemoteOrigin,
      ConfigError::GitIdentityMissing => ErrorCode::GitIdentityMissing,
      ConfigError::NoBuildId { .. } => ErrorCode::NoBuildId,
      ConfigError::MissingAuthToken(_) => ErrorCode::MissingAuthToken,
      ConfigError::InvalidEnv { .. } => ErrorCode::InvalidEnv,
    }
  }
}

/// Umbrella error returned by engine operations.
#[derive(Debug, Error)]
pub enum ZephyrError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Resolution(#[from] ResolutionError),

  #[error(transparent)]
  Upload(#[from] UploadError),

  #[error(transparent)]
  Api(#[from] ApiError),

  #[error(transparent)]
  Lifecycle(#[from] LifecycleError),

  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error(transparent)]
  Inject(#[from] InjectError),

  #[error("failed to read build output: {0}")]
  Io(#[from] std::io::Error),

  /// A memoized failure handed to every caller that awaited the same work.
  #[error("{0}")]
  Shared(Arc<ZephyrError>),
}

impl ZephyrError {
  pub fn code(&self) -> ErrorCode {
    match self {
      ZephyrError::Config(e) => e.code(),
      ZephyrError::Resolution(_) => ErrorCode::ResolutionFailed,
      ZephyrError::Upload(e) => e.code(),
      ZephyrError::Api(_) => ErrorCode::ApiRequestFailed,
      ZephyrError::Lifecycle(_) => ErrorCode::InvalidLifecycle,
      ZephyrError::Manifest(_) | ZephyrError::Io(_) => ErrorCode::ManifestFailed,
      ZephyrError::Inject(_) => ErrorCode::InjectFailed,
      ZephyrError::Shared(inner) => inner.code(),
    }
  }

  /// Whether the failure aborts a deploy. Unresolved remotes and individual
  /// asset failures are reported as warnings instead.
  pub fn is_fatal(&self) -> bool {
    match self {
      ZephyrError::Resolution(_) => false,
      ZephyrError::Upload(e) => e.is_fatal(),
      ZephyrError::Shared(inner) => inner.is_fatal(),
      _ => true,
    }
  }
}

impl From<Arc<ZephyrError>> for ZephyrError {
  fn from(shared: Arc<ZephyrError>) -> Self {
    ZephyrError::Shared(shared)
  }
}
