use serde::Serialize;
use thiserror::Error;

use crate::api::UploadResult;
use crate::error::ErrorCode;
use crate::util::hash::ContentHash;

use super::pool::TaskAborted;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
  /// One asset (or the batch it belonged to) could not be uploaded.
  #[error("failed to upload asset {path} ({hash}): {message}")]
  Asset {
    path: String,
    hash: String,
    message: String,
  },

  /// The snapshot itself could not be uploaded. Fatal for the deploy.
  #[error("failed to upload build stats: {0}")]
  BuildStats(String),

  #[error(transparent)]
  Aborted(#[from] TaskAborted),
}

impl UploadError {
  pub fn code(&self) -> ErrorCode {
    match self {
      UploadError::BuildStats(_) => ErrorCode::BuildStatsUploadFailed,
      UploadError::Asset { .. } | UploadError::Aborted(_) => ErrorCode::AssetUploadFailed,
    }
  }

  pub fn is_fatal(&self) -> bool {
    matches!(self, UploadError::BuildStats(_))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployOutcome {
  Succeeded,
  SucceededWithWarnings,
}

/// What happened to one asset that needed uploading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetUploadOutcome {
  pub path: String,
  pub hash: ContentHash,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl AssetUploadOutcome {
  pub fn is_success(&self) -> bool {
    self.error.is_none()
  }
}

/// Result of a deploy that was not fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployReport {
  pub outcome: DeployOutcome,
  /// Uploaded assets in submission order.
  pub assets: Vec<AssetUploadOutcome>,
  pub warnings: Vec<String>,
  pub upload_result: UploadResult,
  /// Assets the edge already stored.
  pub skipped_assets: usize,
}

impl DeployReport {
  pub fn new(
    assets: Vec<AssetUploadOutcome>,
    warnings: Vec<String>,
    upload_result: UploadResult,
    skipped_assets: usize,
  ) -> Self {
    let mut report = Self {
      outcome: DeployOutcome::Succeeded,
      assets,
      warnings: Vec::new(),
      upload_result,
      skipped_assets,
    };
    for warning in warnings {
      report.add_warning(warning);
    }
    report
  }

  pub fn add_warning(&mut self, warning: impl Into<String>) {
    self.warnings.push(warning.into());
    self.outcome = DeployOutcome::SucceededWithWarnings;
  }

  pub fn failed_assets(&self) -> impl Iterator<Item = &AssetUploadOutcome> {
    self.assets.iter().filter(|a| !a.is_success())
  }
}
