//! Persisting a build: assets through the worker pool, then the snapshot.

use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use crate::api::ZephyrClient;
use crate::assets::{Asset, AssetsMap};
use crate::config::ZephyrConfig;
use crate::snapshot::BuildSnapshot;
use crate::util::hash::ContentHash;

use super::pool::run_pool;
use super::types::{AssetUploadOutcome, DeployReport, UploadError};

#[derive(Debug, Clone)]
pub struct UploadOrchestrator {
  client: ZephyrClient,
  concurrency: usize,
  batch_size: usize,
}

impl UploadOrchestrator {
  pub fn new(client: ZephyrClient, config: &ZephyrConfig) -> Self {
    Self {
      client,
      concurrency: config.upload_concurrency.max(1),
      batch_size: config.upload_batch_size.max(1),
    }
  }

  /// Upload the assets the edge is missing and the snapshot.
  ///
  /// Asset failures become warnings on the report. A failed snapshot upload
  /// is the only fatal outcome.
  pub async fn upload(
    &self,
    application_uid: &str,
    edge_url: &str,
    snapshot: &BuildSnapshot,
    assets: &AssetsMap,
  ) -> Result<DeployReport, UploadError> {
    let mut warnings = Vec::new();
    let hashes: Vec<ContentHash> = assets.hashes().cloned().collect();

    let pending: Vec<Asset> = match self.client.missing_assets(edge_url, application_uid, &hashes).await {
      Ok(missing) => {
        let missing: HashSet<ContentHash> = missing.into_iter().collect();
        assets.iter().filter(|a| missing.contains(&a.hash)).cloned().collect()
      }
      Err(e) => {
        warn!(error = %e, "missing-asset query failed, uploading every asset");
        warnings.push(format!("could not ask the edge which assets it has ({e}), uploaded all of them"));
        assets.iter().cloned().collect()
      }
    };
    let skipped_assets = assets.len() - pending.len();
    let pending_count = pending.len();
    debug!(pending = pending_count, skipped = skipped_assets, "planned asset upload");

    let batches: Vec<Vec<Asset>> = pending.chunks(self.batch_size).map(<[Asset]>::to_vec).collect();
    let layout: Vec<Vec<(String, ContentHash)>> = batches
      .iter()
      .map(|batch| batch.iter().map(|a| (a.path.clone(), a.hash.clone())).collect())
      .collect();

    let client = self.client.clone();
    let edge = edge_url.to_string();
    let uploads = run_pool(batches, self.concurrency, move |batch| {
      let client = client.clone();
      let edge = edge.clone();
      async move { upload_batch(&client, &edge, batch).await }
    });

    let (results, stats) = tokio::join!(uploads, self.client.upload_build_stats(snapshot));

    let upload_result = match stats {
      Ok(result) => result,
      Err(e) => {
        let err = UploadError::BuildStats(e.to_string());
        error!(error = %err, code = %err.code(), "build stats upload failed");
        return Err(err);
      }
    };

    let mut outcomes = Vec::with_capacity(pending_count);
    let mut failed = 0;
    for (files, result) in layout.into_iter().zip(results) {
      let error = result.err().map(|e| {
        warn!(error = %e, code = %e.code(), "asset upload failed");
        e.to_string()
      });
      if error.is_some() {
        failed += files.len();
      }
      outcomes.extend(files.into_iter().map(|(path, hash)| AssetUploadOutcome {
        path,
        hash,
        error: error.clone(),
      }));
    }
    if failed > 0 {
      warnings.push(format!("{failed} of {pending_count} assets failed to upload"));
    }

    info!(
      uploaded = pending_count - failed,
      failed,
      skipped = skipped_assets,
      "upload finished"
    );

    Ok(DeployReport::new(outcomes, warnings, upload_result, skipped_assets))
  }
}

async fn upload_batch(client: &ZephyrClient, edge_url: &str, batch: Vec<Asset>) -> Result<usize, UploadError> {
  for asset in &batch {
    client
      .upload_asset(edge_url, asset)
      .await
      .map_err(|e| UploadError::Asset {
        path: asset.path.clone(),
        hash: asset.hash.to_string(),
        message: e.to_string(),
      })?;
    debug!(path = %asset.path, size = asset.size, "uploaded asset");
  }
  Ok(batch.len())
}
