//! HTTP client for the deploy API and the edge.

use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::assets::Asset;
use crate::config::ZephyrConfig;
use crate::consts::USER_AGENT;
use crate::resolve::ResolvedDependency;
use crate::snapshot::BuildSnapshot;
use crate::util::hash::ContentHash;

use super::types::{
  ApiError, ApplicationConfig, BuildRegistration, Envelope, MissingAssets, MissingAssetsRequest, UploadResult,
};

/// Bearer-authenticated client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ZephyrClient {
  http: reqwest::Client,
  api_url: String,
  token: String,
}

impl ZephyrClient {
  pub fn new(config: &ZephyrConfig, token: String) -> Result<Self, ApiError> {
    let http = reqwest::Client::builder()
      .timeout(config.request_timeout)
      .user_agent(USER_AGENT)
      .build()
      .map_err(|e| ApiError::Transport {
        url: config.api_url.clone(),
        message: e.to_string(),
      })?;
    Ok(Self {
      http,
      api_url: config.api_url.clone(),
      token,
    })
  }

  pub fn api_url(&self) -> &str {
    &self.api_url
  }

  /// `GET {api}/v2/application/{uid}/config`
  pub async fn application_config(&self, application_uid: &str) -> Result<ApplicationConfig, ApiError> {
    let url = endpoint(&self.api_url, &["v2", "application", application_uid, "config"])?;
    self.send(self.http.get(url.clone()), &url).await
  }

  /// `POST {api}/v2/application/{uid}/builds`, returning the new build id.
  ///
  /// An empty id is returned as-is; the caller decides whether that is fatal.
  pub async fn register_build(&self, application_uid: &str) -> Result<String, ApiError> {
    let url = endpoint(&self.api_url, &["v2", "application", application_uid, "builds"])?;
    let registration: BuildRegistration = self.send(self.http.post(url.clone()), &url).await?;
    Ok(registration.build_id)
  }

  /// `GET {api}/resolve/{uid}/{version}`
  pub async fn resolve_dependency(
    &self,
    application_uid: &str,
    version: &str,
    build_target: Option<&str>,
  ) -> Result<ResolvedDependency, ApiError> {
    let mut url = endpoint(&self.api_url, &["resolve", application_uid, version])?;
    if let Some(target) = build_target {
      url.query_pairs_mut().append_pair("build_target", target);
    }
    self.send(self.http.get(url.clone()), &url).await
  }

  /// `POST {edge}/assets/missing`: which of `hashes` the edge does not store yet.
  pub async fn missing_assets(
    &self,
    edge_url: &str,
    application_uid: &str,
    hashes: &[ContentHash],
  ) -> Result<Vec<ContentHash>, ApiError> {
    let url = endpoint(edge_url, &["assets", "missing"])?;
    let body = MissingAssetsRequest {
      application_uid,
      hashes,
    };
    let response: MissingAssets = self.send(self.http.post(url.clone()).json(&body), &url).await?;
    Ok(response.missing)
  }

  /// `POST {edge}/upload?type=file&hash=..&filename=..` with the raw bytes.
  pub async fn upload_asset(&self, edge_url: &str, asset: &Asset) -> Result<(), ApiError> {
    let mut url = endpoint(edge_url, &["upload"])?;
    url
      .query_pairs_mut()
      .append_pair("type", "file")
      .append_pair("hash", asset.hash.as_str())
      .append_pair("filename", &asset.path);

    let request = self
      .http
      .post(url.clone())
      .header(CONTENT_TYPE, "application/octet-stream")
      .header("x-file-size", asset.size.to_string())
      .header("x-mime-type", asset.mime_type)
      .body(asset.buffer.to_vec());
    self.execute(request, &url).await.map(|_| ())
  }

  /// `POST {api}/v2/builds/stats` with the snapshot as JSON.
  pub async fn upload_build_stats(&self, snapshot: &BuildSnapshot) -> Result<UploadResult, ApiError> {
    let url = endpoint(&self.api_url, &["v2", "builds", "stats"])?;
    self.send(self.http.post(url.clone()).json(snapshot), &url).await
  }

  async fn execute(&self, request: RequestBuilder, url: &Url) -> Result<reqwest::Response, ApiError> {
    debug!(url = %url, "api request");
    let response = request
      .bearer_auth(&self.token)
      .send()
      .await
      .map_err(|e| ApiError::Transport {
        url: url.to_string(),
        message: e.to_string(),
      })?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(ApiError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body,
      });
    }
    Ok(response)
  }

  async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &Url) -> Result<T, ApiError> {
    let response = self.execute(request, url).await?;
    let envelope: Envelope<T> = response.json().await.map_err(|e| ApiError::Malformed {
      url: url.to_string(),
      message: e.to_string(),
    })?;
    Ok(envelope.value)
  }
}

/// Join `segments` onto `base`, percent-encoding each one as a path segment.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url, ApiError> {
  let invalid = |message: String| ApiError::InvalidUrl {
    url: base.to_string(),
    message,
  };
  let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
  url
    .path_segments_mut()
    .map_err(|_| invalid("cannot be a base url".to_string()))?
    .pop_if_empty()
    .extend(segments);
  Ok(url)
}
