//! The build lifecycle engine.
//!
//! One engine exists per build. Build tool hooks drive it through
//! `start_new_build`, `resolve_dependencies`, `upload_assets` and
//! `build_finished`. Hooks can fire several times and from several entry
//! points, so every side effect sits behind a one-shot guard.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use crate::api::{ApplicationConfig, TokenProvider, ZephyrClient};
use crate::config::{RemoteFailurePolicy, ZephyrConfig};
use crate::consts::MANIFEST_FILENAME;
use crate::error::{ConfigError, ErrorCode, ZephyrError};
use crate::identity::{ApplicationIdentity, GitInfo, PackageManifest, is_ci};
use crate::manifest::ZephyrManifest;
use crate::resolve::{DependencyResolver, ResolutionScope, ResolvedDependency, remote_references};
use crate::runtime::RuntimePluginTemplate;
use crate::snapshot::{FederationConfig, SnapshotInputs, assemble_snapshot};
use crate::upload::{DeployReport, UploadOrchestrator};
use crate::util::flight::SingleFlight;

use super::types::{EngineOptions, LifecycleError, LifecycleState, ResolutionSummary, UploadAssetsRequest};

type Shared<T> = Result<Arc<T>, Arc<ZephyrError>>;

/// States a started, unfinished build can be in.
const IN_PROGRESS: &[LifecycleState] = &[
  LifecycleState::BuildStarted,
  LifecycleState::DependenciesResolved,
  LifecycleState::AssetsUploaded,
];

pub struct ZephyrEngine {
  identity: ApplicationIdentity,
  package: PackageManifest,
  git: GitInfo,
  app_config: ApplicationConfig,
  build_id: String,
  builder: String,
  edge_url: String,
  config: ZephyrConfig,
  client: ZephyrClient,
  resolver: Arc<DependencyResolver>,
  state: Mutex<LifecycleState>,
  resolution: SingleFlight<Shared<ResolutionSummary>>,
  upload: SingleFlight<Shared<DeployReport>>,
}

impl ZephyrEngine {
  /// Discover the application identity and register a new build.
  ///
  /// Configuration is checked before the first network call, so a missing
  /// token or a broken `package.json` never reaches the API.
  pub async fn create(options: EngineOptions, tokens: &dyn TokenProvider) -> Result<Self, ZephyrError> {
    let EngineOptions {
      context_dir,
      builder,
      config,
      package,
      git,
    } = options;

    let token = tokens.token()?;
    let (package, package_path) = match package {
      Some(package) => (package, context_dir.join("package.json")),
      None => PackageManifest::load(&context_dir)?,
    };
    let properties = package.application_properties(&package_path)?;
    let git = match git {
      Some(git) => git,
      None => GitInfo::discover(&context_dir).await?,
    };
    let identity = ApplicationIdentity::new(&properties, &git);
    debug!(application_uid = %identity.application_uid, builder = %builder, "creating engine");

    let client = ZephyrClient::new(&config, token)?;
    let app_config = client.application_config(&identity.application_uid).await?;
    let build_id = client.register_build(&identity.application_uid).await?;
    if build_id.trim().is_empty() {
      return Err(
        ConfigError::NoBuildId {
          application_uid: identity.application_uid.clone(),
        }
        .into(),
      );
    }
    let edge_url = config.edge_url.clone().unwrap_or_else(|| app_config.edge_url.clone());
    info!(application_uid = %identity.application_uid, build_id = %build_id, "registered build");

    let resolver = Arc::new(DependencyResolver::new(
      client.clone(),
      ResolutionScope {
        org: git.org.clone(),
        project: git.project.clone(),
        build_target: config.build_target.clone(),
      },
    ));

    Ok(Self {
      identity,
      package,
      git,
      app_config,
      build_id,
      builder,
      edge_url,
      config,
      client,
      resolver,
      state: Mutex::new(LifecycleState::Created),
      resolution: SingleFlight::new(),
      upload: SingleFlight::new(),
    })
  }

  pub fn identity(&self) -> &ApplicationIdentity {
    &self.identity
  }

  pub fn build_id(&self) -> &str {
    &self.build_id
  }

  pub fn application_config(&self) -> &ApplicationConfig {
    &self.app_config
  }

  /// Edge the assets go to: the configured override, else the application's.
  pub fn edge_url(&self) -> &str {
    &self.edge_url
  }

  pub fn state(&self) -> LifecycleState {
    *self.lock_state()
  }

  fn lock_state(&self) -> MutexGuard<'_, LifecycleState> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Move `Created` to `BuildStarted`. Later calls during the same build are no-ops.
  pub fn start_new_build(&self) -> Result<(), ZephyrError> {
    let mut state = self.lock_state();
    match *state {
      LifecycleState::Created => {
        *state = LifecycleState::BuildStarted;
        info!(application_uid = %self.identity.application_uid, build_id = %self.build_id, "build started");
        Ok(())
      }
      LifecycleState::BuildStarted | LifecycleState::DependenciesResolved | LifecycleState::AssetsUploaded => Ok(()),
      terminal => Err(
        LifecycleError::InvalidTransition {
          operation: "start a new build",
          state: terminal,
        }
        .into(),
      ),
    }
  }

  /// Resolve every remote the federation config and the package pins declare.
  ///
  /// Runs once. Later calls get the first result whatever config they pass.
  pub async fn resolve_dependencies(&self, federation: &FederationConfig) -> Result<Arc<ResolutionSummary>, ZephyrError> {
    if let Some(done) = self.resolution.get() {
      return done.clone().map_err(ZephyrError::from);
    }
    self.require_state("resolve dependencies", IN_PROGRESS)?;

    self
      .resolution
      .run(|| async {
        self
          .perform_resolution(federation)
          .await
          .map(Arc::new)
          .map_err(|e| self.fail(e))
      })
      .await
      .clone()
      .map_err(ZephyrError::from)
  }

  async fn perform_resolution(&self, federation: &FederationConfig) -> Result<ResolutionSummary, ZephyrError> {
    let references = remote_references(&federation.remotes, &self.package.zephyr_dependencies);
    let mut summary = ResolutionSummary::default();

    for (reference, result) in self.resolver.resolve_all(references).await {
      match result {
        Ok(resolved) => summary.dependencies.push(resolved),
        Err(e) if self.config.remote_failure_policy == RemoteFailurePolicy::Fail => return Err(e.into()),
        Err(e) => {
          warn!(remote = %reference.key, error = %e, code = %ErrorCode::ResolutionFailed, "remote left unresolved");
          summary
            .dependencies
            .extend(ResolvedDependency::declared(&reference, e.application_uid.as_str()));
          summary.unresolved.push(e);
        }
      }
    }

    self.advance(LifecycleState::BuildStarted, LifecycleState::DependenciesResolved);
    Ok(summary)
  }

  /// Write the manifest, assemble the snapshot and upload everything.
  ///
  /// Only the first call uploads. Every call, including ones racing the
  /// first, receives the same report.
  pub async fn upload_assets(&self, request: UploadAssetsRequest) -> Result<Arc<DeployReport>, ZephyrError> {
    if let Some(done) = self.upload.get() {
      return done.clone().map_err(ZephyrError::from);
    }
    // AssetsUploaded is accepted: the report is stored right after the state moves.
    self.require_state("upload assets", IN_PROGRESS)?;

    self
      .upload
      .run(|| async move { self.perform_upload(request).await.map(Arc::new).map_err(|e| self.fail(e)) })
      .await
      .clone()
      .map_err(ZephyrError::from)
  }

  async fn perform_upload(&self, request: UploadAssetsRequest) -> Result<DeployReport, ZephyrError> {
    let UploadAssetsRequest {
      mut assets,
      federation,
      session,
      output_dir,
    } = request;

    let summary = self.resolve_dependencies(&federation).await?;

    let ze_vars = session.into_env_vars().resolve_from_env();
    let manifest = ZephyrManifest::new(summary.dependencies.iter().cloned(), ze_vars);
    if let Some(dir) = &output_dir {
      manifest.write_to(dir)?;
    }

    // A manifest left in the output directory by an earlier deploy.
    assets.retain(|asset| asset.path != MANIFEST_FILENAME);
    let manifest_url = format!("{}/{MANIFEST_FILENAME}", self.edge_url.trim_end_matches('/'));
    let (mut assets, injected) =
      RuntimePluginTemplate::new(&manifest.dependencies, Some(&manifest_url)).inject_assets(assets)?;
    debug!(injected, manifest_url = %manifest_url, "filled runtime placeholders in assets");
    assets.insert(manifest.to_asset()?);

    let snapshot = assemble_snapshot(&SnapshotInputs {
      identity: &self.identity,
      git: &self.git,
      package: &self.package,
      federation: &federation,
      resolved: &summary.dependencies,
      assets: &assets,
      username: &self.app_config.username,
      build_id: &self.build_id,
      builder: &self.builder,
      is_ci: is_ci(),
    });

    let orchestrator = UploadOrchestrator::new(self.client.clone(), &self.config);
    let mut report = orchestrator
      .upload(&self.identity.application_uid, &self.edge_url, &snapshot, &assets)
      .await?;
    for unresolved in &summary.unresolved {
      report.add_warning(unresolved.to_string());
    }

    self.advance(LifecycleState::DependenciesResolved, LifecycleState::AssetsUploaded);
    info!(
      snapshot = %snapshot.id,
      assets = assets.len(),
      uploaded = report.assets.len(),
      warnings = report.warnings.len(),
      "assets uploaded"
    );
    Ok(report)
  }

  /// Close the build and drop the memoized remote lookups. Repeated calls
  /// after success are no-ops.
  pub fn build_finished(&self) -> Result<(), ZephyrError> {
    let released = self.resolver.clear_cache();
    debug!(released, "released remote lookups");

    let mut state = self.lock_state();
    match *state {
      LifecycleState::Finished => Ok(()),
      LifecycleState::Errored | LifecycleState::Created => {
        let err = LifecycleError::InvalidTransition {
          operation: "finish the build",
          state: *state,
        };
        *state = LifecycleState::Errored;
        error!(error = %err, code = %ErrorCode::InvalidLifecycle, "build did not finish cleanly");
        Err(err.into())
      }
      _ => {
        *state = LifecycleState::Finished;
        info!(application_uid = %self.identity.application_uid, build_id = %self.build_id, "build finished");
        Ok(())
      }
    }
  }

  fn require_state(&self, operation: &'static str, allowed: &[LifecycleState]) -> Result<(), ZephyrError> {
    let state = self.state();
    if allowed.contains(&state) {
      return Ok(());
    }
    let err: ZephyrError = LifecycleError::InvalidTransition { operation, state }.into();
    Err(ZephyrError::Shared(self.fail(err)))
  }

  fn advance(&self, from: LifecycleState, to: LifecycleState) {
    let mut state = self.lock_state();
    if *state == from {
      *state = to;
    }
  }

  /// Record a failed transition: log it with its code and move to `Errored`.
  fn fail(&self, err: ZephyrError) -> Arc<ZephyrError> {
    if let ZephyrError::Shared(inner) = err {
      // Already recorded by the operation that produced it.
      return inner;
    }
    let mut state = self.lock_state();
    if !state.is_terminal() {
      *state = LifecycleState::Errored;
    }
    error!(error = %err, code = %err.code(), build_id = %self.build_id, "build lifecycle failed");
    Arc::new(err)
  }
}

impl std::fmt::Debug for ZephyrEngine {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ZephyrEngine")
      .field("application_uid", &self.identity.application_uid)
      .field("build_id", &self.build_id)
      .field("state", &self.state())
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::StaticTokenProvider;
  use crate::assets::{Asset, AssetsMap};
  use crate::consts::ENV_SECRET_TOKEN;
  use crate::upload::DeployOutcome;
  use crate::util::testutil;
  use mockito::{Matcher, Server, ServerGuard};
  use std::collections::BTreeMap;
  use tempfile::TempDir;

  const UID: &str = "storefront.storefront.acme";

  async fn backend() -> ServerGuard {
    let mut server = Server::new_async().await;
    let edge = server.url();
    server
      .mock("GET", format!("/v2/application/{UID}/config").as_str())
      .with_status(200)
      .with_body(format!(r#"{{"value":{{"edge_url":"{edge}","username":"jane"}}}}"#))
      .create_async()
      .await;
    server
      .mock("POST", format!("/v2/application/{UID}/builds").as_str())
      .with_status(200)
      .with_body(r#"{"value":{"build_id":"42"}}"#)
      .create_async()
      .await;
    server
  }

  fn options(server: &ServerGuard, dir: &TempDir) -> EngineOptions {
    EngineOptions::new(dir.path(), "test")
      .with_config(ZephyrConfig::default().with_api_url(server.url()))
      .with_package(testutil::package("storefront", "1.0.0"))
      .with_git(testutil::git_info())
  }

  async fn engine(server: &ServerGuard, dir: &TempDir) -> ZephyrEngine {
    ZephyrEngine::create(options(server, dir), &StaticTokenProvider("token".to_string()))
      .await
      .unwrap()
  }

  async fn mock_uploads(server: &mut ServerGuard) {
    server
      .mock("POST", "/assets/missing")
      .with_status(200)
      .with_body(r#"{"value":{"missing":[]}}"#)
      .create_async()
      .await;
    server
      .mock("POST", "/v2/builds/stats")
      .with_status(200)
      .with_body(r#"{"value":{"urls":["https://storefront.edge.test"]}}"#)
      .create_async()
      .await;
  }

  fn request() -> UploadAssetsRequest {
    let mut assets = AssetsMap::new();
    assets.insert(Asset::new("main.js", b"console.log(1)".to_vec(), "chunk"));
    UploadAssetsRequest::new(assets, FederationConfig::default())
  }

  struct NoToken;

  impl TokenProvider for NoToken {
    fn token(&self) -> Result<String, ConfigError> {
      Err(ConfigError::MissingAuthToken(ENV_SECRET_TOKEN))
    }
  }

  #[tokio::test]
  async fn missing_token_fails_before_any_request() {
    let mut server = Server::new_async().await;
    let config = server.mock("GET", Matcher::Any).expect(0).create_async().await;
    let dir = TempDir::new().unwrap();

    let err = ZephyrEngine::create(options(&server, &dir), &NoToken).await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::MissingAuthToken);
    config.assert_async().await;
  }

  #[tokio::test]
  async fn empty_build_id_is_rejected() {
    let mut server = Server::new_async().await;
    server
      .mock("GET", format!("/v2/application/{UID}/config").as_str())
      .with_status(200)
      .with_body(r#"{"value":{"edge_url":"https://edge.test","username":"jane"}}"#)
      .create_async()
      .await;
    server
      .mock("POST", format!("/v2/application/{UID}/builds").as_str())
      .with_status(200)
      .with_body(r#"{"value":{"build_id":""}}"#)
      .create_async()
      .await;
    let dir = TempDir::new().unwrap();

    let err = ZephyrEngine::create(options(&server, &dir), &StaticTokenProvider("token".to_string()))
      .await
      .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoBuildId);
  }

  #[tokio::test]
  async fn walks_the_lifecycle() {
    let mut server = backend().await;
    mock_uploads(&mut server).await;
    let dir = TempDir::new().unwrap();
    let engine = engine(&server, &dir).await;
    assert_eq!(engine.state(), LifecycleState::Created);
    assert_eq!(engine.build_id(), "42");
    assert_eq!(engine.edge_url(), server.url());

    engine.start_new_build().unwrap();
    engine.start_new_build().unwrap();
    assert_eq!(engine.state(), LifecycleState::BuildStarted);

    let report = engine
      .upload_assets(request().with_output_dir(dir.path().join("dist")))
      .await
      .unwrap();
    assert_eq!(report.outcome, DeployOutcome::Succeeded);
    assert_eq!(engine.state(), LifecycleState::AssetsUploaded);
    assert!(dir.path().join("dist").join(MANIFEST_FILENAME).exists());

    engine.build_finished().unwrap();
    engine.build_finished().unwrap();
    assert_eq!(engine.state(), LifecycleState::Finished);
  }

  #[tokio::test]
  async fn finishing_releases_remote_lookups() {
    let mut server = backend().await;
    mock_empty_edge(&mut server).await;
    let dir = TempDir::new().unwrap();
    let engine = engine(&server, &dir).await;
    engine.start_new_build().unwrap();

    engine.resolve_dependencies(&cart_federation()).await.unwrap();
    assert_eq!(engine.resolver.cached_lookups(), 1);

    engine.build_finished().unwrap();
    assert_eq!(engine.resolver.cached_lookups(), 0);
    assert_eq!(engine.state(), LifecycleState::Finished);
  }

  #[tokio::test]
  async fn upload_before_start_moves_to_errored() {
    let server = backend().await;
    let dir = TempDir::new().unwrap();
    let engine = engine(&server, &dir).await;

    let err = engine.upload_assets(request()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidLifecycle);
    assert_eq!(engine.state(), LifecycleState::Errored);
    assert!(engine.start_new_build().is_err());
  }

  #[tokio::test]
  async fn repeated_uploads_share_the_first_report() {
    let mut server = backend().await;
    server
      .mock("POST", "/assets/missing")
      .with_status(200)
      .with_body(r#"{"value":{"missing":[]}}"#)
      .create_async()
      .await;
    let stats = server
      .mock("POST", "/v2/builds/stats")
      .with_status(200)
      .with_body(r#"{"value":{"urls":[]}}"#)
      .expect(1)
      .create_async()
      .await;
    let dir = TempDir::new().unwrap();
    let engine = engine(&server, &dir).await;
    engine.start_new_build().unwrap();

    let (first, second) = tokio::join!(engine.upload_assets(request()), engine.upload_assets(request()));
    let third = engine.upload_assets(request()).await.unwrap();

    assert!(Arc::ptr_eq(&first.unwrap(), &second.unwrap()));
    assert_eq!(third.skipped_assets, 2);
    stats.assert_async().await;
  }

  #[tokio::test]
  async fn unresolved_remote_keeps_its_declared_url_under_skip() {
    let mut server = backend().await;
    mock_uploads(&mut server).await;
    server
      .mock("GET", Matcher::Regex("^/resolve/".to_string()))
      .with_status(404)
      .create_async()
      .await;
    let dir = TempDir::new().unwrap();
    let engine = engine(&server, &dir).await;
    engine.start_new_build().unwrap();

    let federation = FederationConfig {
      remotes: BTreeMap::from([("cart".to_string(), "cart@https://cdn.test/cart/remoteEntry.js".to_string())]),
      ..Default::default()
    };
    let summary = engine.resolve_dependencies(&federation).await.unwrap();
    assert_eq!(summary.unresolved.len(), 1);
    assert_eq!(summary.dependencies[0].entry_url(), "https://cdn.test/cart/remoteEntry.js");
    assert_eq!(engine.state(), LifecycleState::DependenciesResolved);

    let report = engine
      .upload_assets(UploadAssetsRequest::new(AssetsMap::new(), federation))
      .await
      .unwrap();
    assert_eq!(report.outcome, DeployOutcome::SucceededWithWarnings);
    assert!(report.warnings[0].contains("cart"));
  }

  fn cart_federation() -> FederationConfig {
    FederationConfig {
      remotes: BTreeMap::from([("cart".to_string(), "cart@https://cdn.test/cart/remoteEntry.js".to_string())]),
      ..Default::default()
    }
  }

  /// Edge that claims to hold nothing, so every asset is uploaded.
  async fn mock_empty_edge(server: &mut ServerGuard) {
    server
      .mock("POST", "/assets/missing")
      .with_status(500)
      .create_async()
      .await;
    server
      .mock("POST", "/v2/builds/stats")
      .with_status(200)
      .with_body(r#"{"value":{"urls":[]}}"#)
      .create_async()
      .await;
    server
      .mock("GET", Matcher::Regex("^/resolve/".to_string()))
      .with_status(404)
      .create_async()
      .await;
  }

  #[tokio::test]
  async fn uploaded_bundles_carry_the_resolved_remote_map() {
    let mut server = backend().await;
    mock_empty_edge(&mut server).await;
    let filled = server
      .mock("POST", Matcher::Regex("^/upload".to_string()))
      .match_query(Matcher::UrlEncoded("filename".into(), "runtime.js".into()))
      .match_body(Matcher::Regex(
        r#"^var remotes = \{"cart":\{.*"remote_entry_url":"https://cdn\.test/cart/remoteEntry\.js".*\}\};var manifest = "http://.*/zephyr-manifest\.json";$"#
          .to_string(),
      ))
      .with_status(200)
      .expect(1)
      .create_async()
      .await;
    let raw = server
      .mock("POST", Matcher::Regex("^/upload".to_string()))
      .match_query(Matcher::UrlEncoded("filename".into(), "runtime.js".into()))
      .match_body(Matcher::Regex("__ZEPHYR_".to_string()))
      .with_status(200)
      .expect(0)
      .create_async()
      .await;
    server
      .mock("POST", Matcher::Regex("^/upload".to_string()))
      .match_query(Matcher::UrlEncoded("filename".into(), "zephyr-manifest.json".into()))
      .with_status(200)
      .create_async()
      .await;
    let dir = TempDir::new().unwrap();
    let engine = engine(&server, &dir).await;
    engine.start_new_build().unwrap();

    let mut assets = AssetsMap::new();
    let bundle = "var remotes = __ZEPHYR_REMOTES_MAP__;var manifest = __ZEPHYR_MANIFEST_URL__;";
    let original = Asset::new("runtime.js", bundle.as_bytes().to_vec(), "chunk");
    assets.insert(original.clone());

    let report = engine
      .upload_assets(UploadAssetsRequest::new(assets, cart_federation()))
      .await
      .unwrap();

    filled.assert_async().await;
    raw.assert_async().await;
    assert_eq!(report.failed_assets().count(), 0);
    let runtime = report.assets.iter().find(|a| a.path == "runtime.js").unwrap();
    assert_ne!(runtime.hash, original.hash);
  }

  #[tokio::test]
  async fn redeploy_replaces_a_stale_manifest() {
    let mut server = backend().await;
    mock_empty_edge(&mut server).await;
    let manifest_upload = server
      .mock("POST", Matcher::Regex("^/upload".to_string()))
      .match_query(Matcher::UrlEncoded("filename".into(), "zephyr-manifest.json".into()))
      .with_status(200)
      .expect(1)
      .create_async()
      .await;
    server
      .mock("POST", Matcher::Regex("^/upload".to_string()))
      .match_query(Matcher::UrlEncoded("filename".into(), "main.js".into()))
      .with_status(200)
      .create_async()
      .await;
    let dir = TempDir::new().unwrap();
    let engine = engine(&server, &dir).await;
    engine.start_new_build().unwrap();

    let mut assets = AssetsMap::new();
    assets.insert(Asset::new("main.js", b"console.log(1)".to_vec(), "chunk"));
    assets.insert(Asset::new(
      MANIFEST_FILENAME,
      br#"{"version":"1","timestamp":"2020-01-01T00:00:00Z","dependencies":{},"zeVars":{}}"#.to_vec(),
      "asset",
    ));

    let report = engine
      .upload_assets(UploadAssetsRequest::new(assets, FederationConfig::default()).with_output_dir(dir.path()))
      .await
      .unwrap();

    manifest_upload.assert_async().await;
    let manifests: Vec<_> = report.assets.iter().filter(|a| a.path == MANIFEST_FILENAME).collect();
    assert_eq!(manifests.len(), 1);
    assert!(manifests[0].is_success());
    assert_eq!(report.assets.len(), 2);
  }

  #[tokio::test]
  async fn unresolved_remote_fails_the_build_under_fail_policy() {
    let mut server = backend().await;
    server
      .mock("GET", Matcher::Regex("^/resolve/".to_string()))
      .with_status(500)
      .create_async()
      .await;
    let dir = TempDir::new().unwrap();
    let options = options(&server, &dir);
    let config = options.config.clone().with_remote_failure_policy(RemoteFailurePolicy::Fail);
    let engine = ZephyrEngine::create(options.with_config(config), &StaticTokenProvider("token".to_string()))
      .await
      .unwrap();
    engine.start_new_build().unwrap();

    let federation = FederationConfig {
      remotes: BTreeMap::from([("cart".to_string(), "cart@https://cdn.test/remoteEntry.js".to_string())]),
      ..Default::default()
    };
    let err = engine.resolve_dependencies(&federation).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ResolutionFailed);
    assert_eq!(engine.state(), LifecycleState::Errored);
    assert!(engine.build_finished().is_err());
  }
}
