//! Engine-driven deploys: identity, resolution, manifest and upload.

use std::sync::Arc;

use mockito::{Matcher, Server};
use serde_json::json;
use tokio::task::JoinSet;
use zephyr_lib::api::StaticTokenProvider;
use zephyr_lib::assets::collect_assets;
use zephyr_lib::consts::MANIFEST_FILENAME;
use zephyr_lib::engine::{BuildSession, DeferredEngine, LifecycleState, UploadAssetsRequest, ZephyrEngine};
use zephyr_lib::manifest::ZephyrManifest;
use zephyr_lib::snapshot::FederationConfig;
use zephyr_lib::upload::DeployOutcome;
use zephyr_lib::util::hash::hash_bytes;

use super::common::{self, FEDERATION, MAIN_JS, Project, UID};

fn tokens() -> StaticTokenProvider {
  StaticTokenProvider("secret".to_string())
}

#[tokio::test]
async fn deploys_a_build_end_to_end() {
  let mut server = Server::new_async().await;
  let project = Project::new();
  let register = common::mock_registration(&mut server).await;
  let cart = common::mock_resolution(&mut server, "cart.storefront.acme", "latest", "https://edge.test/cart/1.0.0/remoteEntry.js").await;
  let checkout =
    common::mock_resolution(&mut server, "checkout.payments.acme", "2.0.0", "https://edge.test/checkout/2.0.0/remoteEntry.js")
      .await;
  let main_hash = hash_bytes(MAIN_JS.as_bytes());
  server
    .mock("POST", "/assets/missing")
    .match_body(Matcher::PartialJson(json!({ "application_uid": UID })))
    .with_status(200)
    .with_body(format!(r#"{{"value":{{"missing":["{main_hash}"]}}}}"#))
    .create_async()
    .await;
  let upload = server
    .mock("POST", Matcher::Regex("^/upload".to_string()))
    .match_query(Matcher::UrlEncoded("filename".into(), "main.js".into()))
    .with_status(200)
    .expect(1)
    .create_async()
    .await;
  let stats = server
    .mock("POST", "/v2/builds/stats")
    .match_body(Matcher::PartialJson(json!({
      "id": "storefront.storefront.acme_jane-doe_42",
      "applicationUid": UID,
      "version": "1.4.0-jane-doe.42",
      "buildId": "42",
      "git": { "branch": "main", "tags": ["v1.4.0"] },
      "context": { "builder": "webpack" }
    })))
    .with_status(200)
    .with_body(r#"{"value":{"urls":["https://storefront.edge.test"],"version_url":"https://storefront-42.edge.test"}}"#)
    .expect(1)
    .create_async()
    .await;

  let engine = ZephyrEngine::create(common::options(&server, &project), &tokens()).await.unwrap();
  engine.start_new_build().unwrap();

  let assets = collect_assets(&project.dist()).await.unwrap();
  assert_eq!(assets.len(), 2);
  let mut session = BuildSession::new();
  session.collector().scan(MAIN_JS);
  let request = UploadAssetsRequest::new(assets, FederationConfig::from_json(FEDERATION).unwrap())
    .with_session(session)
    .with_output_dir(project.dist());

  let report = engine.upload_assets(request).await.unwrap();

  assert_eq!(report.outcome, DeployOutcome::Succeeded);
  assert_eq!(report.assets.len(), 1);
  assert_eq!(report.assets[0].path, "main.js");
  // style.css and the manifest were already on the edge.
  assert_eq!(report.skipped_assets, 2);
  assert_eq!(report.upload_result.version_url.as_deref(), Some("https://storefront-42.edge.test"));
  assert_eq!(engine.state(), LifecycleState::AssetsUploaded);

  let manifest =
    ZephyrManifest::from_json(&std::fs::read_to_string(project.dist().join(MANIFEST_FILENAME)).unwrap()).unwrap();
  assert_eq!(
    manifest.dependencies["cart"].remote_entry_url,
    "https://edge.test/cart/1.0.0/remoteEntry.js"
  );
  assert_eq!(manifest.dependencies["checkout"].application_uid, "checkout.payments.acme");
  assert_eq!(
    manifest.dependencies["checkout"].default_url.as_deref(),
    Some("https://cdn.test/checkout/remoteEntry.js")
  );

  engine.build_finished().unwrap();
  assert_eq!(engine.state(), LifecycleState::Finished);

  register.assert_async().await;
  cart.assert_async().await;
  checkout.assert_async().await;
  upload.assert_async().await;
  stats.assert_async().await;
}

#[tokio::test]
async fn failed_build_stats_upload_is_fatal() {
  let mut server = Server::new_async().await;
  let project = Project::new();
  common::mock_registration(&mut server).await;
  server
    .mock("POST", "/assets/missing")
    .with_status(200)
    .with_body(r#"{"value":{"missing":[]}}"#)
    .create_async()
    .await;
  server
    .mock("POST", "/v2/builds/stats")
    .with_status(503)
    .create_async()
    .await;

  let engine = ZephyrEngine::create(common::options(&server, &project), &tokens()).await.unwrap();
  engine.start_new_build().unwrap();
  let assets = collect_assets(&project.dist()).await.unwrap();

  let err = engine
    .upload_assets(UploadAssetsRequest::new(assets, FederationConfig::default()))
    .await
    .unwrap_err();

  assert_eq!(err.code().as_str(), "ZE30011");
  assert!(err.is_fatal());
  assert_eq!(engine.state(), LifecycleState::Errored);
}

#[tokio::test]
async fn missing_package_json_stops_before_the_network() {
  let mut server = Server::new_async().await;
  let any = server.mock("GET", Matcher::Any).expect(0).create_async().await;
  let empty = tempfile::TempDir::new().unwrap();
  let options = zephyr_lib::engine::EngineOptions::new(empty.path(), "webpack")
    .with_config(zephyr_lib::config::ZephyrConfig::default().with_api_url(server.url()))
    .with_git(common::git_info());

  let err = ZephyrEngine::create(options, &tokens()).await.unwrap_err();

  assert_eq!(err.code().as_str(), "ZE10010");
  any.assert_async().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_entry_point_shares_one_build() {
  let mut server = Server::new_async().await;
  let project = Arc::new(Project::new());
  let register = common::mock_registration(&mut server).await;
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

  let deferred = Arc::new(DeferredEngine::new());
  let mut set = JoinSet::new();
  for _ in 0..4 {
    let deferred = Arc::clone(&deferred);
    let project = Arc::clone(&project);
    let options = common::options(&server, &project);
    set.spawn(async move {
      let engine = deferred.get_or_create(options, &tokens()).await.unwrap();
      engine.start_new_build().unwrap();
      let assets = collect_assets(&project.dist()).await.unwrap();
      engine
        .upload_assets(UploadAssetsRequest::new(assets, FederationConfig::default()))
        .await
        .unwrap()
    });
  }

  let mut reports = Vec::new();
  while let Some(joined) = set.join_next().await {
    reports.push(joined.unwrap());
  }

  for report in &reports {
    assert!(Arc::ptr_eq(&reports[0], report));
  }
  register.assert_async().await;
  stats.assert_async().await;
}
