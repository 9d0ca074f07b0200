//! Shared fixtures for pipeline tests.

use std::path::PathBuf;

use mockito::{Mock, ServerGuard};
use tempfile::TempDir;
use zephyr_lib::config::ZephyrConfig;
use zephyr_lib::engine::EngineOptions;
use zephyr_lib::identity::GitInfo;

pub const UID: &str = "storefront.storefront.acme";

pub const MAIN_JS: &str = r#"import("cart/Basket");
const apiUrl = process.env.ZE_PUBLIC_API_URL;
"#;

pub const FEDERATION: &str = r#"{
  "name": "storefront",
  "filename": "remoteEntry.js",
  "remotes": {
    "cart": "cart@https://cdn.test/cart/remoteEntry.js",
    "checkout": "checkout@https://cdn.test/checkout/remoteEntry.js"
  },
  "exposes": { "./Header": "./src/Header.tsx" },
  "shared": { "react": { "requiredVersion": "^18.2.0", "singleton": true } }
}"#;

/// A project checkout with a `package.json` and an emitted `dist/`.
pub struct Project {
  pub temp: TempDir,
}

impl Project {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    std::fs::write(
      root.join("package.json"),
      r#"{
  "name": "storefront",
  "version": "1.4.0",
  "dependencies": { "react": "18.2.0" },
  "zephyr:dependencies": { "checkout": "checkout.payments.acme@2.0.0" }
}"#,
    )
    .unwrap();

    let dist = root.join("dist");
    std::fs::create_dir_all(dist.join("vendor")).unwrap();
    std::fs::write(dist.join("main.js"), MAIN_JS).unwrap();
    // Same bytes under a second path: one asset after content addressing.
    std::fs::write(dist.join("vendor").join("main.copy.js"), MAIN_JS).unwrap();
    std::fs::write(dist.join("style.css"), "body { margin: 0 }").unwrap();
    Self { temp }
  }

  pub fn dist(&self) -> PathBuf {
    self.temp.path().join("dist")
  }
}

pub fn git_info() -> GitInfo {
  GitInfo {
    name: "Jane Doe".to_string(),
    email: "jane@example.com".to_string(),
    branch: "main".to_string(),
    commit: "fedcba9876543210fedcba9876543210fedcba98".to_string(),
    tags: vec!["v1.4.0".to_string()],
    org: "acme".to_string(),
    project: "storefront".to_string(),
  }
}

pub fn options(server: &ServerGuard, project: &Project) -> EngineOptions {
  EngineOptions::new(project.temp.path(), "webpack")
    .with_config(ZephyrConfig::default().with_api_url(server.url()))
    .with_git(git_info())
}

/// Application config and build registration. Returns the registration mock.
pub async fn mock_registration(server: &mut ServerGuard) -> Mock {
  let edge = server.url();
  server
    .mock("GET", format!("/v2/application/{UID}/config").as_str())
    .match_header("authorization", "Bearer secret")
    .with_status(200)
    .with_body(format!(r#"{{"value":{{"edge_url":"{edge}","username":"Jane.Doe"}}}}"#))
    .create_async()
    .await;
  server
    .mock("POST", format!("/v2/application/{UID}/builds").as_str())
    .with_status(200)
    .with_body(r#"{"value":{"build_id":"42"}}"#)
    .expect(1)
    .create_async()
    .await
}

pub async fn mock_resolution(server: &mut ServerGuard, uid: &str, version: &str, url: &str) -> Mock {
  server
    .mock("GET", format!("/resolve/{uid}/{version}").as_str())
    .with_status(200)
    .with_body(format!(
      r#"{{"value":{{"application_uid":"{uid}","name":"{uid}","remote_entry_url":"{url}","version":"{version}"}}}}"#
    ))
    .create_async()
    .await
}
