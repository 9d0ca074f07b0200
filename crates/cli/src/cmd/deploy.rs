//! Implementation of the `ze deploy` command.
//!
//! Drives the build lifecycle for an already emitted output directory:
//! registers a build, resolves remotes, writes the manifest next to the
//! output and uploads what the edge is missing.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::debug;

use zephyr_lib::api::EnvTokenProvider;
use zephyr_lib::assets::{AssetsMap, collect_assets};
use zephyr_lib::config::ZephyrConfig;
use zephyr_lib::consts::MANIFEST_FILENAME;
use zephyr_lib::engine::{BuildSession, EngineOptions, UploadAssetsRequest, ZephyrEngine};
use zephyr_lib::identity::{ApplicationIdentity, GitInfo, PackageManifest, is_ci};
use zephyr_lib::manifest::ZephyrManifest;
use zephyr_lib::resolve::{ResolutionScope, ResolvedDependency, remote_references};
use zephyr_lib::runtime::RuntimePluginTemplate;
use zephyr_lib::snapshot::{FederationConfig, SnapshotInputs, assemble_snapshot};
use zephyr_lib::upload::DeployOutcome;

use crate::output::{OutputFormat, Status, format_bytes, format_duration, print_json, print_stat, print_status};

const DRY_RUN_BUILD_ID: &str = "dry-run";

pub struct DeployArgs {
  pub dir: PathBuf,
  pub federation: Option<PathBuf>,
  pub context: PathBuf,
  pub dry_run: bool,
  pub timeout: Option<Duration>,
  pub concurrency: Option<usize>,
  pub builder: String,
}

pub fn cmd_deploy(args: DeployArgs, format: OutputFormat) -> Result<()> {
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  rt.block_on(deploy(args, format))
}

async fn deploy(args: DeployArgs, format: OutputFormat) -> Result<()> {
  let started = Instant::now();

  let federation = match &args.federation {
    Some(path) => load_federation(path)?,
    None => FederationConfig::default(),
  };
  let mut config = ZephyrConfig::from_env()?;
  if let Some(timeout) = args.timeout {
    config.request_timeout = timeout;
  }
  if let Some(concurrency) = args.concurrency {
    config.upload_concurrency = concurrency.max(1);
  }

  let assets = collect_assets(&args.dir)
    .await
    .with_context(|| format!("Failed to read build output: {}", args.dir.display()))?;
  let session = scan_sources(&assets);
  debug!(assets = assets.len(), "collected build output");

  if args.dry_run {
    return dry_run(&args, assets, federation, session, format).await;
  }

  let options = EngineOptions::new(&args.context, &args.builder).with_config(config);
  let engine = ZephyrEngine::create(options, &EnvTokenProvider).await?;
  engine.start_new_build()?;
  let request = UploadAssetsRequest::new(assets, federation)
    .with_session(session)
    .with_output_dir(&args.dir);
  let report = engine.upload_assets(request).await?;
  engine.build_finished()?;

  if format.is_json() {
    print_json(&serde_json::json!({
      "application_uid": engine.identity().application_uid,
      "build_id": engine.build_id(),
      "report": &*report,
    }))?;
    return Ok(());
  }

  let status = match report.outcome {
    DeployOutcome::Succeeded => Status::Success,
    DeployOutcome::SucceededWithWarnings => Status::Warning,
  };
  let suffix = if status == Status::Warning { " with warnings" } else { "" };
  print_status(
    status,
    &format!(
      "Deployed {} (build {}){}",
      engine.identity().application_uid,
      engine.build_id(),
      suffix
    ),
  );
  let uploaded: u64 = report.assets.iter().filter(|a| a.is_success()).count() as u64;
  print_stat(
    "Assets",
    &format!("{} uploaded, {} already on the edge", uploaded, report.skipped_assets),
  );
  for url in &report.upload_result.urls {
    print_stat("URL", url);
  }
  if let Some(version_url) = &report.upload_result.version_url {
    print_stat("Version", version_url);
  }
  print_stat("Took", &format_duration(started.elapsed()));
  for warning in &report.warnings {
    print_status(Status::Warning, warning);
  }

  Ok(())
}

fn load_federation(path: &Path) -> Result<FederationConfig> {
  let content =
    fs::read_to_string(path).with_context(|| format!("Failed to read federation config: {}", path.display()))?;
  FederationConfig::from_json(&content).with_context(|| format!("Invalid federation config: {}", path.display()))
}

/// Collect `ZE_PUBLIC_*` references from every text asset.
fn scan_sources(assets: &AssetsMap) -> BuildSession {
  let mut session = BuildSession::new();
  let collector = session.collector();
  for asset in assets.iter().filter(|a| matches!(a.kind.as_str(), "chunk" | "html")) {
    if let Ok(source) = std::str::from_utf8(&asset.buffer) {
      collector.scan(source);
    }
  }
  session
}

/// Assemble the snapshot locally. Remotes keep their declared URLs.
async fn dry_run(
  args: &DeployArgs,
  mut assets: AssetsMap,
  federation: FederationConfig,
  session: BuildSession,
  format: OutputFormat,
) -> Result<()> {
  let (package, package_path) = PackageManifest::load(&args.context)?;
  let properties = package.application_properties(&package_path)?;
  let git = GitInfo::discover(&args.context).await?;
  let identity = ApplicationIdentity::new(&properties, &git);

  let scope = ResolutionScope {
    org: git.org.clone(),
    project: git.project.clone(),
    build_target: None,
  };
  let dependencies: Vec<ResolvedDependency> = remote_references(&federation.remotes, &package.zephyr_dependencies)
    .iter()
    .filter_map(|reference| ResolvedDependency::declared(reference, scope.application_uid(reference)))
    .collect();

  let manifest = ZephyrManifest::new(dependencies.iter().cloned(), session.into_env_vars().resolve_from_env());
  assets.retain(|asset| asset.path != MANIFEST_FILENAME);
  // No edge is contacted, so there is no manifest URL to embed.
  let (mut assets, _) = RuntimePluginTemplate::new(&manifest.dependencies, None).inject_assets(assets)?;
  assets.insert(manifest.to_asset()?);

  let snapshot = assemble_snapshot(&SnapshotInputs {
    identity: &identity,
    git: &git,
    package: &package,
    federation: &federation,
    resolved: &dependencies,
    assets: &assets,
    username: &git.name,
    build_id: DRY_RUN_BUILD_ID,
    builder: &args.builder,
    is_ci: is_ci(),
  });

  if !format.is_json() {
    print_status(Status::Info, &format!(
      "Dry run for {}: {} asset(s), {}",
      identity.application_uid,
      assets.len(),
      format_bytes(assets.total_size())
    ));
  }
  print_json(&snapshot)
}
