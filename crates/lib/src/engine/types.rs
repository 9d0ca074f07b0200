//! Lifecycle states and the inputs engine operations take.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::assets::AssetsMap;
use crate::config::ZephyrConfig;
use crate::identity::{GitInfo, PackageManifest};
use crate::manifest::EnvVarCollector;
use crate::resolve::{ResolutionError, ResolvedDependency};
use crate::snapshot::FederationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
  Created,
  BuildStarted,
  DependenciesResolved,
  AssetsUploaded,
  Finished,
  Errored,
}

impl LifecycleState {
  pub fn is_terminal(self) -> bool {
    matches!(self, LifecycleState::Finished | LifecycleState::Errored)
  }
}

impl fmt::Display for LifecycleState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      LifecycleState::Created => "created",
      LifecycleState::BuildStarted => "build started",
      LifecycleState::DependenciesResolved => "dependencies resolved",
      LifecycleState::AssetsUploaded => "assets uploaded",
      LifecycleState::Finished => "finished",
      LifecycleState::Errored => "errored",
    };
    f.write_str(name)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
  #[error("cannot {operation} while the build is {state}")]
  InvalidTransition {
    operation: &'static str,
    state: LifecycleState,
  },
}

/// Everything needed to create an engine for one build.
#[derive(Debug, Clone)]
pub struct EngineOptions {
  /// Directory the build runs in. `package.json` and git are discovered from here.
  pub context_dir: PathBuf,
  /// Name of the build tool integration, recorded in the snapshot.
  pub builder: String,
  pub config: ZephyrConfig,
  /// Skips `package.json` discovery when set.
  pub package: Option<PackageManifest>,
  /// Skips git discovery when set.
  pub git: Option<GitInfo>,
}

impl EngineOptions {
  pub fn new(context_dir: impl Into<PathBuf>, builder: impl Into<String>) -> Self {
    Self {
      context_dir: context_dir.into(),
      builder: builder.into(),
      config: ZephyrConfig::default(),
      package: None,
      git: None,
    }
  }

  pub fn with_config(mut self, config: ZephyrConfig) -> Self {
    self.config = config;
    self
  }

  pub fn with_package(mut self, package: PackageManifest) -> Self {
    self.package = Some(package);
    self
  }

  pub fn with_git(mut self, git: GitInfo) -> Self {
    self.git = Some(git);
    self
  }
}

/// Accumulators filled while the build tool processes modules.
///
/// Each entry point can own a collector; they are merged once when assets are
/// uploaded.
#[derive(Debug, Default)]
pub struct BuildSession {
  collectors: Vec<EnvVarCollector>,
}

impl BuildSession {
  pub fn new() -> Self {
    Self::default()
  }

  /// Start a new collector and return it for filling.
  pub fn collector(&mut self) -> &mut EnvVarCollector {
    self.collectors.push(EnvVarCollector::new());
    let last = self.collectors.len() - 1;
    &mut self.collectors[last]
  }

  pub fn add(&mut self, collector: EnvVarCollector) {
    self.collectors.push(collector);
  }

  pub fn into_env_vars(self) -> EnvVarCollector {
    self.collectors.into_iter().fold(EnvVarCollector::new(), |mut merged, collector| {
      merged.merge(collector);
      merged
    })
  }
}

/// Input to [`ZephyrEngine::upload_assets`](super::ZephyrEngine::upload_assets).
#[derive(Debug)]
pub struct UploadAssetsRequest {
  pub assets: AssetsMap,
  pub federation: FederationConfig,
  pub session: BuildSession,
  /// Where to write `zephyr-manifest.json`. The manifest is uploaded either way.
  pub output_dir: Option<PathBuf>,
}

impl UploadAssetsRequest {
  pub fn new(assets: AssetsMap, federation: FederationConfig) -> Self {
    Self {
      assets,
      federation,
      session: BuildSession::new(),
      output_dir: None,
    }
  }

  pub fn with_session(mut self, session: BuildSession) -> Self {
    self.session = session;
    self
  }

  pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.output_dir = Some(dir.into());
    self
  }
}

/// Outcome of resolving every declared remote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
  /// Resolved remotes, plus unresolved ones left on their declared URL.
  pub dependencies: Vec<ResolvedDependency>,
  pub unresolved: Vec<ResolutionError>,
}
