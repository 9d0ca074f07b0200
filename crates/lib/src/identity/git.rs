//! Git metadata for the build snapshot.
//!
//! Discovery shells out to the `git` binary. Organization and project come
//! from the `origin` remote URL.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::debug;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitInfo {
  pub name: String,
  pub email: String,
  pub branch: String,
  pub commit: String,
  #[serde(default)]
  pub tags: Vec<String>,
  pub org: String,
  pub project: String,
}

impl GitInfo {
  /// Read git metadata for the repository containing `dir`.
  pub async fn discover(dir: &Path) -> Result<Self, ConfigError> {
    let remote = git(dir, &["config", "--get", "remote.origin.url"])
      .await?
      .ok_or_else(|| ConfigError::GitRemoteOrigin(String::new()))?;
    let (org, project) = parse_git_remote(&remote).ok_or_else(|| ConfigError::GitRemoteOrigin(remote.clone()))?;

    let name = git(dir, &["config", "user.name"]).await?;
    let email = git(dir, &["config", "user.email"]).await?;
    let (Some(name), Some(email)) = (name, email) else {
      return Err(ConfigError::GitIdentityMissing);
    };

    let commit = git(dir, &["rev-parse", "HEAD"])
      .await?
      .ok_or_else(|| ConfigError::GitUnavailable {
        dir: dir.to_path_buf(),
        message: "repository has no commits".to_string(),
      })?;
    let branch = git(dir, &["rev-parse", "--abbrev-ref", "HEAD"])
      .await?
      .unwrap_or_else(|| "HEAD".to_string());
    let tags = git(dir, &["tag", "--points-at", "HEAD"])
      .await?
      .map(|out| out.lines().map(str::to_string).collect())
      .unwrap_or_default();

    debug!(org = %org, project = %project, branch = %branch, commit = %commit, "discovered git info");

    Ok(GitInfo {
      name,
      email,
      branch,
      commit,
      tags,
      org,
      project,
    })
  }
}

/// Run a git command, returning trimmed stdout or `None` when it fails or prints nothing.
async fn git(dir: &Path, args: &[&str]) -> Result<Option<String>, ConfigError> {
  let output = Command::new("git")
    .args(args)
    .current_dir(dir)
    .output()
    .await
    .map_err(|e| ConfigError::GitUnavailable {
      dir: dir.to_path_buf(),
      message: e.to_string(),
    })?;

  if !output.status.success() {
    return Ok(None);
  }
  let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
  Ok((!stdout.is_empty()).then_some(stdout))
}

/// Extract `(org, project)` from a git remote URL.
///
/// Handles scp-like (`git@host:org/repo.git`), `https://`, `ssh://` and
/// `git://` forms. For nested groups the first path segment is the org and
/// the last is the project.
pub fn parse_git_remote(url: &str) -> Option<(String, String)> {
  let url = url.trim();
  let path = match url.find("://") {
    Some(scheme_end) => {
      let rest = &url[scheme_end + 3..];
      &rest[rest.find('/')?..]
    }
    None => &url[url.find(':')? + 1..],
  };

  let path = path.trim_end_matches('/');
  let path = path.strip_suffix(".git").unwrap_or(path);
  let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
  if segments.len() < 2 {
    return None;
  }
  let org = segments[0];
  let project = segments[segments.len() - 1];
  Some((org.to_string(), project.to_string()))
}
