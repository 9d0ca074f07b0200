//! Runtime configuration resolved from the environment.

use std::time::Duration;

use crate::consts::{
  DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_UPLOAD_BATCH_SIZE, DEFAULT_UPLOAD_CONCURRENCY,
  ENV_API_URL, ENV_BUILD_TARGET, ENV_EDGE_URL, ENV_FAIL_ON_UNRESOLVED, ENV_HTTP_TIMEOUT_SECS,
  ENV_UPLOAD_BATCH_SIZE, ENV_UPLOAD_CONCURRENCY,
};
use crate::error::ConfigError;

/// What to do when a declared remote cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoteFailurePolicy {
  /// Keep the declared default URL and record a warning.
  #[default]
  Skip,
  /// Abort the deploy.
  Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZephyrConfig {
  pub api_url: String,
  /// Overrides the edge URL returned by the application config endpoint.
  pub edge_url: Option<String>,
  pub upload_concurrency: usize,
  pub upload_batch_size: usize,
  pub request_timeout: Duration,
  pub remote_failure_policy: RemoteFailurePolicy,
  pub build_target: Option<String>,
}

impl Default for ZephyrConfig {
  fn default() -> Self {
    Self {
      api_url: DEFAULT_API_URL.to_string(),
      edge_url: None,
      upload_concurrency: DEFAULT_UPLOAD_CONCURRENCY,
      upload_batch_size: DEFAULT_UPLOAD_BATCH_SIZE,
      request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
      remote_failure_policy: RemoteFailurePolicy::Skip,
      build_target: None,
    }
  }
}

impl ZephyrConfig {
  /// Read configuration from the process environment.
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  /// Read configuration through `lookup`, falling back to defaults for unset
  /// or empty variables.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let mut config = Self::default();

    if let Some(api_url) = get(ENV_API_URL) {
      config.api_url = api_url.trim_end_matches('/').to_string();
    }
    config.edge_url = get(ENV_EDGE_URL).map(|url| url.trim_end_matches('/').to_string());
    config.build_target = get(ENV_BUILD_TARGET);

    if let Some(raw) = get(ENV_UPLOAD_CONCURRENCY) {
      config.upload_concurrency = parse_positive(ENV_UPLOAD_CONCURRENCY, &raw)?;
    }
    if let Some(raw) = get(ENV_UPLOAD_BATCH_SIZE) {
      config.upload_batch_size = parse_positive(ENV_UPLOAD_BATCH_SIZE, &raw)?;
    }
    if let Some(raw) = get(ENV_HTTP_TIMEOUT_SECS) {
      config.request_timeout = Duration::from_secs(parse_positive(ENV_HTTP_TIMEOUT_SECS, &raw)? as u64);
    }
    if let Some(raw) = get(ENV_FAIL_ON_UNRESOLVED) {
      config.remote_failure_policy = match raw.as_str() {
        "1" | "true" => RemoteFailurePolicy::Fail,
        "0" | "false" => RemoteFailurePolicy::Skip,
        _ => {
          return Err(ConfigError::InvalidEnv {
            var: ENV_FAIL_ON_UNRESOLVED.to_string(),
            value: raw,
          });
        }
      };
    }

    Ok(config)
  }

  pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
    self.api_url = api_url.into();
    self
  }

  pub fn with_edge_url(mut self, edge_url: impl Into<String>) -> Self {
    self.edge_url = Some(edge_url.into());
    self
  }

  pub fn with_remote_failure_policy(mut self, policy: RemoteFailurePolicy) -> Self {
    self.remote_failure_policy = policy;
    self
  }
}

fn parse_positive(var: &str, raw: &str) -> Result<usize, ConfigError> {
  match raw.parse::<usize>() {
    Ok(value) if value >= 1 => Ok(value),
    _ => Err(ConfigError::InvalidEnv {
      var: var.to_string(),
      value: raw.to_string(),
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  const ALL_VARS: [&str; 7] = [
    ENV_API_URL,
    ENV_EDGE_URL,
    ENV_UPLOAD_CONCURRENCY,
    ENV_UPLOAD_BATCH_SIZE,
    ENV_HTTP_TIMEOUT_SECS,
    ENV_FAIL_ON_UNRESOLVED,
    ENV_BUILD_TARGET,
  ];

  #[test]
  #[serial]
  fn defaults_when_environment_is_empty() {
    let unset: Vec<(&str, Option<&str>)> = ALL_VARS.iter().map(|v| (*v, None)).collect();
    temp_env::with_vars(unset, || {
      let config = ZephyrConfig::from_env().unwrap();
      assert_eq!(config, ZephyrConfig::default());
      assert_eq!(config.upload_concurrency, 8);
      assert_eq!(config.remote_failure_policy, RemoteFailurePolicy::Skip);
    });
  }

  #[test]
  #[serial]
  fn reads_overrides_from_environment() {
    temp_env::with_vars(
      [
        (ENV_API_URL, Some("https://api.example.test/")),
        (ENV_EDGE_URL, Some("https://edge.example.test")),
        (ENV_UPLOAD_CONCURRENCY, Some("3")),
        (ENV_UPLOAD_BATCH_SIZE, Some("4")),
        (ENV_HTTP_TIMEOUT_SECS, Some("5")),
        (ENV_FAIL_ON_UNRESOLVED, Some("1")),
        (ENV_BUILD_TARGET, Some("web")),
      ],
      || {
        let config = ZephyrConfig::from_env().unwrap();
        assert_eq!(config.api_url, "https://api.example.test");
        assert_eq!(config.edge_url.as_deref(), Some("https://edge.example.test"));
        assert_eq!(config.upload_concurrency, 3);
        assert_eq!(config.upload_batch_size, 4);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.remote_failure_policy, RemoteFailurePolicy::Fail);
        assert_eq!(config.build_target.as_deref(), Some("web"));
      },
    );
  }

  #[test]
  fn zero_concurrency_is_rejected() {
    let err = ZephyrConfig::from_lookup(|name| (name == ENV_UPLOAD_CONCURRENCY).then(|| "0".to_string())).unwrap_err();
    assert_eq!(err.code().as_str(), "ZE10019");
  }

  #[test]
  fn unknown_policy_value_is_rejected() {
    let err =
      ZephyrConfig::from_lookup(|name| (name == ENV_FAIL_ON_UNRESOLVED).then(|| "sometimes".to_string())).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnv { .. }));
  }
}
