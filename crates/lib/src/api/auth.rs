//! Authentication token sources and the login poller.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::consts::ENV_SECRET_TOKEN;
use crate::error::ConfigError;

/// Source of the bearer token for API calls.
pub trait TokenProvider: Send + Sync {
  fn token(&self) -> Result<String, ConfigError>;
}

/// Reads the token from `ZE_SECRET_TOKEN`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvTokenProvider;

impl TokenProvider for EnvTokenProvider {
  fn token(&self) -> Result<String, ConfigError> {
    std::env::var(ENV_SECRET_TOKEN)
      .ok()
      .map(|token| token.trim().to_string())
      .filter(|token| !token.is_empty())
      .ok_or(ConfigError::MissingAuthToken(ENV_SECRET_TOKEN))
  }
}

#[derive(Debug, Clone)]
pub struct StaticTokenProvider(pub String);

impl TokenProvider for StaticTokenProvider {
  fn token(&self) -> Result<String, ConfigError> {
    Ok(self.0.clone())
  }
}

/// Polls a check function until it yields a token.
///
/// Owned by whoever runs the login flow. The polling task is a plain tokio
/// task, so it never keeps the process alive, and it is aborted when the
/// poller is stopped or dropped.
pub struct LoginPoller {
  interval: Duration,
  task: Mutex<Option<JoinHandle<()>>>,
  token: Arc<watch::Sender<Option<String>>>,
}

impl LoginPoller {
  pub fn new(interval: Duration) -> Self {
    let (token, _) = watch::channel(None);
    Self {
      interval,
      task: Mutex::new(None),
      token: Arc::new(token),
    }
  }

  /// Start polling with `check`. Does nothing while a poll is already running.
  ///
  /// Must be called from within a tokio runtime.
  pub fn start<F, Fut>(&self, check: F)
  where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Option<String>> + Send + 'static,
  {
    let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
    if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
      return;
    }

    let sender = Arc::clone(&self.token);
    let interval = self.interval;
    *task = Some(tokio::spawn(async move {
      let mut ticker = tokio::time::interval(interval);
      loop {
        ticker.tick().await;
        if let Some(token) = check().await {
          debug!("login completed");
          sender.send_replace(Some(token));
          break;
        }
      }
    }));
  }

  pub fn stop(&self) {
    let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(handle) = task.take() {
      handle.abort();
    }
  }

  pub fn is_in_progress(&self) -> bool {
    let task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
    task.as_ref().is_some_and(|handle| !handle.is_finished())
  }

  /// The token obtained by the last successful poll.
  pub fn token(&self) -> Option<String> {
    self.token.borrow().clone()
  }

  /// Wait until a poll yields a token.
  pub async fn wait_for_token(&self) -> Option<String> {
    let mut receiver = self.token.subscribe();
    let token = receiver.wait_for(Option::is_some).await.ok()?;
    token.as_ref().cloned()
  }
}

impl Drop for LoginPoller {
  fn drop(&mut self) {
    self.stop();
  }
}
