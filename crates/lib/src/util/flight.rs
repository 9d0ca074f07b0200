//! Run-once cells for async work shared between concurrent callers.
//!
//! A [`SingleFlight`] runs its initializer at most once. Callers arriving
//! while the work is in progress await the same result instead of starting
//! a second run, and every later caller receives the stored value.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::OnceCell;

/// Observable progress of a [`SingleFlight`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightState {
  NotStarted,
  InProgress,
  Completed,
}

#[derive(Debug)]
pub struct SingleFlight<T> {
  cell: OnceCell<T>,
  started: AtomicBool,
}

impl<T> Default for SingleFlight<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> SingleFlight<T> {
  pub fn new() -> Self {
    Self {
      cell: OnceCell::new(),
      started: AtomicBool::new(false),
    }
  }

  pub fn state(&self) -> FlightState {
    if self.cell.initialized() {
      FlightState::Completed
    } else if self.started.load(Ordering::Acquire) {
      FlightState::InProgress
    } else {
      FlightState::NotStarted
    }
  }

  /// The stored value, if the work has completed.
  pub fn get(&self) -> Option<&T> {
    self.cell.get()
  }

  /// Run `init` unless another caller already did, and return the shared value.
  ///
  /// `init` is dropped without being called when the value already exists or
  /// another caller's run is in progress.
  pub async fn run<F, Fut>(&self, init: F) -> &T
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
  {
    self
      .cell
      .get_or_init(|| {
        self.started.store(true, Ordering::Release);
        init()
      })
      .await
  }
}
