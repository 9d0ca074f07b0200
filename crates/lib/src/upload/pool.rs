//! Bounded worker pool with ordered results.
//!
//! `concurrency` workers pull the next task index from a shared atomic
//! counter, run the task, and record its result at that index as soon as it
//! completes. A failing or panicking task never stops its siblings; every
//! task yields its own `Result`.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::task::JoinSet;
use tracing::error;

/// A task whose worker died before recording a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("task {index} did not complete: its worker aborted")]
pub struct TaskAborted {
  pub index: usize,
}

/// Run `worker` over `tasks` with at most `concurrency` in flight.
///
/// The returned vector holds task `i`'s result at position `i`, whatever
/// order the tasks finished in.
pub async fn run_pool<T, R, E, F, Fut>(tasks: Vec<T>, concurrency: usize, worker: F) -> Vec<Result<R, E>>
where
  T: Send + 'static,
  R: Send + 'static,
  E: From<TaskAborted> + Send + 'static,
  F: Fn(T) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<R, E>> + Send + 'static,
{
  let total = tasks.len();
  if total == 0 {
    return Vec::new();
  }

  let queue: Arc<Vec<Mutex<Option<T>>>> = Arc::new(tasks.into_iter().map(|t| Mutex::new(Some(t))).collect());
  let slots: Arc<Vec<Mutex<Option<Result<R, E>>>>> = Arc::new((0..total).map(|_| Mutex::new(None)).collect());
  let next = Arc::new(AtomicUsize::new(0));
  let worker = Arc::new(worker);

  let mut join_set = JoinSet::new();
  for _ in 0..concurrency.clamp(1, total) {
    let queue = Arc::clone(&queue);
    let slots = Arc::clone(&slots);
    let next = Arc::clone(&next);
    let worker = Arc::clone(&worker);

    join_set.spawn(async move {
      loop {
        let index = next.fetch_add(1, Ordering::SeqCst);
        if index >= queue.len() {
          break;
        }
        let task = queue[index].lock().unwrap_or_else(PoisonError::into_inner).take();
        let Some(task) = task else { continue };
        // A panicking task only loses its own slot.
        let result = match tokio::spawn(worker(task)).await {
          Ok(result) => result,
          Err(e) => {
            error!(task = index, error = %e, "upload task panicked");
            Err(TaskAborted { index }.into())
          }
        };
        *slots[index].lock().unwrap_or_else(PoisonError::into_inner) = Some(result);
      }
    });
  }

  while let Some(joined) = join_set.join_next().await {
    if let Err(e) = joined {
      error!(error = %e, "upload worker aborted");
    }
  }

  slots
    .iter()
    .enumerate()
    .map(|(index, slot)| {
      slot
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
        .unwrap_or_else(|| Err(TaskAborted { index }.into()))
    })
    .collect()
}
