//! Shared, lazily created engine.
//!
//! Every build tool entry point asks the same [`DeferredEngine`] for the
//! engine. The first caller creates it, and anyone arriving while creation
//! is in flight waits for that same creation instead of registering another
//! build.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::api::TokenProvider;
use crate::error::ZephyrError;
use crate::util::flight::{FlightState, SingleFlight};

use super::lifecycle::ZephyrEngine;
use super::types::EngineOptions;

#[derive(Debug, Default)]
pub struct DeferredEngine {
  engine: SingleFlight<Result<Arc<ZephyrEngine>, Arc<ZephyrError>>>,
}

impl DeferredEngine {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn state(&self) -> FlightState {
    self.engine.state()
  }

  /// The engine, once creation has finished successfully.
  pub fn get(&self) -> Option<Arc<ZephyrEngine>> {
    self.engine.get().and_then(|created| created.as_ref().ok().cloned())
  }

  pub async fn get_or_create(
    &self,
    options: EngineOptions,
    tokens: &dyn TokenProvider,
  ) -> Result<Arc<ZephyrEngine>, ZephyrError> {
    self
      .get_or_create_with(|| ZephyrEngine::create(options, tokens))
      .await
  }

  /// Like [`get_or_create`](Self::get_or_create) with a custom creation routine.
  ///
  /// A failed creation is kept too: later callers receive the same error.
  pub async fn get_or_create_with<F, Fut>(&self, create: F) -> Result<Arc<ZephyrEngine>, ZephyrError>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<ZephyrEngine, ZephyrError>>,
  {
    self
      .engine
      .run(|| async {
        debug!("creating shared engine");
        create().await.map(Arc::new).map_err(Arc::new)
      })
      .await
      .clone()
      .map_err(ZephyrError::from)
  }
}
