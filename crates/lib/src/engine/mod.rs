//! Build lifecycle: `Created → BuildStarted → DependenciesResolved →
//! AssetsUploaded → Finished`, with `Errored` reachable from any
//! non-terminal state.

pub mod deferred;
pub mod lifecycle;
pub mod types;

pub use deferred::DeferredEngine;
pub use lifecycle::ZephyrEngine;
pub use types::{
  BuildSession, EngineOptions, LifecycleError, LifecycleState, ResolutionSummary, UploadAssetsRequest,
};
