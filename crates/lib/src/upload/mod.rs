//! Upload orchestration: a bounded worker pool for assets plus the build-stats request.

pub mod orchestrator;
pub mod pool;
pub mod types;

pub use orchestrator::UploadOrchestrator;
pub use pool::{TaskAborted, run_pool};
pub use types::{AssetUploadOutcome, DeployOutcome, DeployReport, UploadError};
