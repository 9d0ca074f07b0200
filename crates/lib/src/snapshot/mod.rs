//! Build snapshot ("dash data") assembly.
//!
//! A [`BuildSnapshot`] combines the asset map, application and git identity,
//! resolved remotes and the federation graph into the payload uploaded as
//! build stats.

pub mod assemble;
pub mod federation;
pub mod types;

pub use assemble::{SnapshotInputs, assemble_snapshot, snapshot_id, snapshot_version};
pub use federation::{FederationConfig, SharedDependency};
pub use types::{BuildSnapshot, ConsumedRemote, ExposedModule, GitSnapshot, SharedOverride, SnapshotContext};
