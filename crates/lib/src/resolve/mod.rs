//! Remote dependency references and their resolution.

pub mod parse;
pub mod resolver;
pub mod types;

pub use parse::{apply_pin, parse_remote_version};
pub use resolver::{DependencyResolver, ResolutionScope, remote_references};
pub use types::{RemoteReference, ResolutionError, ResolutionFailure, ResolvedDependency};
