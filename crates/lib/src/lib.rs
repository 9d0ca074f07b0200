//! zephyr-lib: build snapshot and deploy pipeline for federated applications
//!
//! This crate provides the pieces a bundler integration drives:
//! - `assets`: content-addressed maps of build output
//! - `resolve`: federated remotes resolved to deployed entry URLs
//! - `snapshot`: the versioned description of one build sent to the API
//! - `runtime`: the snippet that redirects remotes in the deployed bundle
//! - `engine`: the build lifecycle tying it all together

pub mod api;
pub mod assets;
pub mod config;
pub mod consts;
pub mod engine;
pub mod error;
pub mod identity;
pub mod manifest;
pub mod resolve;
pub mod runtime;
pub mod snapshot;
pub mod upload;
pub mod util;

pub use error::{ConfigError, ErrorCode, ZephyrError};
