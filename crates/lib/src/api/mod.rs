//! Deploy API access: HTTP client, wire types and authentication.

pub mod auth;
pub mod client;
pub mod types;

pub use auth::{EnvTokenProvider, LoginPoller, StaticTokenProvider, TokenProvider};
pub use client::ZephyrClient;
pub use types::{ApiError, ApplicationConfig, Envelope, UploadResult};
