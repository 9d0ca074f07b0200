//! Content-addressed build assets.

pub mod build;
pub mod collect;
pub mod types;

pub use build::build_assets_map;
pub use collect::{classify_path, collect_assets};
pub use types::{Asset, AssetRef, AssetsMap, mime_type_for};
