//! Asset and asset-map types.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::util::hash::{ContentHash, hash_bytes, hash_hashes};

/// One emitted build file, content-addressed by its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
  /// Output-relative path with `/` separators.
  pub path: String,
  pub hash: ContentHash,
  pub buffer: Arc<[u8]>,
  pub size: u64,
  pub mime_type: &'static str,
  /// Build-tool classification, e.g. `chunk` or `asset`.
  pub kind: String,
}

impl Asset {
  pub fn new(path: impl Into<String>, buffer: impl Into<Arc<[u8]>>, kind: impl Into<String>) -> Self {
    let path = normalize_path(&path.into());
    let buffer = buffer.into();
    Self {
      hash: hash_bytes(&buffer),
      size: buffer.len() as u64,
      mime_type: mime_type_for(&path),
      kind: kind.into(),
      path,
      buffer,
    }
  }

  /// File extension without the dot, or an empty string.
  pub fn extname(&self) -> &str {
    let file_name = self.path.rsplit('/').next().unwrap_or(&self.path);
    match file_name.rfind('.') {
      Some(dot) if dot > 0 => &file_name[dot + 1..],
      _ => "",
    }
  }

  pub fn to_ref(&self) -> AssetRef {
    AssetRef {
      path: self.path.clone(),
      extname: self.extname().to_string(),
      hash: self.hash.clone(),
      size: self.size,
    }
  }
}

/// Snapshot-facing view of an asset, without its bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
  pub path: String,
  pub extname: String,
  pub hash: ContentHash,
  pub size: u64,
}

/// Assets keyed by content hash.
///
/// When two paths share a hash the lexicographically smallest path is kept,
/// so the map does not depend on the order assets were emitted in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetsMap {
  entries: BTreeMap<ContentHash, Asset>,
}

impl AssetsMap {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert `asset`, returning `true` if its hash was not present before.
  pub fn insert(&mut self, asset: Asset) -> bool {
    match self.entries.entry(asset.hash.clone()) {
      Entry::Vacant(slot) => {
        slot.insert(asset);
        true
      }
      Entry::Occupied(mut slot) => {
        if asset.path < slot.get().path {
          slot.insert(asset);
        }
        false
      }
    }
  }

  pub fn get(&self, hash: &ContentHash) -> Option<&Asset> {
    self.entries.get(hash)
  }

  pub fn contains(&self, hash: &ContentHash) -> bool {
    self.entries.contains_key(hash)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Assets in hash order.
  pub fn iter(&self) -> impl Iterator<Item = &Asset> {
    self.entries.values()
  }

  pub fn hashes(&self) -> impl Iterator<Item = &ContentHash> {
    self.entries.keys()
  }

  /// Keep only the assets for which `keep` returns `true`.
  pub fn retain<F>(&mut self, mut keep: F)
  where
    F: FnMut(&Asset) -> bool,
  {
    self.entries.retain(|_, asset| keep(asset));
  }

  pub fn total_size(&self) -> u64 {
    self.entries.values().map(|a| a.size).sum()
  }

  pub fn index(&self) -> BTreeMap<ContentHash, AssetRef> {
    self.entries.iter().map(|(hash, asset)| (hash.clone(), asset.to_ref())).collect()
  }

  /// Digest over every asset hash in map order.
  pub fn build_hash(&self) -> ContentHash {
    hash_hashes(self.entries.keys())
  }
}

impl IntoIterator for AssetsMap {
  type Item = Asset;
  type IntoIter = std::collections::btree_map::IntoValues<ContentHash, Asset>;

  fn into_iter(self) -> Self::IntoIter {
    self.entries.into_values()
  }
}

fn normalize_path(path: &str) -> String {
  let path = path.replace('\\', "/");
  path.trim_start_matches("./").trim_start_matches('/').to_string()
}

/// Content type served for a path, by extension.
pub fn mime_type_for(path: &str) -> &'static str {
  let ext = path.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
  match ext.as_str() {
    "js" | "mjs" | "cjs" => "application/javascript",
    "css" => "text/css",
    "html" | "htm" => "text/html",
    "json" | "map" => "application/json",
    "txt" => "text/plain",
    "svg" => "image/svg+xml",
    "png" => "image/png",
    "jpg" | "jpeg" => "image/jpeg",
    "gif" => "image/gif",
    "webp" => "image/webp",
    "ico" => "image/x-icon",
    "woff" => "font/woff",
    "woff2" => "font/woff2",
    "ttf" => "font/ttf",
    "wasm" => "application/wasm",
    _ => "application/octet-stream",
  }
}
