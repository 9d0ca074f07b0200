//! Building the asset map from build-tool output records.

use tracing::debug;

use super::types::{Asset, AssetsMap};

/// Build an [`AssetsMap`] from `(path, record)` pairs.
///
/// `classify` names the record's kind. `extract` then consumes the record and
/// returns its bytes, or `None` when it cannot be read; such records are
/// skipped. The result does not depend on input order.
pub fn build_assets_map<R, I, E, C>(raw: I, mut extract: E, mut classify: C) -> AssetsMap
where
  I: IntoIterator<Item = (String, R)>,
  E: FnMut(R) -> Option<Vec<u8>>,
  C: FnMut(&R) -> String,
{
  let mut map = AssetsMap::new();
  for (path, record) in raw {
    let kind = classify(&record);
    let Some(bytes) = extract(record) else {
      debug!(path = %path, "skipping asset without readable content");
      continue;
    };
    map.insert(Asset::new(path, bytes, kind));
  }
  map
}
