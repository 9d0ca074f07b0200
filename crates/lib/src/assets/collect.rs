//! Asset collection from an output directory on disk.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::build::build_assets_map;
use super::types::AssetsMap;

/// Classify a path by extension the way bundlers label their output.
pub fn classify_path(path: &str) -> &'static str {
  match path.rsplit('.').next().unwrap_or_default() {
    "js" | "mjs" | "cjs" => "chunk",
    "css" => "style",
    "html" | "htm" => "html",
    "map" => "source-map",
    _ => "asset",
  }
}

/// A file found under the output directory, with the outcome of reading it.
struct DiskFile {
  absolute: PathBuf,
  kind: &'static str,
  contents: io::Result<Vec<u8>>,
}

/// Read every regular file under `dir` into an [`AssetsMap`].
///
/// Files that cannot be read are skipped with a warning. A missing or
/// unreadable `dir` is an error.
pub async fn collect_assets(dir: &Path) -> io::Result<AssetsMap> {
  let mut files = Vec::new();
  for entry in WalkDir::new(dir).sort_by_file_name() {
    let entry = match entry {
      Ok(entry) => entry,
      Err(e) if e.depth() == 0 => return Err(io::Error::from(e)),
      Err(e) => {
        warn!(error = %e, "skipping unreadable entry");
        continue;
      }
    };
    if !entry.file_type().is_file() {
      continue;
    }
    let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
    files.push((relative.to_string_lossy().to_string(), entry.into_path()));
  }

  let mut records = Vec::with_capacity(files.len());
  for (relative, absolute) in files {
    let contents = tokio::fs::read(&absolute).await;
    let kind = classify_path(&relative);
    records.push((relative, DiskFile { absolute, kind, contents }));
  }

  let map = build_assets_map(
    records,
    |file| match file.contents {
      Ok(bytes) => Some(bytes),
      Err(e) => {
        warn!(path = %file.absolute.display(), error = %e, "skipping unreadable asset");
        None
      }
    },
    |file| file.kind.to_string(),
  );

  debug!(dir = %dir.display(), assets = map.len(), bytes = map.total_size(), "collected assets");
  Ok(map)
}
