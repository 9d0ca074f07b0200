//! Implementation of the `ze assets` command.
//!
//! Reads a build output directory into a content-addressed asset map and
//! lists it. Files with identical bytes show up once, under the smallest path.

use std::path::Path;

use anyhow::{Context, Result};

use zephyr_lib::assets::collect_assets;

use crate::output::{OutputFormat, Status, format_bytes, print_json, print_stat, print_status, truncate_hash};

pub fn cmd_assets(dir: &Path, verbose: bool, format: OutputFormat) -> Result<()> {
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let assets = rt
    .block_on(collect_assets(dir))
    .with_context(|| format!("Failed to read build output: {}", dir.display()))?;

  if format.is_json() {
    print_json(&serde_json::json!({
      "build_hash": assets.build_hash(),
      "total_size": assets.total_size(),
      "assets": assets.index(),
    }))?;
    return Ok(());
  }

  print_status(Status::Success, &format!("{} asset(s) in {}", assets.len(), dir.display()));
  for asset in assets.iter() {
    if verbose {
      println!(
        "  {} {} {} ({}, {}, {})",
        Status::Info.symbol(),
        truncate_hash(asset.hash.as_str()),
        asset.path,
        asset.kind,
        asset.mime_type,
        format_bytes(asset.size)
      );
    } else {
      println!("  {} {} {}", Status::Info.symbol(), truncate_hash(asset.hash.as_str()), asset.path);
    }
  }
  println!();
  print_stat("Total size", &format_bytes(assets.total_size()));
  print_stat("Build hash", assets.build_hash().as_str());

  Ok(())
}
