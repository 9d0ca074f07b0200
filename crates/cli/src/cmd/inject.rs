//! Implementation of the `ze inject` command.
//!
//! Fills the remotes-map and manifest-URL placeholders in an already emitted
//! bundle from a published `zephyr-manifest.json`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use zephyr_lib::manifest::ZephyrManifest;
use zephyr_lib::runtime::inject_remote_map;

use crate::output::{OutputFormat, Status, print_json, print_status};

pub fn cmd_inject(
  bundle: &Path,
  manifest: &Path,
  manifest_url: Option<&str>,
  write: bool,
  format: OutputFormat,
) -> Result<()> {
  let manifest_json =
    fs::read_to_string(manifest).with_context(|| format!("Failed to read manifest: {}", manifest.display()))?;
  let manifest = ZephyrManifest::from_json(&manifest_json)?;
  let source = fs::read_to_string(bundle).with_context(|| format!("Failed to read bundle: {}", bundle.display()))?;

  let substitution = inject_remote_map(&source, &manifest.dependencies, manifest_url)?;

  if substitution.replaced == 0 {
    print_status(Status::Warning, &format!("No placeholders found in {}", bundle.display()));
  }

  if write {
    fs::write(bundle, &substitution.text).with_context(|| format!("Failed to write bundle: {}", bundle.display()))?;
  }

  if format.is_json() {
    print_json(&serde_json::json!({
      "bundle": bundle.display().to_string(),
      "replaced": substitution.replaced,
      "remotes": manifest.dependencies.keys().collect::<Vec<_>>(),
      "written": write,
    }))?;
  } else if write {
    print_status(
      Status::Success,
      &format!("Rewrote {} placeholder(s) in {}", substitution.replaced, bundle.display()),
    );
  } else {
    print!("{}", substitution.text);
  }

  Ok(())
}
