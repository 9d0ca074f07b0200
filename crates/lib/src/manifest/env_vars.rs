//! Collection of `ZE_PUBLIC_*` references from emitted sources.
//!
//! One collector belongs to one build session. Adapters scan whatever
//! sources they process and the engine merges the collectors once, when
//! assets are uploaded.

use std::collections::{BTreeMap, BTreeSet};

use crate::consts::PUBLIC_ENV_PREFIX;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVarCollector {
  names: BTreeSet<String>,
}

impl EnvVarCollector {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record every `ZE_PUBLIC_*` identifier in `source`. Returns how many were new.
  pub fn scan(&mut self, source: &str) -> usize {
    let bytes = source.as_bytes();
    let mut added = 0;
    let mut offset = 0;

    while let Some(found) = source[offset..].find(PUBLIC_ENV_PREFIX) {
      let start = offset + found;
      let mut end = start + PUBLIC_ENV_PREFIX.len();
      while end < bytes.len() && is_name_byte(bytes[end]) {
        end += 1;
      }
      let preceded_by_name = start > 0 && is_name_byte(bytes[start - 1]);
      if !preceded_by_name && end > start + PUBLIC_ENV_PREFIX.len() && self.names.insert(source[start..end].to_string())
      {
        added += 1;
      }
      offset = end;
    }

    added
  }

  pub fn record(&mut self, name: impl Into<String>) {
    self.names.insert(name.into());
  }

  pub fn merge(&mut self, other: EnvVarCollector) {
    self.names.extend(other.names);
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.names.iter().map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }

  /// Values for every collected name `lookup` knows. Unknown names are left out.
  pub fn resolve<F>(&self, lookup: F) -> BTreeMap<String, String>
  where
    F: Fn(&str) -> Option<String>,
  {
    self
      .names
      .iter()
      .filter_map(|name| lookup(name).map(|value| (name.clone(), value)))
      .collect()
  }

  pub fn resolve_from_env(&self) -> BTreeMap<String, String> {
    self.resolve(|name| std::env::var(name).ok())
  }
}

fn is_name_byte(byte: u8) -> bool {
  byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}
