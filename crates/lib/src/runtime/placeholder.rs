//! Placeholder parsing and substitution for emitted bundle text.
//!
//! Bundles carry unique literal tokens where build-time values belong. They
//! survive minification and do not depend on how a bundler names its runtime
//! helpers, so substitution is a plain text rewrite.
//!
//! # Placeholders
//!
//! - `__ZEPHYR_REMOTES_MAP__` - JSON object of resolved remotes keyed by name
//! - `__ZEPHYR_MANIFEST_URL__` - JSON string with the manifest URL, or `null`
//!
//! # Example
//!
//! ```
//! use zephyr_lib::runtime::placeholder::{parse, Placeholder, Segment};
//!
//! let segments = parse("var m = __ZEPHYR_REMOTES_MAP__;");
//! assert_eq!(segments, vec![
//!     Segment::Literal("var m = ".to_string()),
//!     Segment::Placeholder(Placeholder::RemotesMap),
//!     Segment::Literal(";".to_string()),
//! ]);
//! ```

use thiserror::Error;

use crate::consts::{MANIFEST_URL_PLACEHOLDER, REMOTES_MAP_PLACEHOLDER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
  RemotesMap,
  ManifestUrl,
}

impl Placeholder {
  pub const ALL: [Placeholder; 2] = [Placeholder::RemotesMap, Placeholder::ManifestUrl];

  pub fn token(self) -> &'static str {
    match self {
      Placeholder::RemotesMap => REMOTES_MAP_PLACEHOLDER,
      Placeholder::ManifestUrl => MANIFEST_URL_PLACEHOLDER,
    }
  }
}

/// A segment of parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  Literal(String),
  Placeholder(Placeholder),
}

#[derive(Debug, Error)]
pub enum InjectError {
  #[error("failed to serialize value for {}: {source}", .placeholder.token())]
  Serialize {
    placeholder: Placeholder,
    #[source]
    source: serde_json::Error,
  },

  #[error("no value for placeholder {}", .0.token())]
  Unresolved(Placeholder),
}

/// Supplies the JavaScript expression substituted for each placeholder.
pub trait Resolver {
  fn resolve(&self, placeholder: Placeholder) -> Result<String, InjectError>;
}

/// Split `input` into literal text and placeholders.
pub fn parse(input: &str) -> Vec<Segment> {
  let mut segments = Vec::new();
  let mut rest = input;

  loop {
    let next = Placeholder::ALL
      .iter()
      .filter_map(|p| rest.find(p.token()).map(|pos| (pos, *p)))
      .min_by_key(|(pos, _)| *pos);

    let Some((pos, placeholder)) = next else {
      if !rest.is_empty() {
        segments.push(Segment::Literal(rest.to_string()));
      }
      break;
    };

    if pos > 0 {
      segments.push(Segment::Literal(rest[..pos].to_string()));
    }
    segments.push(Segment::Placeholder(placeholder));
    rest = &rest[pos + placeholder.token().len()..];
  }

  segments
}

/// Text after substitution and the number of placeholders replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
  pub text: String,
  pub replaced: usize,
}

/// Substitute every placeholder in `input` using `resolver`.
///
/// Each placeholder kind is resolved once, however often it occurs.
pub fn substitute(input: &str, resolver: &impl Resolver) -> Result<Substitution, InjectError> {
  substitute_segments(&parse(input), resolver)
}

pub fn substitute_segments(segments: &[Segment], resolver: &impl Resolver) -> Result<Substitution, InjectError> {
  let mut text = String::new();
  let mut replaced = 0;
  let mut cache: [Option<String>; 2] = [None, None];

  for segment in segments {
    match segment {
      Segment::Literal(s) => text.push_str(s),
      Segment::Placeholder(p) => {
        let slot = &mut cache[*p as usize];
        if slot.is_none() {
          *slot = Some(resolver.resolve(*p)?);
        }
        text.push_str(slot.as_deref().unwrap_or_default());
        replaced += 1;
      }
    }
  }

  Ok(Substitution { text, replaced })
}

/// Serialize `value` as JSON that is also a valid JavaScript expression.
///
/// JSON allows raw U+2028 and U+2029 in strings; older JavaScript engines
/// treat them as line terminators.
pub fn to_js_literal<T: serde::Serialize>(placeholder: Placeholder, value: &T) -> Result<String, InjectError> {
  let json = serde_json::to_string(value).map_err(|source| InjectError::Serialize { placeholder, source })?;
  Ok(json.replace('\u{2028}', "\\u2028").replace('\u{2029}', "\\u2029"))
}
