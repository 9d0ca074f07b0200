//! Terminal output for `ze`.
//!
//! Status lines are colored when the stream supports it. Errors and warnings
//! go to stderr.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

/// Kind of a one-line status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
  Success,
  Info,
  Warning,
  Error,
}

impl Status {
  pub fn symbol(self) -> &'static str {
    match self {
      Status::Success => "✓",
      Status::Info => "•",
      Status::Warning => "⚠",
      Status::Error => "✗",
    }
  }

  /// Problems go to stderr so `-o json` output on stdout stays parseable.
  fn stream(self) -> Stream {
    match self {
      Status::Success | Status::Info => Stream::Stdout,
      Status::Warning | Status::Error => Stream::Stderr,
    }
  }

  /// Whether the message text is colored along with the symbol.
  fn colors_message(self) -> bool {
    matches!(self, Status::Warning | Status::Error)
  }

  fn paint(self, text: &str) -> String {
    let stream = self.stream();
    match self {
      Status::Success => text.if_supports_color(stream, |s| s.green()).to_string(),
      Status::Info => text.if_supports_color(stream, |s| s.blue()).to_string(),
      Status::Warning => text.if_supports_color(stream, |s| s.yellow()).to_string(),
      Status::Error => text.if_supports_color(stream, |s| s.red()).to_string(),
    }
  }

  pub fn line(self, message: &str) -> String {
    let message = if self.colors_message() {
      self.paint(message)
    } else {
      message.to_string()
    };
    format!("{} {}", self.paint(self.symbol()), message)
  }
}

pub fn print_status(status: Status, message: &str) {
  match status.stream() {
    Stream::Stderr => eprintln!("{}", status.line(message)),
    _ => println!("{}", status.line(message)),
  }
}

/// First 12 characters of a content hash.
pub fn truncate_hash(hash: &str) -> &str {
  &hash[..hash.len().min(12)]
}

/// Human-readable size with binary units.
pub fn format_bytes(bytes: u64) -> String {
  const UNITS: [&str; 3] = ["KB", "MB", "GB"];

  let mut value = bytes as f64;
  let mut unit = None;
  for next in UNITS {
    if value < 1024.0 {
      break;
    }
    value /= 1024.0;
    unit = Some(next);
  }
  match unit {
    Some(unit) => format!("{value:.1} {unit}"),
    None => format!("{bytes} B"),
  }
}

pub fn format_duration(duration: Duration) -> String {
  match duration.as_secs() {
    0 => format!("{}ms", duration.subsec_millis()),
    secs @ 1..60 => format!("{secs}.{:02}s", duration.subsec_millis() / 10),
    secs => format!("{}m {}s", secs / 60, secs % 60),
  }
}

/// An indented `label: value` line.
pub fn print_stat(label: &str, value: &str) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
