//! CLI output formatting utilities.
//!
//! Status lines go to stdout (success, info) or stderr (warning, error) with
//! a leading symbol, colored when the stream supports it.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{AnsiColors, OwoColorize, Stream};

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

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

#[derive(Debug, Clone, Copy)]
enum Status {
  Success,
  Info,
  Warning,
  Error,
}

impl Status {
  fn symbol(self) -> &'static str {
    match self {
      Status::Success => symbols::SUCCESS,
      Status::Info => symbols::INFO,
      Status::Warning => symbols::WARNING,
      Status::Error => symbols::ERROR,
    }
  }

  fn color(self) -> AnsiColors {
    match self {
      Status::Success => AnsiColors::Green,
      Status::Info => AnsiColors::Blue,
      Status::Warning => AnsiColors::Yellow,
      Status::Error => AnsiColors::Red,
    }
  }

  fn stream(self) -> Stream {
    match self {
      Status::Success | Status::Info => Stream::Stdout,
      Status::Warning | Status::Error => Stream::Stderr,
    }
  }

  /// Problems color the whole line, everything else only the symbol.
  fn emphasize_message(self) -> bool {
    matches!(self, Status::Warning | Status::Error)
  }

  fn print(self, message: &str) {
    let stream = self.stream();
    let color = self.color();
    let sym = self.symbol();
    let symbol = sym.if_supports_color(stream, |s| s.color(color));
    let line = if self.emphasize_message() {
      format!("{} {}", symbol, message.if_supports_color(stream, |s| s.color(color)))
    } else {
      format!("{} {}", symbol, message)
    };

    match stream {
      Stream::Stdout => println!("{line}"),
      _ => eprintln!("{line}"),
    }
  }
}

/// Human-readable elapsed time, rounded to milliseconds.
pub fn format_elapsed(duration: Duration) -> String {
  let rounded = Duration::from_millis(duration.as_millis().try_into().unwrap_or(u64::MAX));
  humantime::format_duration(rounded).to_string()
}

pub fn print_success(message: &str) {
  Status::Success.print(message);
}

pub fn print_info(message: &str) {
  Status::Info.print(message);
}

pub fn print_warning(message: &str) {
  Status::Warning.print(message);
}

pub fn print_error(message: &str) {
  Status::Error.print(message);
}

/// An indented `label: value` line under a status line.
pub fn print_stat(label: &str, value: &str) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{json}");
  Ok(())
}
