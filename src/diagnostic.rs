//! Parsing of comparator diagnostics.
//!
//! ImageMagick's `compare` reports its metric on stderr rather than stdout:
//!
//! ```text
//! 0                                  # -metric AE, ImageMagick 6
//! 1532 (0.0233765)                   # -metric AE, ImageMagick 7
//! 0 (0)                              # -metric RMSE, identical
//! 337.254 (0.00514617)               # -metric RMSE, different
//! compare: unable to open image 'x.png': No such file or directory @ error/blob.c/OpenBlob/3571.
//! ```
//!
//! The leading token is the metric magnitude; a trailing parenthesized token, when present, is the
//! value normalized to `[0, 1]`.

use std::fmt;

const UNREADABLE_MARKER: &str = "unable to open image";

/// A parsed comparator diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
  /// One of the inputs could not be opened.
  Unreadable,
  Metric {
    /// Whitespace-trimmed diagnostic text.
    raw: String,
    /// First whitespace-separated token.
    magnitude: String,
    /// Contents of a trailing `(...)` token.
    normalized: Option<String>,
  },
}

impl Diagnostic {
  /// Whether the leading magnitude token is exactly `0`.
  pub fn leading_is_zero(&self) -> bool {
    matches!(self, Diagnostic::Metric { magnitude, .. } if magnitude == "0")
  }

  /// Whether the diagnostic reports no difference at all.
  ///
  /// When a normalized value is present it must be `0` as well.
  pub fn is_zero(&self) -> bool {
    match self {
      Diagnostic::Unreadable => false,
      Diagnostic::Metric {
        magnitude,
        normalized,
        ..
      } => magnitude == "0" && normalized.as_deref().map_or(true, |n| n == "0"),
    }
  }

  pub fn into_result(self) -> ComparisonResult {
    match self {
      Diagnostic::Unreadable => ComparisonResult::NotAvailable,
      Diagnostic::Metric { raw, .. } => ComparisonResult::Metric(raw),
    }
  }
}

/// Parses the diagnostic text of one comparator run.
///
/// Returns `None` for empty or whitespace-only text.
pub fn parse_diagnostic(text: &str) -> Option<Diagnostic> {
  if text.lines().any(|line| line.contains(UNREADABLE_MARKER)) {
    return Some(Diagnostic::Unreadable);
  }

  let raw = text.trim();
  let tokens: Vec<&str> = raw.split_whitespace().collect();
  let (first, rest) = tokens.split_first()?;
  let normalized = rest
    .last()
    .and_then(|last| last.strip_prefix('('))
    .and_then(|last| last.strip_suffix(')'))
    .map(str::to_string);
  let magnitude = first.to_string();

  Some(Diagnostic::Metric {
    raw: raw.to_string(),
    magnitude,
    normalized,
  })
}

/// Outcome of one comparison as shown in summary lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonResult {
  /// An input image was missing or unreadable.
  NotAvailable,
  /// Diagnostic text reported by the comparator.
  Metric(String),
}

impl fmt::Display for ComparisonResult {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ComparisonResult::NotAvailable => f.write_str("NA"),
      ComparisonResult::Metric(raw) => f.write_str(raw),
    }
  }
}

/// Whitespace-joined summary line: leading fields followed by every result.
pub fn summary_line(fields: &[&str], results: &[ComparisonResult]) -> String {
  fields
    .iter()
    .map(|field| field.to_string())
    .chain(results.iter().map(ComparisonResult::to_string))
    .collect::<Vec<_>>()
    .join(" ")
}
