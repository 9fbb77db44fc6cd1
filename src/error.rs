//! Error types for screenshot comparison runs
//!
//! Errors fall into a few groups:
//! - Structural: the two directories being compared do not hold the same files
//! - Coverage: a relaxed file-list match found nothing in common
//! - Content: a strict upgrade comparison found a pixel difference
//! - I/O and tool invocation failures
//!
//! Every variant maps to a process exit code through [`Error::exit_code`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for comparison operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Exit code for general failures, pixel diffs and strict file-list mismatches.
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for a relaxed file-list match that found no common files.
pub const EXIT_NO_MATCHES: i32 = 2;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
  /// The two directories hold different file names and a strict match was requested.
  #[error("file lists of {} and {} don't match", a_dir.display(), b_dir.display())]
  FileListMismatch {
    a_dir: PathBuf,
    b_dir: PathBuf,
    only_in_a: Vec<String>,
    only_in_b: Vec<String>,
  },

  /// Relaxed matching was requested but the directories share no file names.
  #[error(
    "no matches between file lists of {} and {} while using relaxed match",
    a_dir.display(),
    b_dir.display()
  )]
  NoCommonFiles { a_dir: PathBuf, b_dir: PathBuf },

  /// A strict comparison reported a non-zero difference.
  #[error("pixel diff detected in {file}: {diagnostic}")]
  PixelDiff { file: String, diagnostic: String },

  #[error("failed to list directory {}: {source}", path.display())]
  ListDir {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("failed to read {}: {source}", path.display())]
  ReadManifest {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse {}: {source}", path.display())]
  ParseManifest {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to remove zero-diff image {}: {source}", path.display())]
  RemoveDiff {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to create output directory {}: {source}", path.display())]
  CreateOutdir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The comparator executable could not be started.
  #[error("failed to run {program}: {source}")]
  SpawnComparator {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The comparator finished without printing any diagnostic.
  #[error("comparator printed no diagnostic for {} vs {}", a.display(), b.display())]
  EmptyDiagnostic { a: PathBuf, b: PathBuf },

  /// The in-process comparator failed to write a diff image.
  #[error("failed to write diff image {}: {source}", path.display())]
  Image {
    path: PathBuf,
    #[source]
    source: image::ImageError,
  },
}

impl Error {
  /// Process exit code for this error.
  pub fn exit_code(&self) -> i32 {
    match self {
      Error::NoCommonFiles { .. } => EXIT_NO_MATCHES,
      _ => EXIT_FAILURE,
    }
  }
}
