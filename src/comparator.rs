//! Comparison providers and the fuzz-factor sweep.

use crate::diagnostic::{parse_diagnostic, ComparisonResult, Diagnostic};
use crate::error::{Error, Result};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Fuzz tolerances (percent) swept for every image pair, in report order.
pub const FUZZ_FACTORS: [u32; 6] = [0, 1, 2, 5, 10, 20];

/// Default ImageMagick executable.
pub const DEFAULT_COMPARE_BIN: &str = "compare";

/// Comparison metric understood by the comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
  /// Absolute error: number of differing pixels.
  Ae,
  /// Root mean squared error.
  Rmse,
}

impl Metric {
  pub fn as_str(self) -> &'static str {
    match self {
      Metric::Ae => "AE",
      Metric::Rmse => "RMSE",
    }
  }
}

impl fmt::Display for Metric {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// One comparator invocation.
#[derive(Debug, Clone)]
pub struct CompareRequest<'a> {
  pub metric: Metric,
  /// Color distance tolerance in percent; `None` passes no `-fuzz` option.
  pub fuzz_percent: Option<u32>,
  pub a: &'a Path,
  pub b: &'a Path,
  /// Where the difference visualization is written.
  pub diff: &'a Path,
}

impl CompareRequest<'_> {
  /// Arguments in ImageMagick `compare` order.
  pub fn to_args(&self) -> Vec<String> {
    let mut args = vec!["-metric".to_string(), self.metric.as_str().to_string()];
    if let Some(fuzz) = self.fuzz_percent {
      args.push("-fuzz".to_string());
      args.push(format!("{fuzz}%"));
    }
    args.push(self.a.display().to_string());
    args.push(self.b.display().to_string());
    args.push(self.diff.display().to_string());
    args
  }
}

/// Something that can compare two images and describe the difference.
///
/// Implementations return diagnostic text in ImageMagick `compare` format (see
/// [`crate::diagnostic`]). An unreadable input is reported in the text, not as an error.
pub trait Comparator {
  fn compare(&self, request: &CompareRequest<'_>) -> Result<String>;
}

/// Runs ImageMagick's `compare` executable.
#[derive(Debug, Clone)]
pub struct ImageMagickComparator {
  program: PathBuf,
}

impl ImageMagickComparator {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
    }
  }

  pub fn program(&self) -> &Path {
    &self.program
  }
}

impl Default for ImageMagickComparator {
  fn default() -> Self {
    Self::new(DEFAULT_COMPARE_BIN)
  }
}

impl Comparator for ImageMagickComparator {
  fn compare(&self, request: &CompareRequest<'_>) -> Result<String> {
    let args = request.to_args();
    debug!("Running {} {}", self.program.display(), args.join(" "));

    // `compare` exits 1 when the images differ and 2 on errors; both are described on stderr.
    let output = Command::new(&self.program)
      .args(&args)
      .output()
      .map_err(|source| Error::SpawnComparator {
        program: self.program.display().to_string(),
        source,
      })?;
    debug!(status = %output.status, "compare finished");

    Ok(String::from_utf8_lossy(&output.stderr).into_owned())
  }
}

/// Runs one comparison and parses its diagnostic.
pub fn run_comparison(
  comparator: &dyn Comparator,
  request: &CompareRequest<'_>,
) -> Result<Diagnostic> {
  let text = comparator.compare(request)?;
  parse_diagnostic(&text).ok_or_else(|| Error::EmptyDiagnostic {
    a: request.a.to_path_buf(),
    b: request.b.to_path_buf(),
  })
}

/// Deletes a diff image, tolerating one the comparator never wrote.
pub fn discard_diff_image(path: &Path) -> Result<()> {
  match fs::remove_file(path) {
    Ok(()) => {
      debug!(path = %path.display(), "discarded zero-diff image");
      Ok(())
    }
    Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
    Err(source) => Err(Error::RemoveDiff {
      path: path.to_path_buf(),
      source,
    }),
  }
}

/// `<outdir>/<label>_fuzz<N>%_TEST_diff.png`
pub fn fuzz_diff_path(outdir: &Path, label: &str, fuzz: u32) -> PathBuf {
  outdir.join(format!("{label}_fuzz{fuzz}%_TEST_diff.png"))
}

/// Creates `outdir` if needed.
pub fn ensure_outdir(outdir: &Path) -> Result<()> {
  fs::create_dir_all(outdir).map_err(|source| Error::CreateOutdir {
    path: outdir.to_path_buf(),
    source,
  })
}

/// Compares `a_image` against `b_image` with `-metric AE` at every fuzz factor.
///
/// Results follow [`FUZZ_FACTORS`] order. Unreadable inputs produce `NA` rather than an error.
pub fn compare_with_fuzz_factors(
  comparator: &dyn Comparator,
  outdir: &Path,
  discard_zero_diff_png: bool,
  label: &str,
  a_image: &Path,
  b_image: &Path,
) -> Result<Vec<ComparisonResult>> {
  let mut results = Vec::with_capacity(FUZZ_FACTORS.len());

  for fuzz in FUZZ_FACTORS {
    let diff_file = fuzz_diff_path(outdir, label, fuzz);
    let request = CompareRequest {
      metric: Metric::Ae,
      fuzz_percent: Some(fuzz),
      a: a_image,
      b: b_image,
      diff: &diff_file,
    };

    let diagnostic = run_comparison(comparator, &request)?;
    if discard_zero_diff_png && diagnostic.leading_is_zero() {
      discard_diff_image(&diff_file)?;
    }
    debug!(" for {label} {fuzz}%");
    results.push(diagnostic.into_result());
  }

  Ok(results)
}
