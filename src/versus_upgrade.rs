//! Strict before/after comparison used when upgrading a trace.
//!
//! Both directories must hold exactly the same files, and every pair must be pixel-identical. The
//! first difference aborts the run.

use crate::comparator::{
  discard_diff_image, ensure_outdir, run_comparison, CompareRequest, Comparator, Metric,
};
use crate::diagnostic::{summary_line, Diagnostic};
use crate::error::{Error, Result};
use crate::file_set::common_files;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct VersusUpgradeOptions {
  pub before: PathBuf,
  pub after: PathBuf,
  pub outdir: PathBuf,
  pub discard_zero_diff_png: bool,
}

/// `<outdir>/<file>_TEST_diff.png`
pub fn upgrade_diff_path(outdir: &Path, file: &str) -> PathBuf {
  outdir.join(format!("{file}_TEST_diff.png"))
}

pub fn run(comparator: &dyn Comparator, options: &VersusUpgradeOptions) -> Result<()> {
  let files = common_files(false, &options.before, &options.after)?;
  ensure_outdir(&options.outdir)?;
  info!(count = files.len(), "comparing before/after screenshots");

  for image in &files {
    let diff_file = upgrade_diff_path(&options.outdir, image);
    let before = options.before.join(image);
    let after = options.after.join(image);
    let request = CompareRequest {
      metric: Metric::Rmse,
      fuzz_percent: None,
      a: &before,
      b: &after,
      diff: &diff_file,
    };

    let diagnostic = run_comparison(comparator, &request)?;
    if let Diagnostic::Metric { raw, .. } = &diagnostic {
      if !diagnostic.is_zero() {
        println!("{image} {raw}");
        println!("Pixel diff detected!");
        return Err(Error::PixelDiff {
          file: image.clone(),
          diagnostic: raw.clone(),
        });
      }
      if options.discard_zero_diff_png {
        discard_diff_image(&diff_file)?;
      }
    }

    println!("{}", summary_line(&[image.as_str()], &[diagnostic.into_result()]));
  }

  println!("Test completed successfully, no diffs detected");
  Ok(())
}
