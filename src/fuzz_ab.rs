//! Fuzzy comparison of two arbitrary screenshot directories.

use crate::comparator::{compare_with_fuzz_factors, ensure_outdir, Comparator};
use crate::diagnostic::summary_line;
use crate::error::Result;
use crate::file_set::common_files;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct FuzzAbOptions {
  pub a_dir: PathBuf,
  pub b_dir: PathBuf,
  pub outdir: PathBuf,
  /// Compare the intersection when the file lists differ.
  pub relaxed_file_list_match: bool,
  pub discard_zero_diff_png: bool,
}

pub fn run(comparator: &dyn Comparator, options: &FuzzAbOptions) -> Result<()> {
  let files = common_files(
    options.relaxed_file_list_match,
    &options.a_dir,
    &options.b_dir,
  )?;
  ensure_outdir(&options.outdir)?;
  info!(count = files.len(), "fuzzy comparing screenshots");

  for image in &files {
    let results = compare_with_fuzz_factors(
      comparator,
      &options.outdir,
      options.discard_zero_diff_png,
      image,
      &options.a_dir.join(image),
      &options.b_dir.join(image),
    )?;
    println!("{}", summary_line(&[image.as_str()], &results));
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::comparator::tests::ScriptedComparator;
  use crate::error::Error;
  use std::fs;

  fn setup(a_files: &[&str], b_files: &[&str], relaxed: bool) -> (tempfile::TempDir, FuzzAbOptions) {
    let temp = tempfile::tempdir().expect("tempdir");
    let a_dir = temp.path().join("a");
    let b_dir = temp.path().join("b");
    fs::create_dir_all(&a_dir).expect("create a");
    fs::create_dir_all(&b_dir).expect("create b");
    for file in a_files {
      fs::write(a_dir.join(file), b"").expect("write a file");
    }
    for file in b_files {
      fs::write(b_dir.join(file), b"").expect("write b file");
    }
    let options = FuzzAbOptions {
      a_dir,
      b_dir,
      outdir: temp.path().join("out"),
      relaxed_file_list_match: relaxed,
      discard_zero_diff_png: false,
    };
    (temp, options)
  }

  #[test]
  fn nonzero_differences_do_not_fail() {
    let (_temp, options) = setup(&["x.png"], &["x.png"], false);
    let comparator = ScriptedComparator::new(&["90", "70", "50", "20", "5", "0"], false);
    run(&comparator, &options).expect("fuzz_ab never fails on differences");
    assert_eq!(comparator.seen.borrow().len(), 6);
    assert!(options.outdir.is_dir());
  }

  #[test]
  fn relaxed_match_compares_only_the_intersection() {
    let (_temp, options) = setup(&["a.png", "shared.png"], &["b.png", "shared.png"], true);
    let comparator = ScriptedComparator::new(&["0"; 6], false);
    run(&comparator, &options).expect("relaxed match");

    let seen = comparator.seen.borrow();
    assert_eq!(seen.len(), 6);
    assert!(seen
      .iter()
      .all(|args| args[4].ends_with("shared.png") && args[5].ends_with("shared.png")));
  }

  #[test]
  fn strict_mismatch_fails() {
    let (_temp, options) = setup(&["a.png"], &["b.png"], false);
    let comparator = ScriptedComparator::new(&[], false);
    let err = run(&comparator, &options).expect_err("strict mismatch");
    assert!(matches!(err, Error::FileListMismatch { .. }));
  }
}
