//! Reconciling the file lists of two screenshot directories.

use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Lists the entry names directly under `dir`, sorted lexicographically.
pub fn list_dir_sorted(dir: &Path) -> Result<Vec<String>> {
  let mut names = Vec::new();
  for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
    let entry = entry.map_err(|source| Error::ListDir {
      path: dir.to_path_buf(),
      source,
    })?;
    names.push(entry.file_name().to_string_lossy().into_owned());
  }
  names.sort();
  Ok(names)
}

/// Returns the sorted file names to compare between `a_dir` and `b_dir`.
///
/// Identical listings are returned as-is. Otherwise the names unique to each side are printed and,
/// unless `relaxed` is set, [`Error::FileListMismatch`] is returned. In relaxed mode the sorted
/// intersection is returned, or [`Error::NoCommonFiles`] when it is empty.
pub fn common_files(relaxed: bool, a_dir: &Path, b_dir: &Path) -> Result<Vec<String>> {
  let a_files = list_dir_sorted(a_dir)?;
  let b_files = list_dir_sorted(b_dir)?;
  reconcile(relaxed, a_dir, b_dir, a_files, b_files)
}

fn reconcile(
  relaxed: bool,
  a_dir: &Path,
  b_dir: &Path,
  a_files: Vec<String>,
  b_files: Vec<String>,
) -> Result<Vec<String>> {
  if a_files == b_files {
    debug!(count = a_files.len(), "file lists match");
    return Ok(a_files);
  }

  let a_set: BTreeSet<&String> = a_files.iter().collect();
  let b_set: BTreeSet<&String> = b_files.iter().collect();

  let only_in_a: Vec<String> = a_set.difference(&b_set).map(|s| (*s).clone()).collect();
  let only_in_b: Vec<String> = b_set.difference(&a_set).map(|s| (*s).clone()).collect();

  println!("File lists don't match!");
  if !only_in_a.is_empty() {
    println!("Extra '{}' files: {}", a_dir.display(), format_name_list(&only_in_a));
  }
  if !only_in_b.is_empty() {
    println!("Extra '{}' files: {}", b_dir.display(), format_name_list(&only_in_b));
  }

  if !relaxed {
    return Err(Error::FileListMismatch {
      a_dir: a_dir.to_path_buf(),
      b_dir: b_dir.to_path_buf(),
      only_in_a,
      only_in_b,
    });
  }

  let common: Vec<String> = a_set.intersection(&b_set).map(|s| (*s).clone()).collect();
  if common.is_empty() {
    println!("No matches between file lists while using relaxed match!");
    return Err(Error::NoCommonFiles {
      a_dir: a_dir.to_path_buf(),
      b_dir: b_dir.to_path_buf(),
    });
  }

  debug!(count = common.len(), "using relaxed file list intersection");
  Ok(common)
}

fn format_name_list(names: &[String]) -> String {
  let quoted = names
    .iter()
    .map(|name| format!("'{name}'"))
    .collect::<Vec<_>>()
    .join(", ");
  format!("[{quoted}]")
}
