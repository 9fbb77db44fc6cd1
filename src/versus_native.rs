//! Native renderer vs. Vulkan renderer screenshots of the same traces.

use crate::comparator::{compare_with_fuzz_factors, ensure_outdir, Comparator};
use crate::diagnostic::summary_line;
use crate::error::Result;
use crate::file_set::list_dir_sorted;
use crate::manifest::{load_key_frame, load_trace_names};
use crate::trace_name::{is_trace_screenshot, trace_name, Renderer, MISSING_SCREENSHOT};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct VersusNativeOptions {
  /// Directory holding both sets of screenshots.
  pub screenshot_dir: PathBuf,
  /// Directory containing `restricted_traces.json`.
  pub trace_list_path: Option<PathBuf>,
  /// Where diff images go; the screenshot directory when unset.
  pub outdir: Option<PathBuf>,
  pub discard_zero_diff_png: bool,
}

/// Trace names found by scanning screenshot filenames.
pub fn traces_from_screenshots(file_names: &[String]) -> BTreeSet<String> {
  file_names
    .iter()
    .filter(|name| is_trace_screenshot(name))
    .filter_map(|name| {
      let trace = trace_name(name);
      if trace.is_none() {
        debug!(file = %name, "skipping screenshot without a known renderer prefix");
      }
      trace
    })
    .map(str::to_string)
    .collect()
}

fn existing(path: PathBuf) -> Option<PathBuf> {
  path.is_file().then_some(path)
}

/// Native and alternate screenshot paths for `trace`.
///
/// Missing files are replaced by [`MISSING_SCREENSHOT`]. The alternate renderer falls back from
/// Vulkan to Vulkan SwiftShader.
pub fn resolve_screenshots(
  screenshot_dir: &Path,
  trace: &str,
  frame: Option<u32>,
) -> (PathBuf, PathBuf) {
  let native = existing(screenshot_dir.join(Renderer::Native.screenshot_name(trace, frame)))
    .unwrap_or_else(|| PathBuf::from(MISSING_SCREENSHOT));

  let alternate = [Renderer::Vulkan, Renderer::VulkanSwiftShader]
    .into_iter()
    .find_map(|renderer| existing(screenshot_dir.join(renderer.screenshot_name(trace, frame))))
    .unwrap_or_else(|| PathBuf::from(MISSING_SCREENSHOT));

  (native, alternate)
}

fn base_name(path: &Path) -> String {
  path
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default()
}

pub fn run(comparator: &dyn Comparator, options: &VersusNativeOptions) -> Result<()> {
  let outdir = options
    .outdir
    .clone()
    .unwrap_or_else(|| options.screenshot_dir.clone());
  ensure_outdir(&outdir)?;

  let traces = match &options.trace_list_path {
    Some(trace_list_path) => load_trace_names(trace_list_path)?,
    None => traces_from_screenshots(&list_dir_sorted(&options.screenshot_dir)?),
  };
  info!(count = traces.len(), "comparing vulkan vs. native screenshots");

  for trace in &traces {
    let frame = match &options.trace_list_path {
      Some(trace_list_path) => load_key_frame(trace_list_path, trace)?,
      None => None,
    };

    let (native_file, alternate_file) =
      resolve_screenshots(&options.screenshot_dir, trace, frame);
    let results = compare_with_fuzz_factors(
      comparator,
      &outdir,
      options.discard_zero_diff_png,
      trace,
      &alternate_file,
      &native_file,
    )?;

    let alternate_name = base_name(&alternate_file);
    let native_name = base_name(&native_file);
    println!(
      "{}",
      summary_line(
        &[trace.as_str(), alternate_name.as_str(), native_name.as_str()],
        &results
      )
    );
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::comparator::tests::ScriptedComparator;
  use std::fs;

  fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn scanning_collects_unique_trace_names() {
    let traces = traces_from_screenshots(&names(&[
      "angle_native_aztec.png",
      "angle_vulkan_aztec.png",
      "angle_vulkan_swiftshader_manhattan.png",
      "angle_native_zelda_frame7.png",
      "notes.txt",
      "swiftshader_other.png",
    ]));
    let traces: Vec<String> = traces.into_iter().collect();
    assert_eq!(traces, names(&["aztec", "manhattan", "zelda_frame7"]));
  }

  #[test]
  fn resolves_existing_screenshots_with_frame() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("angle_native_foo_frame3.png"), b"").expect("write native");
    fs::write(temp.path().join("angle_vulkan_foo_frame3.png"), b"").expect("write vulkan");

    let (native, alternate) = resolve_screenshots(temp.path(), "foo", Some(3));
    assert_eq!(native, temp.path().join("angle_native_foo_frame3.png"));
    assert_eq!(alternate, temp.path().join("angle_vulkan_foo_frame3.png"));
  }

  #[test]
  fn falls_back_to_swiftshader_then_missing() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("angle_vulkan_swiftshader_foo.png"), b"").expect("write ss");

    let (native, alternate) = resolve_screenshots(temp.path(), "foo", None);
    assert_eq!(native, PathBuf::from(MISSING_SCREENSHOT));
    assert_eq!(
      alternate,
      temp.path().join("angle_vulkan_swiftshader_foo.png")
    );

    let (_, alternate) = resolve_screenshots(temp.path(), "bar", None);
    assert_eq!(alternate, PathBuf::from(MISSING_SCREENSHOT));
  }

  #[test]
  fn compares_alternate_against_native() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("angle_native_foo.png"), b"").expect("write native");
    fs::write(temp.path().join("angle_vulkan_foo.png"), b"").expect("write vulkan");

    let comparator = ScriptedComparator::new(&["0"; 6], false);
    run(
      &comparator,
      &VersusNativeOptions {
        screenshot_dir: temp.path().to_path_buf(),
        trace_list_path: None,
        outdir: None,
        discard_zero_diff_png: false,
      },
    )
    .expect("versus_native");

    let seen = comparator.seen.borrow();
    assert_eq!(seen.len(), 6);
    let first = &seen[0];
    assert!(first[4].ends_with("angle_vulkan_foo.png"), "{first:?}");
    assert!(first[5].ends_with("angle_native_foo.png"), "{first:?}");
    assert!(first[6].ends_with("foo_fuzz0%_TEST_diff.png"), "{first:?}");
  }
}
