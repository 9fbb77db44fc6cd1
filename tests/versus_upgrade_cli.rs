use image::{Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

#[cfg(unix)]
fn make_executable(path: &Path) {
  use std::os::unix::fs::PermissionsExt;
  let mut perms = fs::metadata(path).expect("stat stub executable").permissions();
  perms.set_mode(0o755);
  fs::set_permissions(path, perms).expect("chmod stub executable");
}

fn write_color_png(path: &Path, color: [u8; 4]) {
  let img = RgbaImage::from_pixel(3, 3, Rgba(color));
  img.save(path).expect("save png");
}

fn setup(root: &Path) -> (PathBuf, PathBuf, PathBuf) {
  let before = root.join("before");
  let after = root.join("after");
  let out = root.join("out");
  fs::create_dir_all(&before).expect("create before");
  fs::create_dir_all(&after).expect("create after");
  (before, after, out)
}

fn run_upgrade(cwd: &Path, extra: &[&str], before: &Path, after: &Path, out: &Path) -> Output {
  Command::new(env!("CARGO_BIN_EXE_compare_trace_screenshots"))
    .current_dir(cwd)
    .args(extra)
    .arg("versus_upgrade")
    .arg("--before")
    .arg(before)
    .arg("--after")
    .arg(after)
    .arg("--out")
    .arg(out)
    .output()
    .expect("run versus_upgrade")
}

#[test]
fn identical_screenshots_pass() {
  let tmp = tempfile::TempDir::new().expect("tempdir");
  let (before, after, out) = setup(tmp.path());
  for name in ["a.png", "b.png"] {
    write_color_png(&before.join(name), [9, 9, 9, 255]);
    write_color_png(&after.join(name), [9, 9, 9, 255]);
  }

  let output = run_upgrade(tmp.path(), &["--comparator", "builtin", "-d"], &before, &after, &out);
  assert!(output.status.success(), "{:?}", output.status.code());
  assert_eq!(
    String::from_utf8_lossy(&output.stdout),
    "a.png 0 (0)\nb.png 0 (0)\nTest completed successfully, no diffs detected\n"
  );
  assert!(!out.join("a.png_TEST_diff.png").exists());
}

#[test]
fn first_pixel_diff_aborts_with_exit_one() {
  let tmp = tempfile::TempDir::new().expect("tempdir");
  let (before, after, out) = setup(tmp.path());
  write_color_png(&before.join("a.png"), [9, 9, 9, 255]);
  write_color_png(&after.join("a.png"), [9, 9, 9, 255]);
  write_color_png(&before.join("b.png"), [0, 0, 0, 255]);
  write_color_png(&after.join("b.png"), [255, 0, 0, 255]);
  write_color_png(&before.join("c.png"), [0, 0, 0, 255]);
  write_color_png(&after.join("c.png"), [0, 0, 255, 255]);

  let output = run_upgrade(tmp.path(), &["--comparator", "builtin"], &before, &after, &out);
  assert_eq!(output.status.code(), Some(1));

  let stdout = String::from_utf8_lossy(&output.stdout);
  let lines: Vec<&str> = stdout.lines().collect();
  assert_eq!(lines.len(), 3, "{stdout}");
  assert_eq!(lines[0], "a.png 0 (0)");
  assert!(lines[1].starts_with("b.png "), "{stdout}");
  assert_eq!(lines[2], "Pixel diff detected!");
  assert!(!stdout.contains("c.png"), "run should stop at the first diff");
  assert!(out.join("b.png_TEST_diff.png").exists());
}

#[test]
fn file_list_mismatch_exits_one() {
  let tmp = tempfile::TempDir::new().expect("tempdir");
  let (before, after, out) = setup(tmp.path());
  write_color_png(&before.join("a.png"), [9, 9, 9, 255]);
  write_color_png(&after.join("a.png"), [9, 9, 9, 255]);
  write_color_png(&after.join("new.png"), [9, 9, 9, 255]);

  let output = run_upgrade(tmp.path(), &["--comparator", "builtin"], &before, &after, &out);
  assert_eq!(output.status.code(), Some(1));
  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.starts_with("File lists don't match!\n"), "{stdout}");
  assert!(stdout.contains("files: ['new.png']"), "{stdout}");
}

#[test]
#[cfg(unix)]
fn rmse_diagnostic_from_compare_executable_is_checked() {
  let tmp = tempfile::TempDir::new().expect("tempdir");
  let (before, after, out) = setup(tmp.path());
  fs::write(before.join("a.png"), b"").expect("write before");
  fs::write(after.join("a.png"), b"").expect("write after");

  // Zero magnitude but non-zero normalized error still counts as a difference.
  let stub = tmp.path().join("compare");
  fs::write(&stub, "#!/usr/bin/env sh\necho '0 (1e-05)' >&2\nexit 1\n").expect("write stub");
  make_executable(&stub);
  let stub_arg = stub.to_str().expect("utf-8 path");

  let output = run_upgrade(tmp.path(), &["--compare-bin", stub_arg], &before, &after, &out);
  assert_eq!(output.status.code(), Some(1));
  assert_eq!(
    String::from_utf8_lossy(&output.stdout),
    "a.png 0 (1e-05)\nPixel diff detected!\n"
  );
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("pixel diff detected in a.png"), "{stderr}");
}
