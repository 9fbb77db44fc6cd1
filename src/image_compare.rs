//! In-process comparator built on the `image` crate.
//!
//! Produces the same diagnostic text as ImageMagick's `compare` so that the rest of the pipeline
//! does not care which provider ran. Metrics approximate ImageMagick's:
//! - `AE` counts pixels whose normalized RGBA distance exceeds the fuzz fraction.
//! - `RMSE` reports the root mean squared channel error as `<Q16 value> (<normalized>)`.

use crate::comparator::{CompareRequest, Comparator, Metric};
use crate::error::{Error, Result};
use image::{Rgba, RgbaImage};
use std::path::Path;
use tracing::debug;

/// Quantum range of a Q16 ImageMagick build, used to scale the absolute RMSE.
const QUANTUM_RANGE: f64 = 65535.0;

/// Highlight for differing pixels (ImageMagick's default `-highlight-color`).
const HIGHLIGHT: Rgba<u8> = Rgba([241, 0, 30, 255]);

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinComparator;

/// Pixel statistics for two same-sized images.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelStats {
  pub total_pixels: u64,
  /// Pixels whose distance exceeds the fuzz fraction.
  pub different_pixels: u64,
  /// Root mean squared channel error in `[0, 1]`.
  pub rmse: f64,
}

fn load(path: &Path) -> std::result::Result<RgbaImage, String> {
  image::open(path)
    .map(|img| img.to_rgba8())
    .map_err(|err| format!("compare: unable to open image '{}': {err}", path.display()))
}

/// Normalized RGBA distance of two pixels in `[0, 1]`.
fn pixel_distance(a: &Rgba<u8>, b: &Rgba<u8>) -> f64 {
  let sum: f64 = a
    .0
    .iter()
    .zip(b.0.iter())
    .map(|(x, y)| {
      let d = x.abs_diff(*y) as f64 / 255.0;
      d * d
    })
    .sum();
  (sum / 4.0).sqrt()
}

/// Compares two same-sized images, filling `diff_image` with a visualization.
pub fn pixel_stats(
  a: &RgbaImage,
  b: &RgbaImage,
  fuzz_percent: u32,
  diff_image: &mut RgbaImage,
) -> PixelStats {
  let fuzz = fuzz_percent as f64 / 100.0;
  let mut different_pixels = 0u64;
  let mut sum_squared = 0.0f64;

  for (x, y, a_px) in a.enumerate_pixels() {
    let b_px = b.get_pixel(x, y);
    let distance = pixel_distance(a_px, b_px);
    sum_squared += distance * distance;

    let differs = if fuzz_percent == 0 {
      a_px != b_px
    } else {
      distance > fuzz
    };

    if differs {
      different_pixels += 1;
      diff_image.put_pixel(x, y, HIGHLIGHT);
    } else {
      // Faded copy of the first image.
      let faded = a_px.0.map(|c| 255 - (255 - c) / 5);
      diff_image.put_pixel(x, y, Rgba([faded[0], faded[1], faded[2], 255]));
    }
  }

  let total_pixels = (a.width() as u64) * (a.height() as u64);
  let rmse = if total_pixels == 0 {
    0.0
  } else {
    (sum_squared / total_pixels as f64).sqrt()
  };

  PixelStats {
    total_pixels,
    different_pixels,
    rmse,
  }
}

/// Formats like C's `%g`: six significant digits, no trailing zeros.
pub fn format_number(value: f64) -> String {
  if value == 0.0 {
    return "0".to_string();
  }
  let magnitude = value.abs().log10().floor() as i32;
  let decimals = (5 - magnitude).clamp(0, 12) as usize;
  let formatted = format!("{value:.decimals$}");
  if formatted.contains('.') {
    formatted
      .trim_end_matches('0')
      .trim_end_matches('.')
      .to_string()
  } else {
    formatted
  }
}

impl Comparator for BuiltinComparator {
  fn compare(&self, request: &CompareRequest<'_>) -> Result<String> {
    debug!(
      metric = %request.metric,
      fuzz = ?request.fuzz_percent,
      a = %request.a.display(),
      b = %request.b.display(),
      "comparing in-process"
    );

    let a = match load(request.a) {
      Ok(img) => img,
      Err(diagnostic) => return Ok(diagnostic),
    };
    let b = match load(request.b) {
      Ok(img) => img,
      Err(diagnostic) => return Ok(diagnostic),
    };

    if a.dimensions() != b.dimensions() {
      return Ok(format!(
        "compare: image widths or heights differ '{}'",
        request.a.display()
      ));
    }

    let mut diff_image = RgbaImage::new(a.width(), a.height());
    let stats = pixel_stats(&a, &b, request.fuzz_percent.unwrap_or(0), &mut diff_image);
    diff_image.save(request.diff).map_err(|source| Error::Image {
      path: request.diff.to_path_buf(),
      source,
    })?;

    Ok(match request.metric {
      Metric::Ae => stats.different_pixels.to_string(),
      Metric::Rmse => format!(
        "{} ({})",
        format_number(stats.rmse * QUANTUM_RANGE),
        format_number(stats.rmse)
      ),
    })
  }
}
