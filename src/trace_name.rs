//! Screenshot filename grammar.
//!
//! Trace test screenshots are named `<renderer prefix><trace>[_frame<N>].png`. The renderer
//! prefixes overlap (`angle_vulkan_` is a prefix of `angle_vulkan_swiftshader_`), so recognition
//! walks [`Renderer::ALL`] longest prefix first.

/// Extension shared by every screenshot.
pub const SCREENSHOT_SUFFIX: &str = ".png";

/// Placeholder used in place of a screenshot that does not exist on disk.
///
/// Never joined with a directory, so opening it fails and the comparison reports `NA`.
pub const MISSING_SCREENSHOT: &str = "MISSING_EXT.png";

/// Renderer whose output a screenshot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renderer {
  Native,
  Vulkan,
  VulkanSwiftShader,
}

impl Renderer {
  /// Recognition order: longest prefix first.
  pub const ALL: [Renderer; 3] = [
    Renderer::VulkanSwiftShader,
    Renderer::Vulkan,
    Renderer::Native,
  ];

  pub fn prefix(self) -> &'static str {
    match self {
      Renderer::Native => "angle_native_",
      Renderer::Vulkan => "angle_vulkan_",
      Renderer::VulkanSwiftShader => "angle_vulkan_swiftshader_",
    }
  }

  /// Expected screenshot filename for `trace` rendered by this renderer.
  pub fn screenshot_name(self, trace: &str, frame: Option<u32>) -> String {
    format!(
      "{}{trace}{}{SCREENSHOT_SUFFIX}",
      self.prefix(),
      frame_suffix(frame)
    )
  }
}

/// `_frame<N>` for a key frame, empty otherwise.
pub fn frame_suffix(frame: Option<u32>) -> String {
  frame.map(|n| format!("_frame{n}")).unwrap_or_default()
}

/// Whether a directory entry looks like a native or vulkan screenshot.
pub fn is_trace_screenshot(file_name: &str) -> bool {
  file_name.starts_with("angle_native") || file_name.starts_with("angle_vulkan")
}

/// Splits a screenshot filename into its renderer and trace name.
///
/// Any key frame suffix stays part of the returned trace name.
pub fn parse_screenshot_name(file_name: &str) -> Option<(Renderer, &str)> {
  let renderer = Renderer::ALL
    .into_iter()
    .find(|r| file_name.starts_with(r.prefix()))?;
  let rest = &file_name[renderer.prefix().len()..];
  let trace = rest.strip_suffix(SCREENSHOT_SUFFIX).unwrap_or(rest);
  Some((renderer, trace))
}

/// Derives the trace name from a screenshot filename.
pub fn trace_name(file_name: &str) -> Option<&str> {
  parse_screenshot_name(file_name).map(|(_, trace)| trace)
}
