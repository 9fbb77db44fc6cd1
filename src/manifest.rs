//! Restricted trace manifests.
//!
//! `restricted_traces.json` lists traces as `"<name> <version>"` strings. Each trace also has a
//! `<name>/<name>.json` metadata file that may declare key frames.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const TRACE_LIST_FILE: &str = "restricted_traces.json";

#[derive(Debug, Deserialize)]
pub struct TraceList {
  pub traces: Vec<String>,
}

impl TraceList {
  /// Sorted, de-duplicated trace names with the version token dropped.
  pub fn trace_names(&self) -> BTreeSet<String> {
    self
      .traces
      .iter()
      .filter_map(|entry| entry.split(' ').next())
      .filter(|name| !name.is_empty())
      .map(str::to_string)
      .collect()
  }
}

#[derive(Debug, Deserialize)]
pub struct TraceMetadataFile {
  #[serde(rename = "TraceMetadata")]
  pub trace_metadata: TraceMetadata,
}

#[derive(Debug, Deserialize)]
pub struct TraceMetadata {
  #[serde(rename = "KeyFrames", default)]
  pub key_frames: Option<Vec<u32>>,
}

impl TraceMetadata {
  pub fn first_key_frame(&self) -> Option<u32> {
    self.key_frames.as_ref().and_then(|frames| frames.first().copied())
  }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
  let raw = fs::read_to_string(path).map_err(|source| Error::ReadManifest {
    path: path.to_path_buf(),
    source,
  })?;
  serde_json::from_str(&raw).map_err(|source| Error::ParseManifest {
    path: path.to_path_buf(),
    source,
  })
}

/// Reads the trace names declared by `<trace_list_dir>/restricted_traces.json`.
pub fn load_trace_names(trace_list_dir: &Path) -> Result<BTreeSet<String>> {
  let path = trace_list_dir.join(TRACE_LIST_FILE);
  let list: TraceList = read_json(&path)?;
  let names = list.trace_names();
  debug!(count = names.len(), path = %path.display(), "loaded trace list");
  Ok(names)
}

pub fn trace_metadata_path(trace_list_dir: &Path, trace: &str) -> PathBuf {
  trace_list_dir.join(trace).join(format!("{trace}.json"))
}

/// First key frame declared for `trace`, if any.
///
/// A trace without a metadata file has no key frame.
pub fn load_key_frame(trace_list_dir: &Path, trace: &str) -> Result<Option<u32>> {
  let path = trace_metadata_path(trace_list_dir, trace);
  match fs::metadata(&path) {
    Ok(_) => {}
    Err(err) if err.kind() == ErrorKind::NotFound => {
      warn!(trace, path = %path.display(), "trace metadata not found; assuming no key frame");
      return Ok(None);
    }
    Err(source) => return Err(Error::ReadManifest { path, source }),
  }
  let metadata: TraceMetadataFile = read_json(&path)?;
  Ok(metadata.trace_metadata.first_key_frame())
}
