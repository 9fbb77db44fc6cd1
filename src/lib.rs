//! Pixel comparison of graphics trace screenshot sets.

pub mod comparator;
pub mod diagnostic;
pub mod error;
pub mod file_set;
pub mod fuzz_ab;
pub mod image_compare;
pub mod manifest;
pub mod trace_name;
pub mod versus_native;
pub mod versus_upgrade;

pub use comparator::{Comparator, CompareRequest, ImageMagickComparator, Metric, FUZZ_FACTORS};
pub use error::{Error, Result};
pub use image_compare::BuiltinComparator;
