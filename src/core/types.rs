//! Core types for selected images, resolved dimensions and conversion results.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::utils::{ConverterError, ConverterResult};

/// A readable file chosen for conversion.
///
/// Keyed by `filename` in the selection; immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceImage {
    /// Bare file name, unique within a selection
    pub filename: String,
    /// Full path to the file on disk
    pub path: PathBuf,
}

impl SourceImage {
    pub fn new(filename: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            path: path.into(),
        }
    }

    /// Builds a handle from a path, taking the last component as the filename.
    pub fn from_path(path: impl AsRef<Path>) -> ConverterResult<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ConverterError::invalid_source(
                format!("Path has no usable file name: {}", path.display())
            ))?;

        Ok(Self::new(filename, path))
    }
}

/// Output size request, already validated.
///
/// Exactly one mode is active. `WidthOnly` and `HeightOnly` keep the source
/// aspect ratio; `Both` forces an exact box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolvedDimensions {
    WidthOnly(u32),
    HeightOnly(u32),
    Both(u32, u32),
}

impl ResolvedDimensions {
    /// Output size for a `width`×`height` source.
    ///
    /// Proportional modes round to the nearest pixel and never go below 1.
    pub fn target_size(&self, width: u32, height: u32) -> (u32, u32) {
        match *self {
            Self::WidthOnly(w) => (w, scale(height, w, width)),
            Self::HeightOnly(h) => (scale(width, h, height), h),
            Self::Both(w, h) => (w, h),
        }
    }
}

/// `value * numerator / denominator`, rounded, clamped to at least 1.
fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    if denominator == 0 {
        return numerator.max(1);
    }
    let scaled = (value as f64 * numerator as f64 / denominator as f64).round();
    (scaled as u32).max(1)
}

/// Result of converting a single image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertedImage {
    /// Source filename the copy was made from
    pub filename: String,
    /// Path to the source file
    pub source_path: PathBuf,
    /// Path the converted copy was written to
    pub output_path: PathBuf,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Size of the written file in bytes
    pub bytes_written: u64,
}
