//! Conversion job definition.

use serde::Serialize;
use crate::core::{ResolvedDimensions, SourceImage};

/// Identifier handed out when a job is admitted.
pub type JobId = u64;

/// One admitted batch: the images to convert, how to size them and where to
/// write them.
///
/// The image list is a snapshot owned by the job; the live selection can be
/// edited freely while the job runs.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionJob {
    /// Monotonic job number, used to correlate lifecycle events
    pub id: JobId,
    /// Images in processing order
    pub images: Vec<SourceImage>,
    /// Resize mode applied to every image
    pub dimensions: ResolvedDimensions,
    /// Directory the converted copies are written to
    pub destination: String,
}

impl ConversionJob {
    pub fn new(
        id: JobId,
        images: Vec<SourceImage>,
        dimensions: ResolvedDimensions,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            id,
            images,
            dimensions,
            destination: destination.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
