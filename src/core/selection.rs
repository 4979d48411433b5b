//! Deduplicated set of images chosen for the next batch.

use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;
use crate::core::SourceImage;
use crate::utils::ConverterResult;

/// Selected images keyed by filename.
///
/// Adding a file whose name is already present replaces the old entry.
/// Not synchronized; the orchestrator keeps it behind a lock.
#[derive(Debug, Default, Clone)]
pub struct SelectionRegistry {
    images: BTreeMap<String, SourceImage>,
}

impl SelectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `image`, replacing any entry with the same filename.
    pub fn add(&mut self, image: SourceImage) {
        if let Some(previous) = self.images.insert(image.filename.clone(), image) {
            debug!("Replaced selection entry for {}", previous.filename);
        }
    }

    /// Adds every path handed over by a file picker.
    ///
    /// Stops at the first path without a usable file name; entries added
    /// before it stay selected.
    pub fn add_paths<I, P>(&mut self, paths: I) -> ConverterResult<usize>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut added = 0;
        for path in paths {
            self.add(SourceImage::from_path(path)?);
            added += 1;
        }
        Ok(added)
    }

    /// Removes the entry for `filename`; no-op when absent.
    pub fn remove(&mut self, filename: &str) {
        self.images.remove(filename);
    }

    /// Owned copy of the selection, ordered by filename.
    pub fn snapshot(&self) -> Vec<SourceImage> {
        self.images.values().cloned().collect()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.images.contains_key(filename)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }
}
