//! Sequential resize-and-save executor.
//!
//! Images are handled one after another in job order and the job stops at the
//! first failure. Files already written for earlier images stay on disk.

use tracing::{debug, warn};

use image::ImageReader;

use crate::core::{ConversionJob, ConvertedImage, ConverterConfig, ResolvedDimensions, SourceImage};
use crate::utils::{ConversionError, output_path};

use super::formats::save_jpeg;
use super::resize::apply_resize;

type Result<T> = std::result::Result<T, ConversionError>;

/// Anything that can run a whole [`ConversionJob`].
///
/// Implementations block; callers run them off the async runtime.
pub trait ImageConverter: Send + Sync {
    /// Converts every image in `job`, calling `on_converted` after each write.
    ///
    /// Returns the number of images written, or the first failure.
    fn convert_and_save_with_progress(
        &self,
        job: &ConversionJob,
        on_converted: &mut dyn FnMut(&ConvertedImage),
    ) -> Result<usize>;

    fn convert_and_save(&self, job: &ConversionJob) -> Result<usize> {
        self.convert_and_save_with_progress(job, &mut |_| {})
    }
}

/// Converter backed by the `image` crate.
#[derive(Debug, Clone, Default)]
pub struct ConversionEngine {
    config: ConverterConfig,
}

impl ConversionEngine {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Decodes, resizes and writes one image into `destination`.
    pub fn convert_single(
        &self,
        source: &SourceImage,
        dimensions: ResolvedDimensions,
        destination: &str,
    ) -> Result<ConvertedImage> {
        let filename = source.filename.as_str();

        let image = ImageReader::open(&source.path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| ConversionError::read(filename, e))?
            .decode()
            .map_err(|e| ConversionError::decode(filename, e))?;

        debug!("Loaded '{}': {}×{}", filename, image.width(), image.height());

        let resized = apply_resize(&image, dimensions, filename)?;

        let output = output_path(destination, filename);
        let bytes_written = save_jpeg(&resized, &output, self.config.jpeg_quality, filename)?;

        debug!(
            "'{}' → {} ({}×{}, {} bytes)",
            filename,
            output.display(),
            resized.width(),
            resized.height(),
            bytes_written
        );

        Ok(ConvertedImage {
            filename: source.filename.clone(),
            source_path: source.path.clone(),
            output_path: output,
            width: resized.width(),
            height: resized.height(),
            bytes_written,
        })
    }
}

impl ImageConverter for ConversionEngine {
    fn convert_and_save_with_progress(
        &self,
        job: &ConversionJob,
        on_converted: &mut dyn FnMut(&ConvertedImage),
    ) -> Result<usize> {
        if job.destination.is_empty() {
            return Err(ConversionError::EmptyDestination);
        }

        let mut written = 0;
        for source in &job.images {
            let converted = self
                .convert_single(source, job.dimensions, &job.destination)
                .inspect_err(|e| warn!("Job {} stopped at {}: {}", job.id, source.filename, e))?;

            written += 1;
            on_converted(&converted);
        }

        Ok(written)
    }
}
