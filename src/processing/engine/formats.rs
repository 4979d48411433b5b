//! Encodes a resized image as JPEG and writes it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageError};
use crate::utils::ConversionError;

type Result<T> = std::result::Result<T, ConversionError>;

/// Writes `image` to `output_path` as JPEG, returning the file size.
///
/// JPEG has no alpha channel, so the image is flattened to RGB first.
/// `filename` is the source name, used to attribute failures.
pub fn save_jpeg(image: &DynamicImage, output_path: &Path, quality: u8, filename: &str) -> Result<u64> {
    let file = File::create(output_path).map_err(|e| ConversionError::write(filename, e))?;
    let mut writer = BufWriter::new(file);

    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode_image(&image.to_rgb8())
        .map_err(|e| classify(filename, e))?;

    let file = writer
        .into_inner()
        .map_err(|e| ConversionError::write(filename, e.error()))?;
    file.sync_all().map_err(|e| ConversionError::write(filename, e))?;

    let metadata = file.metadata().map_err(|e| ConversionError::write(filename, e))?;
    Ok(metadata.len())
}

/// IO failures are write errors; anything else is the encoder's fault.
fn classify(filename: &str, err: ImageError) -> ConversionError {
    match err {
        ImageError::IoError(io) => ConversionError::write(filename, io),
        other => ConversionError::encode(filename, other),
    }
}
