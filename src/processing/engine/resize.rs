//! Resize logic mapping `ResolvedDimensions` modes to `image` operations.

use image::imageops::FilterType;
use image::{DynamicImage, Limits};
use crate::core::ResolvedDimensions;
use crate::utils::ConversionError;

const FILTER: FilterType = FilterType::Lanczos3;

/// Size of one pixel in the RGBA f32 buffers `resize_exact` samples through.
const WORKING_BYTES_PER_PIXEL: u64 = 16;

/// Applies the resize carried by `dimensions` to `image`.
///
/// `WidthOnly` and `HeightOnly` derive the other side from the source aspect
/// ratio; `Both` stretches to the exact box. Upscaling is allowed in every mode
/// as long as the working buffers fit in the decoder's default allocation limit.
pub fn apply_resize(
    image: &DynamicImage,
    dimensions: ResolvedDimensions,
    filename: &str,
) -> Result<DynamicImage, ConversionError> {
    let (width, height) = (image.width(), image.height());
    let (target_w, target_h) = dimensions.target_size(width, height);

    if (target_w, target_h) == (width, height) {
        return Ok(image.clone());
    }

    let needed = working_bytes(width, height, target_w, target_h);
    let budget = Limits::default().max_alloc.unwrap_or(u64::MAX);
    if needed > budget {
        return Err(ConversionError::resize(
            filename,
            format!("{target_w}×{target_h} needs {needed} bytes of working memory, limit is {budget}"),
        ));
    }

    Ok(image.resize_exact(target_w, target_h, FILTER))
}

/// Largest buffer of the separable resize: one pass per axis, then the output.
fn working_bytes(width: u32, height: u32, target_w: u32, target_h: u32) -> u64 {
    let vertical = width as u64 * target_h as u64;
    let horizontal = target_w as u64 * height as u64;
    let output = target_w as u64 * target_h as u64;
    vertical.max(horizontal).max(output).saturating_mul(WORKING_BYTES_PER_PIXEL)
}
