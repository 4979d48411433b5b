//! Native image conversion via the `image` crate.
//!
//! # Architecture
//!
//! - [`ConversionEngine`]: Runs a whole job sequentially, fail-fast.
//! - [`resize`]: Maps `ResolvedDimensions` modes to `resize_exact` targets, within a memory budget.
//! - [`formats`]: Encodes the result as JPEG.

mod executor;
mod formats;
mod resize;

pub use executor::{ConversionEngine, ImageConverter};
