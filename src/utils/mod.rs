pub mod error;
pub mod fs;

pub use error::{Axis, ConversionError, ConverterError, ConverterResult, DimensionError};
pub use fs::{CONVERTED_PREFIX, converted_filename, output_path};
