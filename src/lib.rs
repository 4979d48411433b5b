// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod processing;
pub mod worker;

// Public exports for external consumers
pub use crate::core::{
    BatchEvent, ConversionJob, ConvertedImage, ConverterConfig, JobId, JobState, Progress,
    ResolvedDimensions, SelectionRegistry, SourceImage,
};
pub use processing::{
    ConversionEngine, DimensionInput, DimensionPolicy, DimensionRequest, ImageConverter,
};
pub use utils::{CONVERTED_PREFIX, ConversionError, ConverterError, ConverterResult, DimensionError};
pub use worker::BatchJobOrchestrator;
