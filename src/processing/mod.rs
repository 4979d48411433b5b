mod dimensions;
mod engine;

pub use dimensions::{AxisInput, DimensionInput, DimensionPolicy, DimensionRequest};
pub use engine::{ConversionEngine, ImageConverter};
