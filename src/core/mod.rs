//! Core application types and state.
//!
//! This module contains the fundamental types used throughout the converter:
//! - [`SourceImage`]: A selected file
//! - [`SelectionRegistry`]: The deduplicated selection
//! - [`ResolvedDimensions`]: Validated resize mode
//! - [`ConversionJob`]: One admitted batch
//! - [`BatchEvent`]: Lifecycle notifications for the presentation layer
//! - [`ConverterConfig`]: Engine settings

mod config;
mod progress;
mod selection;
mod state;
mod task;
mod types;

pub use config::ConverterConfig;
pub use progress::{BatchEvent, Progress, COMPLETED_MESSAGE, STARTED_MESSAGE};
pub use selection::SelectionRegistry;
pub use state::JobState;
pub use task::{ConversionJob, JobId};
pub use types::{ConvertedImage, ResolvedDimensions, SourceImage};
