//! Error types for the image converter.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.
//! Payloads are plain strings so every error can be serialized and handed to a UI.

use std::io;
use thiserror::Error;
use serde::Serialize;

/// Rejected width/height input.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DimensionError {
    /// Text was neither empty nor an integer
    #[error("Dimensions has to be a number: {axis} was '{input}'")]
    NotANumber { axis: Axis, input: String },
    /// Parsed value was below zero
    #[error("{axis} of a new image cannot be less than 0")]
    Negative { axis: Axis, value: i64 },
    /// Nothing to resize to
    #[error("Both width and height cannot be 0")]
    BothZero,
}

/// Which dimension a [`DimensionError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Axis {
    Width,
    Height,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Width => f.write_str("Width"),
            Self::Height => f.write_str("Height"),
        }
    }
}

/// Failure while converting a job.
///
/// Every per-image variant carries the filename of the first image that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConversionError {
    /// Job was handed an empty destination path
    #[error("Path to saving location cannot be empty")]
    EmptyDestination,

    /// Source file could not be read
    #[error("Failed to read '{filename}': {message}")]
    Read { filename: String, message: String },

    /// Source file is not a decodable image
    #[error("Failed to decode '{filename}': {message}")]
    Decode { filename: String, message: String },

    /// Requested output size is too large to resize safely
    #[error("Failed to resize '{filename}': {message}")]
    Resize { filename: String, message: String },

    /// Resized image could not be encoded
    #[error("Failed to encode '{filename}': {message}")]
    Encode { filename: String, message: String },

    /// Output file could not be created or written
    #[error("Failed to write '{filename}': {message}")]
    Write { filename: String, message: String },

    /// Background worker died before reporting a result
    #[error("Conversion worker failed: {0}")]
    Worker(String),
}

impl ConversionError {
    pub fn read(filename: impl Into<String>, err: impl ToString) -> Self {
        Self::Read { filename: filename.into(), message: err.to_string() }
    }

    pub fn decode(filename: impl Into<String>, err: impl ToString) -> Self {
        Self::Decode { filename: filename.into(), message: err.to_string() }
    }

    pub fn resize(filename: impl Into<String>, err: impl ToString) -> Self {
        Self::Resize { filename: filename.into(), message: err.to_string() }
    }

    pub fn encode(filename: impl Into<String>, err: impl ToString) -> Self {
        Self::Encode { filename: filename.into(), message: err.to_string() }
    }

    pub fn write(filename: impl Into<String>, err: impl ToString) -> Self {
        Self::Write { filename: filename.into(), message: err.to_string() }
    }

    pub fn worker<T: Into<String>>(msg: T) -> Self {
        Self::Worker(msg.into())
    }

    /// The offending source filename, if the failure was tied to one image.
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::Read { filename, .. }
            | Self::Decode { filename, .. }
            | Self::Resize { filename, .. }
            | Self::Encode { filename, .. }
            | Self::Write { filename, .. } => Some(filename),
            Self::EmptyDestination | Self::Worker(_) => None,
        }
    }
}

/// Main error type for the converter.
///
/// The first three variants are admission failures returned synchronously by
/// `start_batch`; `Conversion` only ever travels through a failed-job event.
/// `SelectionLocked` is returned by foreground edits made while a job runs.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConverterError {
    /// Width/height input was rejected
    #[error("Invalid dimensions: {0}")]
    InvalidDimension(#[from] DimensionError),

    /// Batch requested with an empty selection
    #[error("No images are chosen")]
    NoImagesSelected,

    /// A job is already running
    #[error("A conversion is already running")]
    JobAlreadyRunning,

    /// Selection or dimension input edited while a job is running
    #[error("Selection cannot change while a conversion is running")]
    SelectionLocked,

    /// Decode/resize/encode/write failure
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(String),

    /// Source path could not be turned into a selection entry
    #[error("Invalid source path: {0}")]
    InvalidSource(String),
}

/// Convenience result type for converter operations.
pub type ConverterResult<T> = Result<T, ConverterError>;

impl ConverterError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_source<T: Into<String>>(msg: T) -> Self {
        Self::InvalidSource(msg.into())
    }
}

// Convert serde_json::Error to ConverterError
impl From<serde_json::Error> for ConverterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

// Convert std::io::Error to ConverterError (config file reads)
impl From<io::Error> for ConverterError {
    fn from(err: io::Error) -> Self {
        Self::Config(err.to_string())
    }
}
