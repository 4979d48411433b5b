//! Width/height input validation and resize-mode selection.

use serde::{Deserialize, Serialize};
use crate::core::ResolvedDimensions;
use crate::utils::{Axis, DimensionError};

/// Raw width/height text as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionRequest {
    pub width: String,
    pub height: String,
}

impl DimensionRequest {
    pub fn new(width: impl Into<String>, height: impl Into<String>) -> Self {
        Self {
            width: width.into(),
            height: height.into(),
        }
    }

    pub fn resolve(&self) -> Result<ResolvedDimensions, DimensionError> {
        DimensionPolicy::resolve(&self.width, &self.height)
    }
}

/// One axis of the pending dimension form: a toggle and its text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisInput {
    pub enabled: bool,
    pub text: String,
}

impl AxisInput {
    /// Text that counts for resolution; a disabled axis contributes nothing.
    fn effective_text(&self) -> &str {
        if self.enabled { self.text.as_str() } else { "" }
    }
}

/// Dimension input waiting for the next batch.
///
/// Reset after every successful conversion so the next batch starts blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionInput {
    pub width: AxisInput,
    pub height: AxisInput,
}

impl DimensionInput {
    pub fn set_width(&mut self, text: impl Into<String>) {
        self.width = AxisInput { enabled: true, text: text.into() };
    }

    pub fn set_height(&mut self, text: impl Into<String>) {
        self.height = AxisInput { enabled: true, text: text.into() };
    }

    pub fn to_request(&self) -> DimensionRequest {
        DimensionRequest::new(self.width.effective_text(), self.height.effective_text())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Turns raw width/height text into a [`ResolvedDimensions`].
pub struct DimensionPolicy;

impl DimensionPolicy {
    /// Validates the input and picks the resize mode.
    ///
    /// Empty text counts as 0. Only width → `WidthOnly`, only height →
    /// `HeightOnly`, both → `Both`. Negative values, non-numbers and a pair of
    /// zeros are rejected.
    pub fn resolve(width_text: &str, height_text: &str) -> Result<ResolvedDimensions, DimensionError> {
        let width = parse_axis(Axis::Width, width_text)?;
        let height = parse_axis(Axis::Height, height_text)?;

        match (width, height) {
            (w, 0) if w > 0 => Ok(ResolvedDimensions::WidthOnly(w)),
            (0, h) if h > 0 => Ok(ResolvedDimensions::HeightOnly(h)),
            (w, h) if w > 0 && h > 0 => Ok(ResolvedDimensions::Both(w, h)),
            _ => Err(DimensionError::BothZero),
        }
    }
}

fn parse_axis(axis: Axis, text: &str) -> Result<u32, DimensionError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }

    let not_a_number = || DimensionError::NotANumber { axis, input: text.to_string() };
    let value: i64 = text.parse().map_err(|_| not_a_number())?;
    if value < 0 {
        return Err(DimensionError::Negative { axis, value });
    }

    u32::try_from(value).map_err(|_| not_a_number())
}
