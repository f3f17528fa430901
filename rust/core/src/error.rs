// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for measurement operations.
//!
//! Every variant is a recoverable, user-facing condition. The `Display`
//! text of each variant is what the session writes to its status line.

use thiserror::Error;

/// Result type for measurement operations
pub type Result<T> = std::result::Result<T, MeasureError>;

/// Errors that can occur while calibrating or measuring a floor plan
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasureError {
    #[error("Upload an image first.")]
    NoImageLoaded,

    #[error("Click inside the blueprint image area.")]
    InvalidClickLocation,

    #[error("Enter a valid real distance.")]
    InvalidCalibrationInput(String),

    #[error("Set scale first (2 clicks).")]
    CalibrationRequired,

    #[error("Region detector still loading, try again in a moment.")]
    DetectorNotReady,

    #[error("Couldn't find a closed room outline. Try a clearer image or click again inside the room.")]
    RegionNotFound,

    #[error("Detected shape was too small/invalid. Try another click or a higher-res image.")]
    RegionDegenerate { vertices: usize },

    #[error("Selection too small (minimum {min} x {min}).")]
    SelectionTooSmall { width: f64, height: f64, min: f64 },

    #[error("Enter a valid real width and height.")]
    InvalidRealDimensions,

    #[error("Error during detection. Try refreshing or using a simpler/high-contrast image.")]
    DetectorFailure(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Parse a user-entered real-world value
///
/// Missing, non-numeric, non-finite and non-positive input all yield `None`.
pub fn parse_positive(input: Option<&str>) -> Option<f64> {
    let value: f64 = input?.trim().parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive(Some("12.5")), Some(12.5));
        assert_eq!(parse_positive(Some(" 3 ")), Some(3.0));
        assert_eq!(parse_positive(Some("0")), None);
        assert_eq!(parse_positive(Some("-4")), None);
        assert_eq!(parse_positive(Some("abc")), None);
        assert_eq!(parse_positive(Some("")), None);
        assert_eq!(parse_positive(Some("inf")), None);
        assert_eq!(parse_positive(Some("NaN")), None);
        assert_eq!(parse_positive(None), None);
    }

    #[test]
    fn test_status_text() {
        assert_eq!(
            MeasureError::InvalidClickLocation.to_string(),
            "Click inside the blueprint image area."
        );
        let err = MeasureError::SelectionTooSmall {
            width: 4.0,
            height: 50.0,
            min: 10.0,
        };
        assert_eq!(err.to_string(), "Selection too small (minimum 10 x 10).");
    }
}
