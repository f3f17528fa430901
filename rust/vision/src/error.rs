// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use planscale_core::DetectionError;
use thiserror::Error;

/// Result type for detector internals
pub type Result<T> = std::result::Result<T, DetectorError>;

/// Errors raised inside the detection pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    #[error("image bounds are empty ({width}x{height})")]
    EmptyBounds { width: f64, height: f64 },

    #[error("seed ({x:.1}, {y:.1}) lies outside the raster")]
    SeedOutsideRaster { x: f64, y: f64 },

    #[error("invalid detector config: {0}")]
    InvalidConfig(String),
}

impl From<DetectorError> for DetectionError {
    fn from(err: DetectorError) -> Self {
        DetectionError::Failed(err.to_string())
    }
}
