// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Detector configuration

use crate::error::{DetectorError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the seed detection pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    /// Gaussian blur sigma (1.1 matches a 5x5 kernel)
    pub blur_sigma: f32,
    /// Canny edge detection low threshold
    pub canny_low: f32,
    /// Canny edge detection high threshold
    pub canny_high: f32,
    /// Morphological close radius (2 = 5x5 square element)
    pub close_radius: u8,
    /// Contours below this area are noise (square pixels)
    pub min_contour_area: f64,
    /// Simplification tolerance as a fraction of the contour perimeter
    pub epsilon_fraction: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1,
            canny_low: 50.0,
            canny_high: 150.0,
            close_radius: 2,
            min_contour_area: 2000.0,
            epsilon_fraction: 0.01,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.blur_sigma > 0.0) {
            return Err(DetectorError::InvalidConfig(format!(
                "blur_sigma must be positive, got {}",
                self.blur_sigma
            )));
        }
        if self.canny_low > self.canny_high {
            return Err(DetectorError::InvalidConfig(format!(
                "canny_low ({}) exceeds canny_high ({})",
                self.canny_low, self.canny_high
            )));
        }
        if !(self.min_contour_area >= 0.0) {
            return Err(DetectorError::InvalidConfig(format!(
                "min_contour_area must be non-negative, got {}",
                self.min_contour_area
            )));
        }
        if !(self.epsilon_fraction >= 0.0 && self.epsilon_fraction < 1.0) {
            return Err(DetectorError::InvalidConfig(format!(
                "epsilon_fraction must be in [0, 1), got {}",
                self.epsilon_fraction
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: DetectorConfig = serde_json::from_str(json)
            .map_err(|e| DetectorError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}
