// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session configuration

use crate::error::{MeasureError, Result};
use crate::region::MIN_SELECTION_SIZE;
use crate::types::LengthUnit;
use serde::{Deserialize, Serialize};

/// How regions are acquired in a session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    /// Calibrate, then click inside a room to auto-detect its outline
    #[default]
    AutoDetect,
    /// Drag rectangles and type in their real dimensions
    Rectangle,
}

/// Configuration for a measurement session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MeasureConfig {
    /// Region acquisition workflow
    pub workflow: Workflow,
    /// Unit the calibration distance is entered in
    pub unit: LengthUnit,
    /// Minimum width and height of a dragged rectangle (canvas units)
    pub min_selection_size: f64,
}

impl Default for MeasureConfig {
    fn default() -> Self {
        Self {
            workflow: Workflow::AutoDetect,
            unit: LengthUnit::Feet,
            min_selection_size: MIN_SELECTION_SIZE,
        }
    }
}

impl MeasureConfig {
    /// Parse and validate a JSON configuration; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: MeasureConfig =
            serde_json::from_str(json).map_err(|e| MeasureError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.min_selection_size.is_finite() && self.min_selection_size >= 0.0) {
            return Err(MeasureError::InvalidConfig(format!(
                "min_selection_size must be a non-negative number, got {}",
                self.min_selection_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = MeasureConfig::from_json(r#"{"workflow":"rectangle"}"#).unwrap();
        assert_eq!(config.workflow, Workflow::Rectangle);
        assert_eq!(config.unit, LengthUnit::Feet);
        assert_eq!(config.min_selection_size, 10.0);
    }

    #[test]
    fn test_json_round_trip_keys() {
        let config = MeasureConfig {
            unit: LengthUnit::Meters,
            ..Default::default()
        };
        let json = config.to_json();
        assert!(json.contains("\"unit\":\"m\""));
        assert!(json.contains("\"min_selection_size\":10.0"));
        assert_eq!(MeasureConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            MeasureConfig::from_json(r#"{"min_selection_size":-1}"#),
            Err(MeasureError::InvalidConfig(_))
        ));
        assert!(matches!(
            MeasureConfig::from_json("not json"),
            Err(MeasureError::InvalidConfig(_))
        ));
    }
}
