// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Two-click scale calibration
//!
//! The user clicks two points a known real distance apart; the ratio of
//! their pixel distance to that real distance becomes the session's
//! pixels-per-unit scale.
//!
//! ```text
//! Idle ──begin()──> AwaitingFirstClick ──click──> AwaitingSecondClick
//!                        ^                                │
//!                        └──── invalid real distance ─────┤
//!                                                         └──valid──> Idle (calibrated)
//! ```

use crate::error::{parse_positive, MeasureError, Result};
use crate::types::{LengthUnit, Point2D, Rect};
use serde::{Deserialize, Serialize};

/// Calibrated scale, always finite and strictly positive
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
pub struct PixelsPerUnit(f64);

impl PixelsPerUnit {
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Self(value))
    }

    /// Derive the scale from a pixel distance and the matching real distance
    pub fn from_distances(pixel_distance: f64, real_distance: f64) -> Option<Self> {
        if !(real_distance.is_finite() && real_distance > 0.0) {
            return None;
        }
        Self::new(pixel_distance / real_distance)
    }

    pub fn get(&self) -> f64 {
        self.0
    }

    /// Human-readable scale, e.g. `"12.5000 px/ft (=0.080000 ft/px)"`
    pub fn summary(&self, unit: LengthUnit) -> String {
        format!(
            "{:.4} px/{} (={:.6} {}/px)",
            self.0,
            unit.label(),
            1.0 / self.0,
            unit.label()
        )
    }
}

/// Calibration gesture state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CalibrationState {
    #[default]
    Idle,
    AwaitingFirstClick,
    AwaitingSecondClick,
}

/// What a successfully handled calibration click did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationStep {
    /// Calibration is not in progress; the click was not consumed
    Inactive,
    /// First point recorded, waiting for the second
    FirstPoint(Point2D),
    /// Both points recorded and the scale derived
    Calibrated {
        pixel_distance: f64,
        real_distance: f64,
        pixels_per_unit: PixelsPerUnit,
    },
}

/// Two-click scale calibration state machine
#[derive(Debug, Clone, Default)]
pub struct ScaleCalibrator {
    state: CalibrationState,
    clicks: Vec<Point2D>,
    pixels_per_unit: Option<PixelsPerUnit>,
}

impl ScaleCalibrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    /// Recorded reference points (zero, one or two)
    pub fn clicks(&self) -> &[Point2D] {
        &self.clicks
    }

    pub fn pixels_per_unit(&self) -> Option<PixelsPerUnit> {
        self.pixels_per_unit
    }

    pub fn is_calibrated(&self) -> bool {
        self.pixels_per_unit.is_some()
    }

    /// Start a fresh calibration, discarding any previous points and scale
    pub fn begin(&mut self) {
        self.clicks.clear();
        self.pixels_per_unit = None;
        self.state = CalibrationState::AwaitingFirstClick;
        tracing::debug!("Calibration started");
    }

    /// Drop all calibration state
    pub fn reset(&mut self) {
        self.clicks.clear();
        self.pixels_per_unit = None;
        self.state = CalibrationState::Idle;
    }

    /// Move recorded points into a rescaled canvas geometry
    ///
    /// `map` takes old canvas coordinates to new ones and `factor` is the
    /// ratio of new to old canvas pixels. Real distances are unchanged, so
    /// the scale grows by the same factor.
    pub fn rescale<F>(&mut self, map: F, factor: f64)
    where
        F: Fn(Point2D) -> Point2D,
    {
        for p in &mut self.clicks {
            *p = map(*p);
        }
        self.pixels_per_unit = self
            .pixels_per_unit
            .and_then(|ppu| PixelsPerUnit::new(ppu.get() * factor));
    }

    /// Register a click on the canvas
    ///
    /// `read_real_distance` is only consulted when the click completes a
    /// pair. Clicks outside `image_bounds` are rejected without touching
    /// state.
    pub fn register_click<F>(
        &mut self,
        point: Point2D,
        image_bounds: &Rect,
        read_real_distance: F,
    ) -> Result<CalibrationStep>
    where
        F: FnOnce() -> Option<String>,
    {
        if self.state == CalibrationState::Idle {
            return Ok(CalibrationStep::Inactive);
        }
        if !image_bounds.contains(point) {
            tracing::warn!(x = point.x, y = point.y, "Calibration click outside image");
            return Err(MeasureError::InvalidClickLocation);
        }

        self.clicks.push(point);

        if self.clicks.len() < 2 {
            self.state = CalibrationState::AwaitingSecondClick;
            return Ok(CalibrationStep::FirstPoint(point));
        }

        let pixel_distance = self.clicks[0].distance_to(&self.clicks[1]);
        let raw = read_real_distance();
        let outcome = match parse_positive(raw.as_deref()) {
            None => Err(format!("real distance {:?} is not a positive number", raw)),
            Some(real_distance) => PixelsPerUnit::from_distances(pixel_distance, real_distance)
                .map(|ppu| (real_distance, ppu))
                .ok_or_else(|| "calibration points coincide".to_string()),
        };

        match outcome {
            Ok((real_distance, pixels_per_unit)) => {
                self.pixels_per_unit = Some(pixels_per_unit);
                self.state = CalibrationState::Idle;
                tracing::info!(
                    pixel_distance,
                    real_distance,
                    pixels_per_unit = pixels_per_unit.get(),
                    "Scale calibrated"
                );
                Ok(CalibrationStep::Calibrated {
                    pixel_distance,
                    real_distance,
                    pixels_per_unit,
                })
            }
            Err(reason) => {
                tracing::warn!(%reason, "Calibration rejected");
                self.clicks.clear();
                self.pixels_per_unit = None;
                self.state = CalibrationState::AwaitingFirstClick;
                Err(MeasureError::InvalidCalibrationInput(reason))
            }
        }
    }
}
