// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core value types shared by every measurement component

use crate::error::{MeasureError, Result};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A point in canvas space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Euclidean distance between two points
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        nalgebra::distance(&self.to_nalgebra(), &other.to_nalgebra())
    }
}

/// Axis-aligned rectangle in canvas space with non-negative size
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Normalized rectangle spanned by two opposite corners, in any order
    pub fn from_corners(a: Point2D, b: Point2D) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            w: (b.x - a.x).abs(),
            h: (b.y - a.y).abs(),
        }
    }

    /// Inclusive on all four edges
    pub fn contains(&self, p: Point2D) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }
}

/// Decoded RGBA8 raster of the loaded floor plan
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl RasterImage {
    /// Wrap RGBA pixel data (4 bytes per pixel)
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MeasureError::InvalidImage(format!(
                "image has zero size ({}x{})",
                width, height
            )));
        }
        let expected_len = width as usize * height as usize * 4;
        if rgba.len() != expected_len {
            return Err(MeasureError::InvalidImage(format!(
                "invalid RGBA data length: expected {}, got {}",
                expected_len,
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

/// Real-world length unit used for calibration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LengthUnit {
    #[serde(rename = "m")]
    Meters,
    #[default]
    #[serde(rename = "ft")]
    Feet,
    #[serde(rename = "in")]
    Inches,
}

impl LengthUnit {
    pub fn label(&self) -> &'static str {
        match self {
            LengthUnit::Meters => "m",
            LengthUnit::Feet => "ft",
            LengthUnit::Inches => "in",
        }
    }

    pub fn area_label(&self) -> &'static str {
        match self {
            LengthUnit::Meters => "sq m",
            LengthUnit::Feet => "sq ft",
            LengthUnit::Inches => "sq in",
        }
    }
}

impl FromStr for LengthUnit {
    type Err = MeasureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "m" => Ok(LengthUnit::Meters),
            "ft" => Ok(LengthUnit::Feet),
            "in" => Ok(LengthUnit::Inches),
            other => Err(MeasureError::UnknownUnit(other.to_string())),
        }
    }
}

/// Latest computed area, shown next to its unit label
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AreaReading {
    pub value: f64,
    pub unit: LengthUnit,
}

impl fmt::Display for AreaReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.value, self.unit.area_label())
    }
}

/// Closed polygon returned by the region detector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Polygon {
    pub points: Vec<Point2D>,
    pub closed: bool,
}

impl Polygon {
    pub fn closed(points: Vec<Point2D>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Manually dragged rectangle committed with its real dimensions (feet)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SavedRegion {
    pub rect: Rect,
    pub real_width: f64,
    pub real_height: f64,
    pub area: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(3.0, 4.0);
        assert_relative_eq!(a.distance_to(&b), 5.0);
        assert_relative_eq!(b.distance_to(&a), 5.0);
    }

    #[test]
    fn test_rect_from_corners_any_direction() {
        let expected = Rect::new(10.0, 20.0, 30.0, 40.0);
        let a = Point2D::new(10.0, 20.0);
        let b = Point2D::new(40.0, 60.0);
        assert_eq!(Rect::from_corners(a, b), expected);
        assert_eq!(Rect::from_corners(b, a), expected);
        assert_eq!(
            Rect::from_corners(Point2D::new(40.0, 20.0), Point2D::new(10.0, 60.0)),
            expected
        );
    }

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::new(0.0, 100.0, 400.0, 300.0);
        assert!(r.contains(Point2D::new(0.0, 100.0)));
        assert!(r.contains(Point2D::new(400.0, 400.0)));
        assert!(!r.contains(Point2D::new(200.0, 99.9)));
        assert!(!r.contains(Point2D::new(400.1, 200.0)));
    }

    #[test]
    fn test_raster_length_checked() {
        assert!(RasterImage::new(2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            RasterImage::new(2, 2, vec![0; 15]),
            Err(MeasureError::InvalidImage(_))
        ));
        assert!(RasterImage::new(0, 2, Vec::new()).is_err());
    }

    #[test]
    fn test_unit_labels() {
        assert_eq!("ft".parse::<LengthUnit>().unwrap(), LengthUnit::Feet);
        assert_eq!(LengthUnit::Meters.area_label(), "sq m");
        assert!("yd".parse::<LengthUnit>().is_err());

        let reading = AreaReading {
            value: 123.456,
            unit: LengthUnit::Inches,
        };
        assert_eq!(reading.to_string(), "123.46 sq in");
    }

    #[test]
    fn test_unit_serde_labels() {
        let json = serde_json::to_string(&LengthUnit::Meters).unwrap();
        assert_eq!(json, "\"m\"");
        let unit: LengthUnit = serde_json::from_str("\"in\"").unwrap();
        assert_eq!(unit, LengthUnit::Inches);
    }
}
