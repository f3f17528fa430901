// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar area computation and pixel-to-real conversion

use crate::calibration::PixelsPerUnit;
use crate::types::Point2D;

/// Polygon area using the shoelace formula
///
/// The sequence is treated as implicitly closed and the absolute value is
/// taken, so winding order does not matter. Self-intersecting input yields
/// the signed-area sum, which can undercount.
pub fn polygon_area(points: &[Point2D]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }

    (area / 2.0).abs()
}

/// Convert an area in square canvas pixels to square real units
pub fn pixel_area_to_real_area(pixel_area: f64, scale: PixelsPerUnit) -> f64 {
    let ppu = scale.get();
    pixel_area / (ppu * ppu)
}

/// Real area of a manually measured rectangle
///
/// Uses the user-supplied real dimensions only; pixel calibration plays no
/// part here.
pub fn rectangle_real_area(real_width: f64, real_height: f64) -> f64 {
    real_width * real_height
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rectangle_corners() -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 10.0),
            Point2D::new(5.0, 10.0),
            Point2D::new(5.0, 0.0),
        ]
    }

    #[test]
    fn test_rectangle_area() {
        assert_relative_eq!(polygon_area(&rectangle_corners()), 50.0);
    }

    #[test]
    fn test_winding_independent() {
        let mut points = rectangle_corners();
        points.reverse();
        assert_relative_eq!(polygon_area(&points), 50.0);
    }

    #[test]
    fn test_rotation_independent() {
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(40.0, 0.0),
            Point2D::new(40.0, 30.0),
            Point2D::new(20.0, 45.0),
            Point2D::new(0.0, 30.0),
        ];
        let expected = polygon_area(&points);
        assert_relative_eq!(expected, 1500.0);
        for k in 1..points.len() {
            let mut rotated = points.clone();
            rotated.rotate_left(k);
            assert_relative_eq!(polygon_area(&rotated), expected);
        }
    }

    #[test]
    fn test_too_few_points() {
        assert_eq!(polygon_area(&[]), 0.0);
        assert_eq!(
            polygon_area(&[Point2D::new(0.0, 0.0), Point2D::new(1.0, 1.0)]),
            0.0
        );
    }

    #[test]
    fn test_pixel_to_real_round_trip() {
        for ppu in [0.5, 1.0, 12.5, 96.0] {
            let scale = PixelsPerUnit::new(ppu).unwrap();
            for k in [1.0, 7.25, 300.0] {
                assert_relative_eq!(
                    pixel_area_to_real_area(k * ppu * ppu, scale),
                    k,
                    max_relative = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_rectangle_real_area() {
        assert_relative_eq!(rectangle_real_area(12.0, 10.5), 126.0);
    }
}
