// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seeded room outline detection
//!
//! The displayed image is converted to an edge map, outer contours are
//! traced, and the largest contour that contains the seed is simplified
//! into the room polygon.

use crate::config::DetectorConfig;
use crate::error::{DetectorError, Result};
use crate::image_ops::{edge_map, rasterize_displayed};
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use planscale_core::{
    polygon_area, DetectionError, DetectionRequest, Point2D, Polygon, Rect, RegionDetector,
};
use tracing::debug;

/// Region detector driven by a seed click
#[derive(Debug, Clone, Default)]
pub struct SeedDetector {
    config: DetectorConfig,
}

impl SeedDetector {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: DetectorConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Run the pipeline for one request, returning a canvas-space polygon
    pub fn find_region(
        &self,
        request: &DetectionRequest<'_>,
    ) -> std::result::Result<Polygon, DetectionError> {
        let bounds = request.image_bounds;
        let view = DisplayedView::new(bounds)?;
        let local_seed = view.to_local(request.seed)?;

        let contours = {
            let gray = rasterize_displayed(request.image, view.width, view.height)?;
            let edges = edge_map(
                &gray,
                self.config.blur_sigma,
                self.config.canny_low,
                self.config.canny_high,
                self.config.close_radius,
            );
            outer_contours(&edges)
        };
        debug!(count = contours.len(), "outer contours traced");

        let (index, area) =
            select_enclosing_contour(&contours, local_seed, self.config.min_contour_area)
                .ok_or(DetectionError::NotFound)?;
        debug!(index, area, "enclosing contour selected");

        let contour = &contours[index];
        let epsilon = self.config.epsilon_fraction * closed_perimeter(contour);
        let simplified = simplify_closed(contour, epsilon);
        if simplified.len() < 3 {
            return Err(DetectionError::Degenerate {
                vertices: simplified.len(),
            });
        }

        let points = simplified.iter().map(|p| view.to_canvas(*p)).collect();
        Ok(Polygon::closed(points))
    }
}

impl RegionDetector for SeedDetector {
    fn detect(
        &mut self,
        request: &DetectionRequest<'_>,
    ) -> std::result::Result<Polygon, DetectionError> {
        self.find_region(request)
    }
}

/// The image as drawn: canvas rectangle plus its rounded pixel size
struct DisplayedView {
    bounds: Rect,
    width: u32,
    height: u32,
}

impl DisplayedView {
    fn new(bounds: Rect) -> Result<Self> {
        let width = bounds.w.round();
        let height = bounds.h.round();
        if !(width >= 1.0 && height >= 1.0) {
            return Err(DetectorError::EmptyBounds {
                width: bounds.w,
                height: bounds.h,
            });
        }
        Ok(Self {
            bounds,
            width: width as u32,
            height: height as u32,
        })
    }

    fn scale_x(&self) -> f64 {
        self.width as f64 / self.bounds.w
    }

    fn scale_y(&self) -> f64 {
        self.height as f64 / self.bounds.h
    }

    fn to_local(&self, point: Point2D) -> Result<Point2D> {
        let local = Point2D::new(
            (point.x - self.bounds.x) * self.scale_x(),
            (point.y - self.bounds.y) * self.scale_y(),
        );
        let inside = local.x >= 0.0
            && local.y >= 0.0
            && local.x <= self.width as f64
            && local.y <= self.height as f64;
        if !inside {
            return Err(DetectorError::SeedOutsideRaster {
                x: point.x,
                y: point.y,
            });
        }
        Ok(local)
    }

    fn to_canvas(&self, point: Point2D) -> Point2D {
        Point2D::new(
            self.bounds.x + point.x / self.scale_x(),
            self.bounds.y + point.y / self.scale_y(),
        )
    }
}

/// Trace the outermost contours of an edge map
///
/// Holes and contours nested inside another contour are dropped.
pub fn outer_contours(edges: &GrayImage) -> Vec<Vec<Point2D>> {
    find_contours::<i32>(edges)
        .into_iter()
        .filter(|c| c.parent.is_none() && c.border_type == BorderType::Outer)
        .map(|c| {
            c.points
                .iter()
                .map(|p| Point2D::new(p.x as f64, p.y as f64))
                .collect()
        })
        .collect()
}

/// Pick the largest contour (by pixel area) that contains the seed
///
/// Contours smaller than `min_area` are ignored. Returns the index and area
/// of the winner; on equal areas the earlier contour is kept.
pub fn select_enclosing_contour(
    contours: &[Vec<Point2D>],
    seed: Point2D,
    min_area: f64,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;

    for (i, contour) in contours.iter().enumerate() {
        if contour.len() < 3 {
            continue;
        }
        let area = polygon_area(contour);
        if area < min_area || !point_in_polygon(seed, contour) {
            continue;
        }
        if best.map_or(true, |(_, best_area)| area > best_area) {
            best = Some((i, area));
        }
    }

    best
}

/// Even-odd containment test; points on an edge count as inside
pub fn point_in_polygon(point: Point2D, polygon: &[Point2D]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[j];

        if segment_distance(&point, &a, &b) < 1e-9 {
            return true;
        }

        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Perimeter of a closed contour, including the closing edge
pub fn closed_perimeter(points: &[Point2D]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let open: f64 = points.windows(2).map(|w| w[0].distance_to(&w[1])).sum();
    open + points[points.len() - 1].distance_to(&points[0])
}

/// Douglas-Peucker simplification of a closed contour
///
/// The ring is split at the vertex farthest from the first one and both
/// halves are simplified as open polylines.
pub fn simplify_closed(points: &[Point2D], epsilon: f64) -> Vec<Point2D> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let (split, _) = points
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, p)| (i, first.distance_to(p)))
        .fold((0, 0.0), |acc, cur| if cur.1 > acc.1 { cur } else { acc });
    if split == 0 {
        // Every vertex sits on the first one
        return vec![first];
    }

    let mut return_leg: Vec<Point2D> = points[split..].to_vec();
    return_leg.push(first);

    let mut result = douglas_peucker(&points[..=split], epsilon);
    let tail = douglas_peucker(&return_leg, epsilon);
    // Drop the shared split vertex and the repeated start
    result.extend_from_slice(&tail[1..tail.len() - 1]);
    result
}

/// Douglas-Peucker line simplification algorithm
fn douglas_peucker(points: &[Point2D], epsilon: f64) -> Vec<Point2D> {
    if points.len() < 3 {
        return points.to_vec();
    }

    // Find the point with maximum distance from line between first and last
    let first = &points[0];
    let last = &points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_idx = 0;

    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = perpendicular_distance(point, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_idx = i;
        }
    }

    if max_dist > epsilon {
        let left = douglas_peucker(&points[..=max_idx], epsilon);
        let right = douglas_peucker(&points[max_idx..], epsilon);

        // Combine results (excluding duplicate point at max_idx)
        let mut result = left;
        result.extend_from_slice(&right[1..]);
        result
    } else {
        vec![*first, *last]
    }
}

/// Calculate perpendicular distance from point to line
fn perpendicular_distance(point: &Point2D, line_start: &Point2D, line_end: &Point2D) -> f64 {
    let dx = line_end.x - line_start.x;
    let dy = line_end.y - line_start.y;
    let length_sq = dx * dx + dy * dy;

    if length_sq < 1e-10 {
        return point.distance_to(line_start);
    }

    let length = length_sq.sqrt();
    ((point.x - line_start.x) * dy - (point.y - line_start.y) * dx).abs() / length
}

/// Distance from a point to a finite segment
fn segment_distance(point: &Point2D, a: &Point2D, b: &Point2D) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;
    if length_sq < 1e-10 {
        return point.distance_to(a);
    }
    let t = (((point.x - a.x) * dx + (point.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    point.distance_to(&Point2D::new(a.x + t * dx, a.y + t * dy))
}
