// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Region acquisition: detector-seeded polygons and manual rectangle drags

use crate::area::rectangle_real_area;
use crate::calibration::PixelsPerUnit;
use crate::error::{parse_positive, MeasureError, Result};
use crate::types::{Point2D, Polygon, RasterImage, Rect, SavedRegion};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default minimum width and height of a dragged selection (canvas units)
pub const MIN_SELECTION_SIZE: f64 = 10.0;

/// Why a detector call produced no usable polygon
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    /// Nothing large enough encloses the seed
    #[error("no region contains the seed point")]
    NotFound,

    /// A region was found but simplified to fewer than 3 vertices
    #[error("detected region is degenerate ({vertices} vertices)")]
    Degenerate { vertices: usize },

    /// The detector itself failed
    #[error("detector failure: {0}")]
    Failed(String),
}

impl From<DetectionError> for MeasureError {
    fn from(err: DetectionError) -> Self {
        match err {
            DetectionError::NotFound => MeasureError::RegionNotFound,
            DetectionError::Degenerate { vertices } => MeasureError::RegionDegenerate { vertices },
            DetectionError::Failed(reason) => MeasureError::DetectorFailure(reason),
        }
    }
}

/// Input handed to a region detector
#[derive(Debug, Clone, Copy)]
pub struct DetectionRequest<'a> {
    /// Loaded image at intrinsic resolution
    pub image: &'a RasterImage,
    /// Where the image is drawn on the canvas
    pub image_bounds: Rect,
    /// Seed point in canvas space
    pub seed: Point2D,
}

/// Finds the closed region enclosing a seed point
///
/// Implementations return polygons in canvas space. When several closed
/// contours contain the seed the one with the largest pixel area wins.
pub trait RegionDetector {
    fn detect(&mut self, request: &DetectionRequest<'_>)
        -> std::result::Result<Polygon, DetectionError>;
}

/// Source of user-entered real-world values
pub trait MeasurementPrompt {
    /// Known distance between the two calibration points
    fn real_distance(&mut self) -> Option<String>;

    /// Real width of a dragged rectangle (feet)
    fn real_width(&mut self, rect: &Rect) -> Option<String>;

    /// Real height of a dragged rectangle (feet)
    fn real_height(&mut self, rect: &Rect) -> Option<String>;
}

/// Prompt answering with fixed values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticPrompt {
    pub distance: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

impl StaticPrompt {
    pub fn distance(value: impl Into<String>) -> Self {
        Self {
            distance: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn dimensions(width: impl Into<String>, height: impl Into<String>) -> Self {
        Self {
            distance: None,
            width: Some(width.into()),
            height: Some(height.into()),
        }
    }
}

impl MeasurementPrompt for StaticPrompt {
    fn real_distance(&mut self) -> Option<String> {
        self.distance.clone()
    }

    fn real_width(&mut self, _rect: &Rect) -> Option<String> {
        self.width.clone()
    }

    fn real_height(&mut self, _rect: &Rect) -> Option<String> {
        self.height.clone()
    }
}

/// Ask the detector for the region around `request.seed`
///
/// Refused until the session is calibrated. Any polygon with fewer than
/// three vertices is reported as degenerate, whatever the detector claims.
pub fn acquire_by_seed(
    detector: &mut dyn RegionDetector,
    request: &DetectionRequest<'_>,
    calibration: Option<PixelsPerUnit>,
) -> Result<Polygon> {
    if calibration.is_none() {
        return Err(MeasureError::CalibrationRequired);
    }

    let polygon = detector.detect(request)?;
    if polygon.points.len() < 3 {
        return Err(MeasureError::RegionDegenerate {
            vertices: polygon.points.len(),
        });
    }

    tracing::debug!(
        vertices = polygon.points.len(),
        seed_x = request.seed.x,
        seed_y = request.seed.y,
        "Region detected"
    );
    Ok(Polygon::closed(polygon.points))
}

/// Manual rectangle drag gesture
#[derive(Debug, Clone, Default)]
pub struct DragTracker {
    start: Option<Point2D>,
    current: Option<Point2D>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.start.is_some()
    }

    pub fn begin(&mut self, point: Point2D) {
        self.start = Some(point);
        self.current = Some(point);
    }

    /// Move the free corner; returns the in-progress rectangle
    pub fn update(&mut self, point: Point2D) -> Option<Rect> {
        self.start?;
        self.current = Some(point);
        self.current_rect()
    }

    pub fn current_rect(&self) -> Option<Rect> {
        Some(Rect::from_corners(self.start?, self.current?))
    }

    /// Finish the drag
    ///
    /// Returns `Ok(None)` if no drag was in progress and
    /// `SelectionTooSmall` when either side is under `min_size`.
    pub fn end(&mut self, point: Point2D, min_size: f64) -> Result<Option<Rect>> {
        let Some(start) = self.start.take() else {
            return Ok(None);
        };
        self.current = None;

        let rect = Rect::from_corners(start, point);
        if rect.w < min_size || rect.h < min_size {
            return Err(MeasureError::SelectionTooSmall {
                width: rect.w,
                height: rect.h,
                min: min_size,
            });
        }
        Ok(Some(rect))
    }

    pub fn cancel(&mut self) {
        self.start = None;
        self.current = None;
    }
}

/// Prompt for the real dimensions of an accepted rectangle and build the
/// region to save
pub fn commit_rectangle(rect: Rect, prompt: &mut dyn MeasurementPrompt) -> Result<SavedRegion> {
    let real_width = parse_positive(prompt.real_width(&rect).as_deref())
        .ok_or(MeasureError::InvalidRealDimensions)?;
    let real_height = parse_positive(prompt.real_height(&rect).as_deref())
        .ok_or(MeasureError::InvalidRealDimensions)?;

    Ok(SavedRegion {
        rect,
        real_width,
        real_height,
        area: rectangle_real_area(real_width, real_height),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct FixedDetector(std::result::Result<Polygon, DetectionError>);

    impl RegionDetector for FixedDetector {
        fn detect(
            &mut self,
            _request: &DetectionRequest<'_>,
        ) -> std::result::Result<Polygon, DetectionError> {
            self.0.clone()
        }
    }

    /// Answers 10 x 12 and counts how often it was asked
    #[derive(Default)]
    struct CountingPrompt {
        asked: usize,
    }

    impl MeasurementPrompt for CountingPrompt {
        fn real_distance(&mut self) -> Option<String> {
            self.asked += 1;
            None
        }
        fn real_width(&mut self, _rect: &Rect) -> Option<String> {
            self.asked += 1;
            Some("10".into())
        }
        fn real_height(&mut self, _rect: &Rect) -> Option<String> {
            self.asked += 1;
            Some("12".into())
        }
    }

    fn image() -> RasterImage {
        RasterImage::new(4, 4, vec![255; 64]).unwrap()
    }

    fn square() -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_seed_requires_calibration() {
        let img = image();
        let request = DetectionRequest {
            image: &img,
            image_bounds: Rect::new(0.0, 0.0, 4.0, 4.0),
            seed: Point2D::new(1.0, 1.0),
        };
        let mut detector = FixedDetector(Ok(Polygon::closed(square())));
        let err = acquire_by_seed(&mut detector, &request, None).unwrap_err();
        assert_eq!(err, MeasureError::CalibrationRequired);
    }

    #[test]
    fn test_seed_results() {
        let img = image();
        let request = DetectionRequest {
            image: &img,
            image_bounds: Rect::new(0.0, 0.0, 4.0, 4.0),
            seed: Point2D::new(1.0, 1.0),
        };
        let scale = PixelsPerUnit::new(2.0);

        let mut ok = FixedDetector(Ok(Polygon {
            points: square(),
            closed: false,
        }));
        let polygon = acquire_by_seed(&mut ok, &request, scale).unwrap();
        assert!(polygon.closed);
        assert_eq!(polygon.points.len(), 4);

        let mut short = FixedDetector(Ok(Polygon::closed(square()[..2].to_vec())));
        assert_eq!(
            acquire_by_seed(&mut short, &request, scale).unwrap_err(),
            MeasureError::RegionDegenerate { vertices: 2 }
        );

        let mut missing = FixedDetector(Err(DetectionError::NotFound));
        assert_eq!(
            acquire_by_seed(&mut missing, &request, scale).unwrap_err(),
            MeasureError::RegionNotFound
        );

        let mut broken = FixedDetector(Err(DetectionError::Failed("boom".into())));
        assert!(matches!(
            acquire_by_seed(&mut broken, &request, scale).unwrap_err(),
            MeasureError::DetectorFailure(_)
        ));
    }

    #[test]
    fn test_drag_normalizes_direction() {
        let mut drag = DragTracker::new();
        drag.begin(Point2D::new(100.0, 80.0));
        let live = drag.update(Point2D::new(40.0, 20.0)).unwrap();
        assert_eq!(live, Rect::new(40.0, 20.0, 60.0, 60.0));

        let rect = drag
            .end(Point2D::new(30.0, 10.0), MIN_SELECTION_SIZE)
            .unwrap()
            .unwrap();
        assert_eq!(rect, Rect::new(30.0, 10.0, 70.0, 70.0));
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_small_drag_rejected() {
        for end in [Point2D::new(109.0, 200.0), Point2D::new(200.0, 95.0)] {
            let mut drag = DragTracker::new();
            drag.begin(Point2D::new(100.0, 100.0));
            let result = drag.end(end, MIN_SELECTION_SIZE);
            assert!(matches!(
                result,
                Err(MeasureError::SelectionTooSmall { .. })
            ));
            assert!(!drag.is_dragging());
        }
    }

    #[test]
    fn test_end_without_begin() {
        let mut drag = DragTracker::new();
        assert_eq!(drag.end(Point2D::new(1.0, 1.0), 10.0).unwrap(), None);
        assert!(drag.update(Point2D::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_commit_rectangle() {
        let rect = Rect::new(0.0, 0.0, 50.0, 60.0);
        let mut prompt = CountingPrompt::default();
        let saved = commit_rectangle(rect, &mut prompt).unwrap();
        assert_eq!(prompt.asked, 2);
        assert_relative_eq!(saved.area, 120.0);
        assert_eq!(saved.rect, rect);

        let mut bad = StaticPrompt::dimensions("12", "-1");
        assert_eq!(
            commit_rectangle(rect, &mut bad).unwrap_err(),
            MeasureError::InvalidRealDimensions
        );
        let mut missing = StaticPrompt::default();
        assert_eq!(
            commit_rectangle(rect, &mut missing).unwrap_err(),
            MeasureError::InvalidRealDimensions
        );
    }
}
