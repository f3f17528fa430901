// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end measurement workflows driven through raw pointer coordinates.

use approx::assert_relative_eq;
use planscale_core::{
    CanvasLayout, ClickOutcome, Collaborators, CommandRecorder, DetectionError,
    DetectionRequest, DrawCommand, MeasureConfig, MeasureError, MeasurementPrompt, Mode,
    Point2D, Polygon, RasterImage, Rect, RegionDetector, Session, Workflow,
};

/// Returns the polygon scaled from image space into canvas space, like a
/// detector working on the displayed raster would
struct ImageSpaceDetector {
    outline: Vec<Point2D>,
}

impl RegionDetector for ImageSpaceDetector {
    fn detect(
        &mut self,
        request: &DetectionRequest<'_>,
    ) -> Result<Polygon, DetectionError> {
        let bounds = request.image_bounds;
        let sx = bounds.w / request.image.width() as f64;
        let sy = bounds.h / request.image.height() as f64;
        let points = self
            .outline
            .iter()
            .map(|p| Point2D::new(bounds.x + p.x * sx, bounds.y + p.y * sy))
            .collect();
        Ok(Polygon::closed(points))
    }
}

/// Replays queued answers in order
#[derive(Default)]
struct ScriptedPrompt {
    answers: Vec<Option<String>>,
}

impl ScriptedPrompt {
    fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().rev().map(|a| Some(a.to_string())).collect(),
        }
    }

    fn next(&mut self) -> Option<String> {
        self.answers.pop().flatten()
    }
}

impl MeasurementPrompt for ScriptedPrompt {
    fn real_distance(&mut self) -> Option<String> {
        self.next()
    }

    fn real_width(&mut self, _rect: &Rect) -> Option<String> {
        self.next()
    }

    fn real_height(&mut self, _rect: &Rect) -> Option<String> {
        self.next()
    }
}

fn blank_raster(width: u32, height: u32) -> RasterImage {
    RasterImage::new(width, height, vec![255; (width * height * 4) as usize]).unwrap()
}

/// 1600x1200 backing canvas displayed at half size, offset by (8, 60)
fn css_scaled_layout() -> CanvasLayout {
    CanvasLayout {
        width: 1600.0,
        height: 1200.0,
        client_left: 8.0,
        client_top: 60.0,
        client_width: 800.0,
        client_height: 600.0,
    }
}

#[test]
fn auto_detect_workflow_through_client_coordinates() {
    let mut session = Session::new(MeasureConfig::default(), css_scaled_layout());
    let mut renderer = CommandRecorder::new();
    let mut detector = ImageSpaceDetector {
        // 400 x 300 image px room in a 800x600 image
        outline: vec![
            Point2D::new(100.0, 100.0),
            Point2D::new(500.0, 100.0),
            Point2D::new(500.0, 400.0),
            Point2D::new(100.0, 400.0),
        ],
    };
    let mut prompt = ScriptedPrompt::new(&["20"]);

    session.load_image(blank_raster(800, 600), &mut renderer);
    // Same aspect ratio: the image fills the whole canvas at 2x
    assert_eq!(session.image_bounds(), Rect::new(0.0, 0.0, 1600.0, 1200.0));

    let mut host = Collaborators {
        renderer: &mut renderer,
        detector: &mut detector,
        prompt: &mut prompt,
    };

    session.begin_calibration(host.renderer).unwrap();
    // Client (58, 110) -> canvas (100, 100); client (258, 110) -> canvas (500, 100)
    let p0 = session.to_canvas_point(58.0, 110.0);
    let p1 = session.to_canvas_point(258.0, 110.0);
    assert_eq!(p0, Point2D::new(100.0, 100.0));
    session.click(p0, &mut host).unwrap();
    let outcome = session.click(p1, &mut host).unwrap();
    match outcome {
        // 400 canvas px over 20 ft
        ClickOutcome::Calibrated(ppu) => assert_relative_eq!(ppu.get(), 20.0),
        other => panic!("unexpected outcome {:?}", other),
    }

    session.begin_auto_detect().unwrap();
    let seed = session.to_canvas_point(300.0, 300.0);
    let outcome = session.click(seed, &mut host).unwrap();

    // Room is 800 x 600 canvas px = 480000 px^2; at 20 px/ft that is 1200 sq ft
    match outcome {
        ClickOutcome::Measured { area, .. } => assert_relative_eq!(area.value, 1200.0),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(session.area_text(), "1200.00 sq ft");

    // Recalibrating drops the scale but keeps the detected region
    session.begin_calibration(host.renderer).unwrap();
    assert!(session.pixels_per_unit().is_none());
    assert_eq!(session.current_region().points.len(), 4);
    assert_eq!(session.mode(), Mode::Scale);
}

#[test]
fn calibration_restarts_after_rejected_distance() {
    let mut session = Session::new(
        MeasureConfig::default(),
        CanvasLayout::unscaled(400.0, 400.0),
    );
    let mut renderer = CommandRecorder::new();
    let mut detector = ImageSpaceDetector { outline: vec![] };
    let mut prompt = ScriptedPrompt::new(&["-2", "4"]);

    session.load_image(blank_raster(400, 400), &mut renderer);
    let mut host = Collaborators {
        renderer: &mut renderer,
        detector: &mut detector,
        prompt: &mut prompt,
    };
    session.begin_calibration(host.renderer).unwrap();

    session.click(Point2D::new(0.0, 0.0), &mut host).unwrap();
    let err = session
        .click(Point2D::new(0.0, 100.0), &mut host)
        .unwrap_err();
    assert!(matches!(err, MeasureError::InvalidCalibrationInput(_)));
    assert!(session.scale_points().is_empty());

    // The next pair starts from scratch
    let first = session.click(Point2D::new(10.0, 10.0), &mut host).unwrap();
    assert_eq!(first, ClickOutcome::ScalePoint(Point2D::new(10.0, 10.0)));
    session.click(Point2D::new(10.0, 90.0), &mut host).unwrap();
    assert_relative_eq!(session.pixels_per_unit().unwrap().get(), 20.0);
}

#[test]
fn rectangle_workflow_accumulates_saved_regions() {
    let config = MeasureConfig {
        workflow: Workflow::Rectangle,
        ..Default::default()
    };
    let mut session = Session::new(config, CanvasLayout::unscaled(600.0, 400.0));
    let mut renderer = CommandRecorder::new();
    let mut detector = ImageSpaceDetector { outline: vec![] };
    let mut prompt = ScriptedPrompt::new(&["10", "12", "8", "5"]);

    session.load_image(blank_raster(600, 400), &mut renderer);

    let drags = [
        (Point2D::new(10.0, 10.0), Point2D::new(110.0, 130.0)),
        (Point2D::new(300.0, 300.0), Point2D::new(200.0, 250.0)),
    ];
    for (start, end) in drags {
        session.pointer_down(start, &mut renderer).unwrap();
        session.pointer_move(end, &mut renderer);
        let mut host = Collaborators {
            renderer: &mut renderer,
            detector: &mut detector,
            prompt: &mut prompt,
        };
        session.pointer_up(end, &mut host).unwrap();
    }

    assert_eq!(session.saved_regions().len(), 2);
    assert_relative_eq!(session.total_saved_area(), 160.0);
    assert_eq!(session.area_text(), "40.00 sq ft");
    assert_eq!(
        session.saved_regions()[1].rect,
        Rect::new(200.0, 250.0, 100.0, 50.0)
    );

    let saved_draws = renderer
        .commands()
        .iter()
        .filter(|c| matches!(c, DrawCommand::Rectangle { .. }))
        .count();
    assert_eq!(saved_draws, 2);

    session.reset(true, &mut renderer);
    assert!(session.saved_regions().is_empty());
    assert!(session.area().is_none());
    assert!(session.has_image());
}
