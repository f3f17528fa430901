// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Measurement session: the single owner of all mutable measuring state
//!
//! Every operation runs synchronously on one user event. Errors are handled
//! where they occur: the minimal relevant state is reset, the error text
//! becomes the status line, and the error is returned to the caller for
//! inspection. Nothing here is fatal.

use crate::area::{pixel_area_to_real_area, polygon_area};
use crate::calibration::{CalibrationStep, PixelsPerUnit, ScaleCalibrator};
use crate::config::{MeasureConfig, Workflow};
use crate::error::{MeasureError, Result};
use crate::mapper::{is_inside_image, CanvasLayout};
use crate::region::{
    acquire_by_seed, commit_rectangle, DetectionRequest, DragTracker, MeasurementPrompt,
    RegionDetector,
};
use crate::render::{DrawStyle, Renderer};
use crate::types::{AreaReading, LengthUnit, Point2D, Polygon, RasterImage, Rect, SavedRegion};
use serde::{Deserialize, Serialize};

pub const STATUS_NO_IMAGE: &str = "Upload an image to begin.";
pub const STATUS_IMAGE_LOADED: &str = "Image loaded. Click Set Scale (2 clicks).";
pub const STATUS_READY: &str = "Ready. Set scale, then auto-detect.";
pub const STATUS_SCALE_MODE: &str =
    "Scale mode: click 2 points with a known real distance between them.";
pub const STATUS_SECOND_POINT: &str = "Scale mode: click the second point.";
pub const STATUS_SCALE_SET: &str =
    "Scale set. Now click Auto Detect Room, then click inside the room.";
pub const STATUS_AUTO_SEED: &str = "Auto-detect: click once INSIDE the room you want to measure.";
pub const STATUS_DETECTING: &str = "Detecting room outline...";
pub const STATUS_DETECTED: &str =
    "Auto-detect complete. If it grabbed the wrong region, click Auto Detect and try again.";
pub const STATUS_CLEARED: &str = "Cleared detected result.";
pub const STATUS_DRAGGING: &str = "Drag to size the selection, release to measure.";

/// Text shown in the area display when nothing has been measured
pub const AREA_PLACEHOLDER: &str = "\u{2014}";

/// What pointer clicks currently do
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    #[default]
    None,
    Scale,
    AutoSeed,
    Dragging,
}

/// External capabilities an operation may call out to
pub struct Collaborators<'a> {
    pub renderer: &'a mut dyn Renderer,
    pub detector: &'a mut dyn RegionDetector,
    pub prompt: &'a mut dyn MeasurementPrompt,
}

/// Result of a handled click
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Nothing listens for clicks in the current mode
    Ignored,
    /// First calibration point recorded
    ScalePoint(Point2D),
    /// Calibration completed
    Calibrated(PixelsPerUnit),
    /// Region detected and measured
    Measured { polygon: Polygon, area: AreaReading },
}

/// Snapshot of the user-visible session state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub mode: Mode,
    pub status: String,
    pub scale: String,
    pub area: String,
    pub has_image: bool,
    pub image_bounds: Rect,
    pub scale_points: Vec<Point2D>,
    pub region: Polygon,
    pub saved: Vec<SavedRegion>,
    pub total_saved_area: f64,
}

/// Owner of calibration, regions and gesture state for one loaded image
#[derive(Debug, Clone)]
pub struct Session {
    config: MeasureConfig,
    layout: CanvasLayout,
    image: Option<RasterImage>,
    image_bounds: Rect,
    mode: Mode,
    calibrator: ScaleCalibrator,
    region: Polygon,
    drag: DragTracker,
    saved: Vec<SavedRegion>,
    status: String,
    area: Option<AreaReading>,
    detector_ready: bool,
}

impl Session {
    pub fn new(config: MeasureConfig, layout: CanvasLayout) -> Self {
        Self {
            config,
            layout,
            image: None,
            image_bounds: Rect::default(),
            mode: Mode::None,
            calibrator: ScaleCalibrator::new(),
            region: Polygon::default(),
            drag: DragTracker::new(),
            saved: Vec::new(),
            status: STATUS_NO_IMAGE.to_string(),
            area: None,
            detector_ready: true,
        }
    }

    pub fn config(&self) -> &MeasureConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Latest status line
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Latest computed area, if any
    pub fn area(&self) -> Option<AreaReading> {
        self.area
    }

    pub fn area_text(&self) -> String {
        self.area
            .map(|a| a.to_string())
            .unwrap_or_else(|| AREA_PLACEHOLDER.to_string())
    }

    pub fn image(&self) -> Option<&RasterImage> {
        self.image.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Where the image is drawn on the canvas
    pub fn image_bounds(&self) -> Rect {
        self.image_bounds
    }

    pub fn layout(&self) -> &CanvasLayout {
        &self.layout
    }

    pub fn pixels_per_unit(&self) -> Option<PixelsPerUnit> {
        self.calibrator.pixels_per_unit()
    }

    pub fn scale_points(&self) -> &[Point2D] {
        self.calibrator.clicks()
    }

    /// Calibrated scale as shown to the user
    pub fn scale_summary(&self) -> String {
        match self.pixels_per_unit() {
            Some(ppu) => ppu.summary(self.config.unit),
            None => "Not set".to_string(),
        }
    }

    pub fn current_region(&self) -> &Polygon {
        &self.region
    }

    pub fn active_selection(&self) -> Option<Rect> {
        self.drag.current_rect()
    }

    pub fn saved_regions(&self) -> &[SavedRegion] {
        &self.saved
    }

    pub fn total_saved_area(&self) -> f64 {
        self.saved.iter().map(|r| r.area).sum()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.mode,
            status: self.status.clone(),
            scale: self.scale_summary(),
            area: self.area_text(),
            has_image: self.has_image(),
            image_bounds: self.image_bounds,
            scale_points: self.scale_points().to_vec(),
            region: self.region.clone(),
            saved: self.saved.clone(),
            total_saved_area: self.total_saved_area(),
        }
    }

    /// Mark whether the region detector runtime has finished initialising
    pub fn set_detector_ready(&mut self, ready: bool) {
        self.detector_ready = ready;
    }

    pub fn detector_ready(&self) -> bool {
        self.detector_ready
    }

    /// Change the calibration unit; only labels are affected
    pub fn set_unit(&mut self, unit: LengthUnit) {
        self.config.unit = unit;
    }

    /// Canvas was resized or moved on screen
    ///
    /// Everything stored in canvas space (calibration points and scale,
    /// the current region, saved rectangles) follows the image into its new
    /// fit rectangle. An in-progress drag is dropped.
    pub fn set_layout(&mut self, layout: CanvasLayout, renderer: &mut dyn Renderer) {
        let old_bounds = self.image_bounds;
        self.layout = layout;
        self.refit();
        if self.image.is_some() && old_bounds != self.image_bounds {
            self.rescale_from(old_bounds);
        }
        self.redraw(renderer);
    }

    /// Map a raw client-space pointer position to canvas space
    pub fn to_canvas_point(&self, client_x: f64, client_y: f64) -> Point2D {
        self.layout.to_canvas_point(client_x, client_y)
    }

    /// Replace the loaded image and start over
    pub fn load_image(&mut self, image: RasterImage, renderer: &mut dyn Renderer) {
        tracing::info!(
            width = image.width(),
            height = image.height(),
            "Image loaded"
        );
        self.image = Some(image);
        self.refit();
        self.reset(true, renderer);
        self.status = STATUS_IMAGE_LOADED.to_string();
    }

    /// Clear calibration, regions and mode; optionally drop the image
    pub fn reset(&mut self, keep_image: bool, renderer: &mut dyn Renderer) {
        self.calibrator.reset();
        self.region = Polygon::default();
        self.area = None;
        self.drag.cancel();
        self.saved.clear();
        self.mode = Mode::None;

        if !keep_image {
            self.image = None;
            self.image_bounds = Rect::default();
        }

        self.status = if keep_image && self.image.is_some() {
            STATUS_READY
        } else {
            STATUS_NO_IMAGE
        }
        .to_string();
        tracing::debug!(keep_image, "Session reset");
        self.redraw(renderer);
    }

    /// Clear the current region and its area; calibration and saved
    /// regions stay
    pub fn clear_current_result(&mut self, renderer: &mut dyn Renderer) {
        self.region = Polygon::default();
        self.area = None;
        self.drag.cancel();
        if self.mode == Mode::Dragging {
            self.mode = Mode::None;
        }
        self.status = STATUS_CLEARED.to_string();
        self.redraw(renderer);
    }

    /// Enter scale mode, discarding any previous calibration
    pub fn begin_calibration(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        if self.image.is_none() {
            return Err(self.report(MeasureError::NoImageLoaded));
        }
        self.drag.cancel();
        self.mode = Mode::Scale;
        self.calibrator.begin();
        self.status = STATUS_SCALE_MODE.to_string();
        self.redraw(renderer);
        Ok(())
    }

    /// Arm seeded detection; the next click inside the image picks the room
    pub fn begin_auto_detect(&mut self) -> Result<()> {
        if !self.detector_ready {
            return Err(self.report(MeasureError::DetectorNotReady));
        }
        if self.image.is_none() {
            return Err(self.report(MeasureError::NoImageLoaded));
        }
        if self.pixels_per_unit().is_none() {
            return Err(self.report(MeasureError::CalibrationRequired));
        }
        self.mode = Mode::AutoSeed;
        self.status = STATUS_AUTO_SEED.to_string();
        tracing::debug!("Auto-detect armed");
        Ok(())
    }

    /// Handle a click at a canvas-space point
    pub fn click(&mut self, point: Point2D, host: &mut Collaborators<'_>) -> Result<ClickOutcome> {
        if self.image.is_none() {
            return Ok(ClickOutcome::Ignored);
        }
        if !is_inside_image(point, &self.image_bounds) {
            return Err(self.report(MeasureError::InvalidClickLocation));
        }

        match self.mode {
            Mode::Scale => self.scale_click(point, host),
            Mode::AutoSeed => {
                self.mode = Mode::None;
                self.detect_at(point, host)
            }
            Mode::None | Mode::Dragging => Ok(ClickOutcome::Ignored),
        }
    }

    fn scale_click(&mut self, point: Point2D, host: &mut Collaborators<'_>) -> Result<ClickOutcome> {
        let prompt = &mut *host.prompt;
        let step = self
            .calibrator
            .register_click(point, &self.image_bounds, || prompt.real_distance());

        let outcome = match step {
            Ok(CalibrationStep::FirstPoint(p)) => {
                self.status = STATUS_SECOND_POINT.to_string();
                Ok(ClickOutcome::ScalePoint(p))
            }
            Ok(CalibrationStep::Calibrated {
                pixels_per_unit, ..
            }) => {
                self.mode = Mode::None;
                self.status = STATUS_SCALE_SET.to_string();
                Ok(ClickOutcome::Calibrated(pixels_per_unit))
            }
            Ok(CalibrationStep::Inactive) => Ok(ClickOutcome::Ignored),
            Err(err) => Err(self.report(err)),
        };
        self.redraw(host.renderer);
        outcome
    }

    fn detect_at(&mut self, seed: Point2D, host: &mut Collaborators<'_>) -> Result<ClickOutcome> {
        self.status = STATUS_DETECTING.to_string();
        self.redraw(host.renderer);

        let Some(image) = self.image.as_ref() else {
            return Err(self.report(MeasureError::NoImageLoaded));
        };
        let request = DetectionRequest {
            image,
            image_bounds: self.image_bounds,
            seed,
        };
        let scale = self.calibrator.pixels_per_unit();

        let polygon = match acquire_by_seed(host.detector, &request, scale) {
            Ok(polygon) => polygon,
            Err(err) => {
                if let MeasureError::DetectorFailure(reason) = &err {
                    tracing::warn!(%reason, "Region detector failed");
                }
                self.region = Polygon::default();
                self.area = None;
                let err = self.report(err);
                self.redraw(host.renderer);
                return Err(err);
            }
        };
        let Some(scale) = scale else {
            return Err(self.report(MeasureError::CalibrationRequired));
        };

        let pixel_area = polygon_area(&polygon.points);
        let area = AreaReading {
            value: pixel_area_to_real_area(pixel_area, scale),
            unit: self.config.unit,
        };
        tracing::info!(
            vertices = polygon.points.len(),
            pixel_area,
            area = area.value,
            unit = self.config.unit.label(),
            "Room measured"
        );

        self.region = polygon.clone();
        self.area = Some(area);
        self.status = STATUS_DETECTED.to_string();
        self.redraw(host.renderer);
        Ok(ClickOutcome::Measured { polygon, area })
    }

    /// Start a rectangle drag (rectangle workflow only)
    ///
    /// Returns `Ok(false)` when the press does not start a drag.
    pub fn pointer_down(&mut self, point: Point2D, renderer: &mut dyn Renderer) -> Result<bool> {
        if self.config.workflow != Workflow::Rectangle || self.mode != Mode::None {
            return Ok(false);
        }
        if self.image.is_none() {
            return Err(self.report(MeasureError::NoImageLoaded));
        }
        if !is_inside_image(point, &self.image_bounds) {
            return Err(self.report(MeasureError::InvalidClickLocation));
        }

        self.drag.begin(point);
        self.mode = Mode::Dragging;
        self.status = STATUS_DRAGGING.to_string();
        self.redraw(renderer);
        Ok(true)
    }

    /// Track the free corner of an in-progress drag
    pub fn pointer_move(&mut self, point: Point2D, renderer: &mut dyn Renderer) -> Option<Rect> {
        if self.mode != Mode::Dragging {
            return None;
        }
        let rect = self.drag.update(point);
        self.redraw(renderer);
        rect
    }

    /// Finish a drag: validate its size, prompt for real dimensions, save
    pub fn pointer_up(
        &mut self,
        point: Point2D,
        host: &mut Collaborators<'_>,
    ) -> Result<Option<SavedRegion>> {
        if self.mode != Mode::Dragging {
            return Ok(None);
        }
        self.mode = Mode::None;

        let result = self
            .drag
            .end(point, self.config.min_selection_size)
            .and_then(|rect| match rect {
                Some(rect) => commit_rectangle(rect, &mut *host.prompt).map(Some),
                None => Ok(None),
            });

        let outcome = match result {
            Ok(Some(saved)) => {
                tracing::info!(
                    real_width = saved.real_width,
                    real_height = saved.real_height,
                    area = saved.area,
                    "Selection saved"
                );
                self.saved.push(saved);
                self.area = Some(AreaReading {
                    value: saved.area,
                    unit: LengthUnit::Feet,
                });
                self.status = format!(
                    "Saved selection: {} ft x {} ft = {:.2} sq ft",
                    saved.real_width, saved.real_height, saved.area
                );
                Ok(Some(saved))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                tracing::warn!(error = %err, "Selection discarded");
                Err(self.report(err))
            }
        };
        self.redraw(host.renderer);
        outcome
    }

    /// Repaint everything from scratch
    pub fn redraw(&self, renderer: &mut dyn Renderer) {
        renderer.clear();
        if self.image.is_none() {
            return;
        }
        renderer.draw_image(&self.image_bounds);

        let points = self.calibrator.clicks();
        for p in points {
            renderer.draw_point(*p, DrawStyle::ScaleReference);
        }
        if let [a, b, ..] = points {
            renderer.draw_line(*a, *b, DrawStyle::ScaleReference);
        }

        if self.region.closed && self.region.points.len() >= 3 {
            renderer.draw_polygon(&self.region.points, DrawStyle::DetectedRegion);
        }

        for saved in &self.saved {
            renderer.draw_rectangle(&saved.rect, DrawStyle::SavedSelection);
        }
        if let Some(rect) = self.drag.current_rect() {
            renderer.draw_rectangle(&rect, DrawStyle::ActiveSelection);
        }
    }

    fn refit(&mut self) {
        self.image_bounds = match &self.image {
            Some(img) => self
                .layout
                .fit_image(img.width() as f64, img.height() as f64),
            None => Rect::default(),
        };
    }

    fn rescale_from(&mut self, old: Rect) {
        let new = self.image_bounds;
        if !(old.w > 0.0 && new.w > 0.0) {
            return;
        }
        // The fit keeps the aspect ratio, so one factor covers both axes
        let factor = new.w / old.w;
        let map = |p: Point2D| {
            Point2D::new(
                new.x + (p.x - old.x) * factor,
                new.y + (p.y - old.y) * factor,
            )
        };

        self.calibrator.rescale(map, factor);
        for p in &mut self.region.points {
            *p = map(*p);
        }
        for saved in &mut self.saved {
            let origin = map(Point2D::new(saved.rect.x, saved.rect.y));
            saved.rect = Rect::new(
                origin.x,
                origin.y,
                saved.rect.w * factor,
                saved.rect.h * factor,
            );
        }
        self.drag.cancel();
        if self.mode == Mode::Dragging {
            self.mode = Mode::None;
        }
        tracing::debug!(factor, "Canvas-space state rescaled to new layout");
    }

    /// Surface an error on the status line and hand it back
    fn report(&mut self, err: MeasureError) -> MeasureError {
        self.status = err.to_string();
        err
    }
}
