// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WebAssembly bindings for blueprint measurement

use crate::prompt::JsPrompt;
use crate::utils::{console_debug, console_warn};
use planscale_core::{
    CanvasLayout, ClickOutcome, Collaborators, CommandRecorder, LengthUnit, MeasureConfig,
    MeasureError, Point2D, RasterImage, Session,
};
use planscale_vision::{DetectorConfig, DetectorError, SeedDetector};
use thiserror::Error;
use wasm_bindgen::prelude::*;

/// Errors surfaced to JavaScript as `Error` objects
#[derive(Error, Debug)]
pub enum BindingError {
    #[error("Invalid config JSON: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Measure(#[from] MeasureError),

    #[error(transparent)]
    Detector(#[from] DetectorError),
}

/// Measurement session API
///
/// Coordinates passed to `click` and the pointer methods are canvas-space;
/// convert raw event positions with `toCanvasPoint` first. Drawing happens
/// on the JavaScript side by replaying `takeDrawCommands()`.
#[wasm_bindgen]
pub struct MeasureAPI {
    session: Session,
    detector: SeedDetector,
    recorder: CommandRecorder,
    prompt: JsPrompt,
}

#[wasm_bindgen]
impl MeasureAPI {
    /// Create a session for a canvas with the given backing size
    ///
    /// The built-in detector is usable once the module has initialised.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        let session = Session::new(
            MeasureConfig::default(),
            CanvasLayout::unscaled(canvas_width, canvas_height),
        );
        Self {
            session,
            detector: SeedDetector::default(),
            recorder: CommandRecorder::new(),
            prompt: JsPrompt::default(),
        }
    }

    /// Replace the session configuration from JSON
    ///
    /// Starts a fresh session; a loaded image is kept.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config_json: &str) -> Result<(), JsError> {
        let config = MeasureConfig::from_json(config_json)
            .map_err(|e| BindingError::InvalidConfig(e.to_string()))?;

        let layout = *self.session.layout();
        let ready = self.session.detector_ready();
        let image = self.session.image().cloned();

        let mut session = Session::new(config, layout);
        session.set_detector_ready(ready);
        if let Some(image) = image {
            session.load_image(image, &mut self.recorder);
        }
        self.session = session;
        Ok(())
    }

    /// Get current session configuration as JSON
    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> String {
        self.session.config().to_json()
    }

    /// Set region detector configuration from JSON
    #[wasm_bindgen(js_name = setDetectorConfig)]
    pub fn set_detector_config(&mut self, config_json: &str) -> Result<(), JsError> {
        let config = DetectorConfig::from_json(config_json)?;
        self.detector.set_config(config)?;
        Ok(())
    }

    /// Get current region detector configuration as JSON
    #[wasm_bindgen(js_name = getDetectorConfig)]
    pub fn get_detector_config(&self) -> String {
        serde_json::to_string(self.detector.config()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Install prompt callbacks
    ///
    /// `options` may carry `realDistance(message)`, `realWidth(message, rect)`
    /// and `realHeight(message, rect)`; each returns the typed answer or
    /// `null` when the user cancels.
    #[wasm_bindgen(js_name = setPrompts)]
    pub fn set_prompts(&mut self, options: JsValue) {
        self.prompt = JsPrompt::from_options(&options);
    }

    /// Change the unit calibration distances are entered in ("m", "ft", "in")
    #[wasm_bindgen(js_name = setUnit)]
    pub fn set_unit(&mut self, unit: &str) -> Result<(), JsError> {
        let unit: LengthUnit = unit.parse().map_err(BindingError::from)?;
        self.session.set_unit(unit);
        Ok(())
    }

    /// Update the canvas backing size and its on-screen box
    #[wasm_bindgen(js_name = setLayout)]
    pub fn set_layout(
        &mut self,
        width: f64,
        height: f64,
        client_left: f64,
        client_top: f64,
        client_width: f64,
        client_height: f64,
    ) {
        let layout = CanvasLayout {
            width,
            height,
            client_left,
            client_top,
            client_width,
            client_height,
        };
        self.session.set_layout(layout, &mut self.recorder);
    }

    /// Load a decoded image (RGBA, 4 bytes per pixel)
    #[wasm_bindgen(js_name = loadImage)]
    pub fn load_image(&mut self, rgba_data: &[u8], width: u32, height: u32) -> Result<(), JsError> {
        let image = RasterImage::new(width, height, rgba_data.to_vec()).map_err(BindingError::from)?;
        self.session.load_image(image, &mut self.recorder);
        Ok(())
    }

    /// Gate auto-detect on an external readiness signal
    ///
    /// Sessions start ready; pass `false` only while some detector the page
    /// depends on is still loading.
    #[wasm_bindgen(js_name = setDetectorReady)]
    pub fn set_detector_ready(&mut self, ready: bool) {
        self.session.set_detector_ready(ready);
    }

    /// Map a raw pointer position (clientX/clientY) to canvas space
    #[wasm_bindgen(js_name = toCanvasPoint)]
    pub fn to_canvas_point(&self, client_x: f64, client_y: f64) -> Result<JsValue, JsError> {
        let point = self.session.to_canvas_point(client_x, client_y);
        serde_wasm_bindgen::to_value(&point)
            .map_err(|e| BindingError::Serialization(e.to_string()).into())
    }

    /// Enter scale mode (2 clicks plus a real distance)
    #[wasm_bindgen(js_name = beginCalibration)]
    pub fn begin_calibration(&mut self) -> Result<(), JsError> {
        self.session
            .begin_calibration(&mut self.recorder)
            .map_err(Self::fail)
    }

    /// Arm seeded detection for the next click
    #[wasm_bindgen(js_name = beginAutoDetect)]
    pub fn begin_auto_detect(&mut self) -> Result<(), JsError> {
        self.session.begin_auto_detect().map_err(Self::fail)
    }

    /// Handle a click at a canvas-space point
    ///
    /// Returns the kind of result: "ignored", "scalePoint", "calibrated" or
    /// "measured".
    #[wasm_bindgen]
    pub fn click(&mut self, x: f64, y: f64) -> Result<String, JsError> {
        let mut host = Collaborators {
            renderer: &mut self.recorder,
            detector: &mut self.detector,
            prompt: &mut self.prompt,
        };
        let outcome = self
            .session
            .click(Point2D::new(x, y), &mut host)
            .map_err(Self::fail)?;

        let kind = match outcome {
            ClickOutcome::Ignored => "ignored",
            ClickOutcome::ScalePoint(_) => "scalePoint",
            ClickOutcome::Calibrated(ppu) => {
                console_debug(&format!("Scale set: {}", ppu.summary(self.session.config().unit)));
                "calibrated"
            }
            ClickOutcome::Measured { .. } => "measured",
        };
        Ok(kind.to_string())
    }

    /// Start a rectangle drag; false when the press does not start one
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Result<bool, JsError> {
        self.session
            .pointer_down(Point2D::new(x, y), &mut self.recorder)
            .map_err(Self::fail)
    }

    /// Track the pointer during a drag; false when no drag is active
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.session
            .pointer_move(Point2D::new(x, y), &mut self.recorder)
            .is_some()
    }

    /// Finish a drag; true when a selection was saved
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Result<bool, JsError> {
        let mut host = Collaborators {
            renderer: &mut self.recorder,
            detector: &mut self.detector,
            prompt: &mut self.prompt,
        };
        let saved = self
            .session
            .pointer_up(Point2D::new(x, y), &mut host)
            .map_err(Self::fail)?;
        Ok(saved.is_some())
    }

    /// Clear the current detected region and area
    #[wasm_bindgen]
    pub fn clear(&mut self) {
        self.session.clear_current_result(&mut self.recorder);
    }

    /// Clear all measurements; optionally drop the image too
    #[wasm_bindgen]
    pub fn reset(&mut self, keep_image: bool) {
        self.session.reset(keep_image, &mut self.recorder);
    }

    /// Repaint everything
    #[wasm_bindgen]
    pub fn redraw(&mut self) {
        self.session.redraw(&mut self.recorder);
    }

    /// Current status line
    #[wasm_bindgen]
    pub fn status(&self) -> String {
        self.session.status().to_string()
    }

    /// Current area display text
    #[wasm_bindgen(js_name = areaText)]
    pub fn area_text(&self) -> String {
        self.session.area_text()
    }

    /// Current scale display text
    #[wasm_bindgen(js_name = scaleSummary)]
    pub fn scale_summary(&self) -> String {
        self.session.scale_summary()
    }

    /// Sum of saved rectangle areas (square feet)
    #[wasm_bindgen(js_name = totalSavedArea)]
    pub fn total_saved_area(&self) -> f64 {
        self.session.total_saved_area()
    }

    /// Drain recorded draw commands as a JSON array
    #[wasm_bindgen(js_name = takeDrawCommands)]
    pub fn take_draw_commands(&mut self) -> Result<String, JsError> {
        let commands = self.recorder.take();
        serde_json::to_string(&commands)
            .map_err(|e| BindingError::Serialization(e.to_string()).into())
    }

    /// Full session state as JSON
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.session.snapshot())
            .map_err(|e| BindingError::Serialization(e.to_string()).into())
    }
}

impl MeasureAPI {
    /// The session has already written the message to its status line
    fn fail(err: MeasureError) -> JsError {
        if let MeasureError::DetectorFailure(reason) = &err {
            console_warn(&format!("[PlanScale] Region detection failed: {}", reason));
        }
        BindingError::from(err).into()
    }
}
