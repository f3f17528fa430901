// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # PlanScale Core
//!
//! Scale calibration and area measurement for floor plan images.
//!
//! The pipeline turns pointer input into calibrated real-world area:
//!
//! - **Coordinate mapping**: client coordinates to canvas space, and the
//!   letterboxed rectangle the image is drawn in ([`mapper`])
//! - **Scale calibration**: two clicks and a known distance give a
//!   pixels-per-unit ratio ([`calibration`])
//! - **Region acquisition**: seed a region detector, or drag a rectangle
//!   and type in its real size ([`region`])
//! - **Area**: shoelace polygon area and pixel-to-real conversion ([`area`])
//! - **Session**: owns all of the above and defines reset/clear ([`session`])
//!
//! Image decoding, drawing and region detection are collaborators behind
//! the [`Renderer`], [`RegionDetector`] and [`MeasurementPrompt`] traits.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use planscale_core::{CanvasLayout, Collaborators, MeasureConfig, Session};
//!
//! let mut session = Session::new(MeasureConfig::default(), CanvasLayout::unscaled(1200.0, 800.0));
//! session.load_image(raster, &mut renderer);
//! session.begin_calibration(&mut renderer)?;
//!
//! let mut host = Collaborators { renderer: &mut renderer, detector: &mut detector, prompt: &mut prompt };
//! session.click(p0, &mut host)?;
//! session.click(p1, &mut host)?; // reads the real distance from the prompt
//!
//! session.begin_auto_detect()?;
//! session.click(seed, &mut host)?;
//! println!("{}", session.area_text());
//! ```

pub mod area;
pub mod calibration;
pub mod config;
pub mod error;
pub mod mapper;
pub mod region;
pub mod render;
pub mod session;
pub mod types;

pub use area::{pixel_area_to_real_area, polygon_area, rectangle_real_area};
pub use calibration::{CalibrationState, CalibrationStep, PixelsPerUnit, ScaleCalibrator};
pub use config::{MeasureConfig, Workflow};
pub use error::{parse_positive, MeasureError, Result};
pub use mapper::{fit_rect, is_inside_image, CanvasLayout};
pub use region::{
    acquire_by_seed, commit_rectangle, DetectionError, DetectionRequest, DragTracker,
    MeasurementPrompt, RegionDetector, StaticPrompt, MIN_SELECTION_SIZE,
};
pub use render::{CommandRecorder, DrawCommand, DrawStyle, Renderer};
pub use session::{ClickOutcome, Collaborators, Mode, Session, SessionSnapshot};
pub use types::{AreaReading, LengthUnit, Point2D, Polygon, RasterImage, Rect, SavedRegion};
