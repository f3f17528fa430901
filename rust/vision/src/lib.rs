// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room outline detection for floor plan images
//!
//! This crate provides the classical computer vision pipeline behind
//! click-to-measure:
//! 1. Grayscale conversion at the displayed size
//! 2. Gaussian blur, Canny edges and a morphological close
//! 3. Outer contour tracing
//! 4. Selection of the largest contour enclosing the seed, simplified
//!    with Douglas-Peucker
//!
//! # Usage
//!
//! ```rust,ignore
//! use planscale_core::{DetectionRequest, RegionDetector};
//! use planscale_vision::{DetectorConfig, SeedDetector};
//!
//! let mut detector = SeedDetector::new(DetectorConfig::default())?;
//! let polygon = detector.detect(&DetectionRequest {
//!     image: &raster,
//!     image_bounds: session.image_bounds(),
//!     seed,
//! })?;
//! ```

pub mod config;
pub mod error;
pub mod image_ops;
pub mod room_detector;

pub use config::DetectorConfig;
pub use error::{DetectorError, Result};
pub use image_ops::rgba_to_grayscale;
pub use room_detector::{
    outer_contours, point_in_polygon, select_enclosing_contour, simplify_closed, SeedDetector,
};
