// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinate mapping between pointer input, canvas space and the
//! letterboxed image.

use crate::types::{Point2D, Rect};
use serde::{Deserialize, Serialize};

/// Canvas backing resolution and its displayed (client) box
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CanvasLayout {
    /// Backing store width in canvas pixels
    pub width: f64,
    /// Backing store height in canvas pixels
    pub height: f64,
    /// Displayed box left edge in client coordinates
    pub client_left: f64,
    /// Displayed box top edge in client coordinates
    pub client_top: f64,
    /// Displayed box width in client coordinates
    pub client_width: f64,
    /// Displayed box height in client coordinates
    pub client_height: f64,
}

impl CanvasLayout {
    /// Layout where the canvas is displayed at its backing size at the origin
    pub fn unscaled(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            client_left: 0.0,
            client_top: 0.0,
            client_width: width,
            client_height: height,
        }
    }

    /// Convert a raw client-space pointer position into canvas space
    ///
    /// Scales by the ratio of backing resolution to displayed size so the
    /// result does not depend on CSS scaling.
    pub fn to_canvas_point(&self, client_x: f64, client_y: f64) -> Point2D {
        let sx = if self.client_width > 0.0 {
            self.width / self.client_width
        } else {
            1.0
        };
        let sy = if self.client_height > 0.0 {
            self.height / self.client_height
        } else {
            1.0
        };
        Point2D::new(
            (client_x - self.client_left) * sx,
            (client_y - self.client_top) * sy,
        )
    }

    /// Fit rectangle of an image of the given size in this canvas
    pub fn fit_image(&self, image_width: f64, image_height: f64) -> Rect {
        fit_rect(image_width, image_height, self.width, self.height)
    }
}

/// Largest centered rectangle with the image's aspect ratio inside a box
pub fn fit_rect(image_width: f64, image_height: f64, box_width: f64, box_height: f64) -> Rect {
    if image_width <= 0.0 || image_height <= 0.0 || box_width <= 0.0 || box_height <= 0.0 {
        return Rect::default();
    }

    let image_ratio = image_width / image_height;
    let box_ratio = box_width / box_height;

    let (w, h) = if image_ratio > box_ratio {
        (box_width, box_width / image_ratio)
    } else {
        (box_height * image_ratio, box_height)
    };

    Rect::new((box_width - w) / 2.0, (box_height - h) / 2.0, w, h)
}

/// True iff the point lies within the displayed image bounds
pub fn is_inside_image(point: Point2D, image_bounds: &Rect) -> bool {
    image_bounds.contains(point)
}
