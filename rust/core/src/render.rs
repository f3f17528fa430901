// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Renderer seam and a draw-command recorder

use crate::types::{Point2D, Rect};
use serde::{Deserialize, Serialize};

/// Visual role of an overlay shape
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DrawStyle {
    /// Calibration reference points and the line between them
    ScaleReference,
    /// Polygon returned by the region detector
    DetectedRegion,
    /// Rectangle currently being dragged
    ActiveSelection,
    /// Rectangle already committed with real dimensions
    SavedSelection,
}

/// Drawing surface the session repaints after each visible change
///
/// Nothing is assumed to persist between repaints: every repaint starts
/// with `clear`.
pub trait Renderer {
    fn clear(&mut self);
    fn draw_image(&mut self, bounds: &Rect);
    fn draw_point(&mut self, point: Point2D, style: DrawStyle);
    fn draw_line(&mut self, from: Point2D, to: Point2D, style: DrawStyle);
    fn draw_polygon(&mut self, points: &[Point2D], style: DrawStyle);
    fn draw_rectangle(&mut self, rect: &Rect, style: DrawStyle);
}

/// A single recorded draw call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawCommand {
    Clear,
    Image { bounds: Rect },
    Point { point: Point2D, style: DrawStyle },
    Line { from: Point2D, to: Point2D, style: DrawStyle },
    Polygon { points: Vec<Point2D>, style: DrawStyle },
    Rectangle { rect: Rect, style: DrawStyle },
}

/// Renderer that records draw calls for a host to replay
#[derive(Debug, Clone, Default)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Hand over everything recorded since the last call
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Renderer for CommandRecorder {
    fn clear(&mut self) {
        // Earlier frames are obsolete once the surface is cleared
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn draw_image(&mut self, bounds: &Rect) {
        self.commands.push(DrawCommand::Image { bounds: *bounds });
    }

    fn draw_point(&mut self, point: Point2D, style: DrawStyle) {
        self.commands.push(DrawCommand::Point { point, style });
    }

    fn draw_line(&mut self, from: Point2D, to: Point2D, style: DrawStyle) {
        self.commands.push(DrawCommand::Line { from, to, style });
    }

    fn draw_polygon(&mut self, points: &[Point2D], style: DrawStyle) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            style,
        });
    }

    fn draw_rectangle(&mut self, rect: &Rect, style: DrawStyle) {
        self.commands.push(DrawCommand::Rectangle { rect: *rect, style });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_starts_new_frame() {
        let mut recorder = CommandRecorder::new();
        recorder.clear();
        recorder.draw_point(Point2D::new(1.0, 2.0), DrawStyle::ScaleReference);
        recorder.clear();
        recorder.draw_image(&Rect::new(0.0, 0.0, 10.0, 10.0));

        assert_eq!(
            recorder.commands(),
            &[
                DrawCommand::Clear,
                DrawCommand::Image {
                    bounds: Rect::new(0.0, 0.0, 10.0, 10.0)
                }
            ]
        );
        assert_eq!(recorder.take().len(), 2);
        assert!(recorder.commands().is_empty());
    }

    #[test]
    fn test_command_json_shape() {
        let cmd = DrawCommand::Line {
            from: Point2D::new(0.0, 0.0),
            to: Point2D::new(3.0, 4.0),
            style: DrawStyle::ScaleReference,
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["op"], "line");
        assert_eq!(json["style"], "scaleReference");
        assert_eq!(json["to"]["x"], 3.0);
    }
}
