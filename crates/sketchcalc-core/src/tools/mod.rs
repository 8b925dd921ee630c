//! Pen tool settings for freehand drawing.

use crate::raster::{Paint, Rgba};
use serde::{Deserialize, Serialize};

/// Thinnest allowed pen.
pub const MIN_PEN_WIDTH: f64 = 1.0;
/// Thickest allowed pen.
pub const MAX_PEN_WIDTH: f64 = 20.0;
/// Pen width of a fresh canvas.
pub const DEFAULT_PEN_WIDTH: f64 = 3.0;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    /// Paint with the pen color.
    #[default]
    Pen,
    /// Remove pixels under the stroke.
    Eraser,
}

/// Current pen configuration applied to new strokes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pen {
    /// Active tool.
    pub tool: ToolKind,
    /// Stroke color used by [`ToolKind::Pen`].
    pub color: Rgba,
    width: f64,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            tool: ToolKind::Pen,
            color: Rgba::WHITE,
            width: DEFAULT_PEN_WIDTH,
        }
    }
}

impl Pen {
    /// Create a pen with the given color and default width.
    pub fn new(color: Rgba) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// Stroke width in pixels.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Set the stroke width, clamped to the supported range.
    pub fn set_width(&mut self, width: f64) {
        self.width = if width.is_finite() {
            width.clamp(MIN_PEN_WIDTH, MAX_PEN_WIDTH)
        } else {
            DEFAULT_PEN_WIDTH
        };
    }

    /// Pick a color; this also switches back from the eraser.
    pub fn set_color(&mut self, color: Rgba) {
        self.color = color;
        self.tool = ToolKind::Pen;
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool = tool;
    }

    pub fn is_eraser(&self) -> bool {
        self.tool == ToolKind::Eraser
    }

    /// How strokes drawn with this pen affect pixels.
    pub fn paint(&self) -> Paint {
        match self.tool {
            ToolKind::Pen => Paint::Color(self.color),
            ToolKind::Eraser => Paint::Erase,
        }
    }
}
