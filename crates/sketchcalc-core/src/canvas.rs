//! Drawing surface, stroke capture and undo/redo history.

use crate::camera::Camera;
use crate::history::History;
use crate::raster::{PixelBuffer, Rgba};
use crate::results::RecognitionResult;
use crate::theme::CanvasColors;
use crate::tools::{DEFAULT_PEN_WIDTH, Pen};
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Canvas construction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Initial pen width.
    pub pen_width: f64,
    /// Maximum number of undo states to keep (`None` = unbounded).
    pub history_limit: Option<usize>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            pen_width: DEFAULT_PEN_WIDTH,
            history_limit: None,
        }
    }
}

/// Horizontal extent of one pen-down-to-pen-up gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquationSpan {
    /// Where the gesture started.
    pub start: Point,
    /// Rightmost x of start and last point, at the last point's height.
    pub end: Point,
    /// The final pointer sample.
    pub last_drawn: Point,
}

impl EquationSpan {
    fn close(start: Point, last_drawn: Point) -> Self {
        Self {
            start,
            end: Point::new(last_drawn.x.max(start.x), last_drawn.y),
            last_drawn,
        }
    }
}

/// A full copy of the raster plus the pan offset at capture time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pixels: PixelBuffer,
    pan: Vec2,
}

impl Snapshot {
    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }
}

/// The canvas stroke and history manager.
///
/// Owns the live pixel buffer and both history stacks; nothing else
/// mutates the pixels. Every operation is infallible: calls that make no
/// sense in the current state are ignored.
#[derive(Debug, Clone)]
pub struct SketchCanvas {
    pixels: PixelBuffer,
    colors: CanvasColors,
    camera: Camera,
    pen: Pen,
    history: History<Snapshot>,
    /// Whether a stroke is open (between `begin_stroke` and `end_stroke`).
    drawing: bool,
    /// Most recent pen position.
    last_point: Option<Point>,
    /// Start of the currently open equation span.
    span_start: Option<Point>,
    spans: Vec<EquationSpan>,
    results: Vec<RecognitionResult>,
}

impl Default for SketchCanvas {
    fn default() -> Self {
        Self::new(&CanvasConfig::default(), CanvasColors::default())
    }
}

impl SketchCanvas {
    /// Create a canvas filled with the background color.
    pub fn new(config: &CanvasConfig, colors: CanvasColors) -> Self {
        let mut pen = Pen::new(colors.foreground);
        pen.set_width(config.pen_width);
        Self {
            pixels: PixelBuffer::filled(config.width, config.height, colors.background),
            colors,
            camera: Camera::new(),
            pen,
            history: History::with_limit(config.history_limit),
            drawing: false,
            last_point: None,
            span_start: None,
            spans: Vec::new(),
            results: Vec::new(),
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            pixels: self.pixels.clone(),
            pan: self.camera.offset,
        }
    }

    /// Start a stroke at `point` (canvas coordinates).
    pub fn begin_stroke(&mut self, point: Point) {
        self.last_point = Some(point);
        self.drawing = true;
        if self.span_start.is_none() {
            self.span_start = Some(point);
        }
    }

    /// Draw a segment from the last pen position to `point`.
    ///
    /// Ignored when no stroke is open.
    pub fn extend_stroke(&mut self, point: Point) {
        if !self.drawing {
            return;
        }
        let Some(last) = self.last_point else { return };
        self.pixels
            .stroke_segment(last, point, self.pen.width(), self.pen.paint());
        self.last_point = Some(point);
    }

    /// Close the open stroke, record its span and commit a history entry.
    ///
    /// Ignored when no stroke is open.
    pub fn end_stroke(&mut self) {
        if !self.drawing {
            return;
        }
        self.drawing = false;

        if let (Some(start), Some(last)) = (self.span_start.take(), self.last_point) {
            let span = EquationSpan::close(start, last);
            log::debug!(
                "Stroke closed: ({:.0}, {:.0}) -> ({:.0}, {:.0})",
                span.start.x,
                span.start.y,
                span.end.x,
                span.end.y
            );
            self.spans.push(span);
        }

        let snapshot = self.snapshot();
        self.history.commit(snapshot);
    }

    /// Undo the last committed stroke.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        if !self.history.can_undo() {
            return false;
        }

        // Save current state to redo stack
        let current = self.snapshot();
        self.history.push_redo(current);
        self.history.pop_undo();

        match self.history.peek_undo() {
            Some(previous) => {
                apply_snapshot(&mut self.pixels, &mut self.camera, self.colors, previous)
            }
            None => {
                self.pixels.fill(self.colors.background);
                self.camera.reset();
            }
        }
        true
    }

    /// Redo the last undone stroke.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        if !self.history.can_redo() {
            return false;
        }

        // Save current state to undo stack
        let current = self.snapshot();
        self.history.push_undo(current);

        if let Some(next) = self.history.pop_redo() {
            apply_snapshot(&mut self.pixels, &mut self.camera, self.colors, &next);
        }
        true
    }

    /// Clear everything: history, pixels, pan, spans and results.
    pub fn reset(&mut self) {
        self.history.clear();
        self.pixels.fill(self.colors.background);
        self.camera.reset();
        self.drawing = false;
        self.last_point = None;
        self.span_start = None;
        self.spans.clear();
        self.results.clear();
        log::debug!("Canvas reset");
    }

    /// True once at least one stroke has been completed since the last reset.
    pub fn has_content(&self) -> bool {
        !self.spans.is_empty()
    }

    /// Switch theme colors.
    ///
    /// Pixels showing the previous background or default ink are repainted
    /// with the new ones in a single pass, so ink stays visible when the two
    /// swap. A pen still using the default ink follows the theme. History
    /// entries are left as they are.
    pub fn set_colors(&mut self, colors: CanvasColors) {
        let previous = self.colors;
        let mapping: Vec<(Rgba, Rgba)> = [
            (previous.background, colors.background),
            (previous.foreground, colors.foreground),
        ]
        .into_iter()
        .filter(|(from, to)| from != to)
        .collect();
        if !mapping.is_empty() {
            self.pixels.remap_colors(&mapping);
        }
        if self.pen.color == previous.foreground {
            self.pen.color = colors.foreground;
        }
        self.colors = colors;
    }

    /// Resize the surface, keeping existing content anchored at the origin.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.pixels.width() && height == self.pixels.height() {
            return;
        }
        let previous = std::mem::replace(
            &mut self.pixels,
            PixelBuffer::filled(width, height, self.colors.background),
        );
        if !previous.is_blank() {
            self.pixels.blit(&previous);
        }
        log::debug!("Canvas resized to {}x{}", width, height);
    }

    /// Drag the surface by `delta` screen pixels.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.camera.pan(delta);
    }

    pub fn pan(&self) -> Vec2 {
        self.camera.offset
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_len(&self) -> usize {
        self.history.undo_len()
    }

    pub fn redo_len(&self) -> usize {
        self.history.redo_len()
    }

    pub fn spans(&self) -> &[EquationSpan] {
        &self.spans
    }

    /// Most recent pen position, used to anchor results.
    pub fn last_point(&self) -> Option<Point> {
        self.last_point
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn size(&self) -> Size {
        Size::new(self.pixels.width() as f64, self.pixels.height() as f64)
    }

    pub fn colors(&self) -> CanvasColors {
        self.colors
    }

    pub fn pen(&self) -> &Pen {
        &self.pen
    }

    pub fn pen_mut(&mut self) -> &mut Pen {
        &mut self.pen
    }

    /// Opaque RGB rendition of the surface over the current background.
    pub fn flatten_rgb(&self) -> Vec<u8> {
        self.pixels.composite_over(self.colors.background)
    }

    pub fn results(&self) -> &[RecognitionResult] {
        &self.results
    }

    pub fn set_results(&mut self, results: Vec<RecognitionResult>) {
        self.results = results;
    }

    pub fn clear_results(&mut self) {
        self.results.clear();
    }
}

/// Repaint from a snapshot: fill with the current background, then
/// overwrite with the snapshot pixels and restore its pan.
fn apply_snapshot(
    pixels: &mut PixelBuffer,
    camera: &mut Camera,
    colors: CanvasColors,
    snapshot: &Snapshot,
) {
    pixels.fill(colors.background);
    pixels.blit(&snapshot.pixels);
    camera.offset = snapshot.pan;
}
