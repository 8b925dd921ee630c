//! Placement of recognition results on the canvas.

use crate::results::RecognitionResult;
use kurbo::{Point, Size};

/// Distance kept between a result and the canvas edges.
pub const EDGE_PADDING: f64 = 20.0;
/// Horizontal gap between the anchor and its result.
pub const ANCHOR_GAP: f64 = 20.0;
/// Left edge of the column used for results without an anchor, from the right border.
pub const FALLBACK_COLUMN_INSET: f64 = 300.0;
/// Top of the fallback column.
pub const FALLBACK_TOP: f64 = 50.0;
/// Vertical spacing between stacked fallback results.
pub const FALLBACK_ROW_HEIGHT: f64 = 60.0;

/// Average glyph advance assumed by [`estimate_label_width`].
const GLYPH_WIDTH: f64 = 14.0;
/// Extra room reserved around the rendered label.
const LABEL_MARGIN: f64 = 100.0;

/// Rough rendered width of a result label.
pub fn estimate_label_width(result: &RecognitionResult) -> f64 {
    result.label().chars().count() as f64 * GLYPH_WIDTH + LABEL_MARGIN
}

/// Compute where each result should be drawn, in canvas coordinates.
///
/// Anchored results sit to the right of their anchor and are pushed left
/// when they would overflow the right edge; the vertical position is
/// clamped inside the padded canvas. Unanchored results are stacked in a
/// column near the top right corner.
pub fn place_results<F>(results: &[RecognitionResult], canvas: Size, measure: F) -> Vec<Point>
where
    F: Fn(&RecognitionResult) -> f64,
{
    results
        .iter()
        .enumerate()
        .map(|(index, result)| match result.anchor {
            Some(anchor) => {
                let width = measure(result);
                let mut x = anchor.x + ANCHOR_GAP;
                if x + width > canvas.width - EDGE_PADDING {
                    x = canvas.width - width - EDGE_PADDING;
                }
                let y = anchor
                    .y
                    .min(canvas.height - EDGE_PADDING)
                    .max(EDGE_PADDING);
                Point::new(x, y)
            }
            None => Point::new(
                canvas.width - FALLBACK_COLUMN_INSET,
                FALLBACK_TOP + index as f64 * FALLBACK_ROW_HEIGHT,
            ),
        })
        .collect()
}
