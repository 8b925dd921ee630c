//! Raster pixel buffer and freehand segment rasterization.

use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black, the value of untouched pixels.
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        match hex.len() {
            3 => Some(Self::opaque(
                channel(0..1)? * 17,
                channel(1..2)? * 17,
                channel(2..3)? * 17,
            )),
            6 => Some(Self::opaque(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

impl From<Color> for Rgba {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<Rgba> for Color {
    fn from(color: Rgba) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// How a stroke segment affects the pixels it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    /// Composite the color over existing pixels (source-over).
    Color(Rgba),
    /// Remove existing pixels proportionally to coverage (destination-out).
    Erase,
}

/// A row-major straight-alpha RGBA8 pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl PixelBuffer {
    /// Create a buffer with every pixel transparent.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Create a buffer filled with `color`.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let mut buffer = Self::new(width, height);
        buffer.fill(color);
        buffer
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Color at `(x, y)`, or `None` outside the buffer.
    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some(Rgba::from_bytes(&self.data[i..i + 4]))
    }

    fn set(&mut self, x: u32, y: u32, color: Rgba) {
        let i = self.offset(x, y);
        self.data[i..i + 4].copy_from_slice(&color.to_bytes());
    }

    /// Overwrite every pixel with `color`.
    pub fn fill(&mut self, color: Rgba) {
        let bytes = color.to_bytes();
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
    }

    /// True if every byte is zero (nothing was ever painted).
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    /// True if every pixel equals `color`.
    pub fn is_uniform(&self, color: Rgba) -> bool {
        let bytes = color.to_bytes();
        self.data.chunks_exact(4).all(|px| px == bytes)
    }

    /// Copy `source` onto this buffer at the origin, clipped to this buffer.
    ///
    /// Pixels are overwritten, not composited.
    pub fn blit(&mut self, source: &PixelBuffer) {
        let cols = self.width.min(source.width) as usize;
        let rows = self.height.min(source.height);
        for y in 0..rows {
            let dst = self.offset(0, y);
            let src = source.offset(0, y);
            self.data[dst..dst + cols * 4].copy_from_slice(&source.data[src..src + cols * 4]);
        }
    }

    /// Replace every pixel equal to `from` with `to`. Returns the number replaced.
    pub fn replace_color(&mut self, from: Rgba, to: Rgba) -> usize {
        self.remap_colors(&[(from, to)])
    }

    /// Apply several `(from, to)` replacements in a single pass.
    ///
    /// Each pixel is matched against the original colors only, so two
    /// colors can be swapped. The first matching pair wins. Returns the
    /// number of pixels replaced.
    pub fn remap_colors(&mut self, mapping: &[(Rgba, Rgba)]) -> usize {
        let mapping: Vec<([u8; 4], [u8; 4])> = mapping
            .iter()
            .map(|(from, to)| (from.to_bytes(), to.to_bytes()))
            .collect();
        let mut replaced = 0;
        for px in self.data.chunks_exact_mut(4) {
            if let Some((_, to)) = mapping.iter().find(|(from, _)| *px == *from) {
                px.copy_from_slice(to);
                replaced += 1;
            }
        }
        replaced
    }

    /// Rasterize a round-capped segment from `a` to `b`.
    ///
    /// Coverage is computed from the distance of each pixel center to the
    /// segment with a one pixel anti-aliased edge. Returns the touched
    /// region, or `None` if the segment lies entirely outside the buffer.
    pub fn stroke_segment(&mut self, a: Point, b: Point, width: f64, paint: Paint) -> Option<Rect> {
        let radius = (width / 2.0).max(0.5);
        let reach = radius + 1.0;
        let bounds = Rect::from_points(a, b).inflate(reach, reach);

        let x0 = bounds.x0.floor().max(0.0);
        let y0 = bounds.y0.floor().max(0.0);
        let x1 = bounds.x1.ceil().min(self.width as f64);
        let y1 = bounds.y1.ceil().min(self.height as f64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }

        for y in y0 as u32..y1 as u32 {
            for x in x0 as u32..x1 as u32 {
                let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let coverage = (radius + 0.5 - distance_to_segment(center, a, b)).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let dst = self.get(x, y).unwrap_or(Rgba::TRANSPARENT);
                let out = match paint {
                    Paint::Color(src) => source_over(src, dst, coverage),
                    Paint::Erase => destination_out(dst, coverage),
                };
                self.set(x, y, out);
            }
        }

        Some(Rect::new(x0, y0, x1, y1))
    }

    /// Flatten onto an opaque background, returning packed RGB bytes.
    pub fn composite_over(&self, background: Rgba) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for px in self.data.chunks_exact(4) {
            let alpha = px[3] as f64 / 255.0;
            let mix =
                |src: u8, bg: u8| (src as f64 * alpha + bg as f64 * (1.0 - alpha)).round() as u8;
            rgb.push(mix(px[0], background.r));
            rgb.push(mix(px[1], background.g));
            rgb.push(mix(px[2], background.b));
        }
        rgb
    }
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq <= f64::EPSILON {
        return (p - a).hypot();
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).hypot()
}

fn source_over(src: Rgba, dst: Rgba, coverage: f64) -> Rgba {
    let sa = src.a as f64 / 255.0 * coverage;
    let da = dst.a as f64 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba::TRANSPARENT;
    }
    let channel = |s: u8, d: u8| {
        ((s as f64 * sa + d as f64 * da * (1.0 - sa)) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    Rgba::new(
        channel(src.r, dst.r),
        channel(src.g, dst.g),
        channel(src.b, dst.b),
        (out_a * 255.0).round() as u8,
    )
}

fn destination_out(dst: Rgba, coverage: f64) -> Rgba {
    let alpha = (dst.a as f64 * (1.0 - coverage)).round() as u8;
    if alpha == 0 {
        Rgba::TRANSPARENT
    } else {
        Rgba { a: alpha, ..dst }
    }
}
