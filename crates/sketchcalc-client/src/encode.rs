//! Canvas snapshot encoding for submission.

use base64::{Engine, engine::general_purpose::STANDARD};
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use sketchcalc_core::canvas::SketchCanvas;
use thiserror::Error;

/// Prefix of every encoded image.
pub const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Encoding errors.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Cannot encode an empty {0}x{1} image")]
    Empty(u32, u32),
    #[error("Pixel data does not match {width}x{height}")]
    BufferSize { width: u32, height: u32 },
    #[error("JPEG encoding failed: {0}")]
    Jpeg(#[from] image::ImageError),
}

/// Size the image is scaled to so neither side exceeds `max_dimension`.
///
/// Aspect ratio is kept; images already small enough are left alone. A
/// limit of zero is treated as one.
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let max_dimension = max_dimension.max(1);
    if width <= max_dimension && height <= max_dimension {
        return (width, height);
    }
    let ratio = (max_dimension as f64 / width as f64).min(max_dimension as f64 / height as f64);
    let scale = |side: u32| ((side as f64 * ratio).round() as u32).clamp(1, max_dimension);
    (scale(width), scale(height))
}

/// Encode packed RGB pixels as a JPEG data URL.
pub fn encode_rgb(
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    max_dimension: u32,
    quality: u8,
) -> Result<String, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::Empty(width, height));
    }
    let image = RgbImage::from_raw(width, height, rgb)
        .ok_or(EncodeError::BufferSize { width, height })?;

    let (target_width, target_height) = fit_within(width, height, max_dimension);
    let image = if (target_width, target_height) != (width, height) {
        log::debug!(
            "Scaling snapshot {}x{} -> {}x{}",
            width,
            height,
            target_width,
            target_height
        );
        imageops::resize(&image, target_width, target_height, FilterType::Triangle)
    } else {
        image
    };

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100)).encode_image(&image)?;

    Ok(format!("{}{}", DATA_URL_PREFIX, STANDARD.encode(&jpeg)))
}

/// Encode the canvas, flattened over its background.
pub fn encode_canvas(
    canvas: &SketchCanvas,
    max_dimension: u32,
    quality: u8,
) -> Result<String, EncodeError> {
    let pixels = canvas.pixels();
    encode_rgb(
        pixels.width(),
        pixels.height(),
        canvas.flatten_rgb(),
        max_dimension,
        quality,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchcalc_core::canvas::CanvasConfig;
    use sketchcalc_core::theme::CanvasColors;

    fn decode(data_url: &str) -> image::DynamicImage {
        let payload = data_url.strip_prefix(DATA_URL_PREFIX).unwrap();
        let bytes = STANDARD.decode(payload).unwrap();
        image::load_from_memory_with_format(&bytes, image::ImageFormat::Jpeg).unwrap()
    }

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(800, 600, 1024), (800, 600));
        assert_eq!(fit_within(2048, 1024, 1024), (1024, 512));
        assert_eq!(fit_within(1000, 3000, 1024), (341, 1024));
        assert_eq!(fit_within(1024, 1024, 1024), (1024, 1024));
    }

    #[test]
    fn test_zero_limit_does_not_panic() {
        assert_eq!(fit_within(800, 600, 0), (1, 1));
        assert_eq!(fit_within(0, 0, 0), (0, 0));

        let url = encode_rgb(8, 4, vec![0; 8 * 4 * 3], 0, 80).unwrap();
        let decoded = decode(&url);
        assert_eq!((decoded.width(), decoded.height()), (1, 1));
    }

    #[test]
    fn test_large_canvas_is_scaled() {
        let config = CanvasConfig {
            width: 2000,
            height: 1200,
            ..CanvasConfig::default()
        };
        let canvas = SketchCanvas::new(&config, CanvasColors::default());

        let url = encode_canvas(&canvas, 1024, 80).unwrap();
        assert!(url.starts_with(DATA_URL_PREFIX));
        let decoded = decode(&url);
        assert!(decoded.width() <= 1024 && decoded.height() <= 1024);
        assert_eq!(decoded.width(), 1024);
    }

    #[test]
    fn test_small_canvas_keeps_size() {
        let config = CanvasConfig {
            width: 64,
            height: 48,
            ..CanvasConfig::default()
        };
        let canvas = SketchCanvas::new(&config, CanvasColors::default());
        let decoded = decode(&encode_canvas(&canvas, 1024, 80).unwrap());
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            encode_rgb(0, 10, Vec::new(), 1024, 80),
            Err(EncodeError::Empty(0, 10))
        ));
        assert!(matches!(
            encode_rgb(2, 2, vec![0; 5], 1024, 80),
            Err(EncodeError::BufferSize { width: 2, height: 2 })
        ));
    }
}
