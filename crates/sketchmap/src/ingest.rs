//! Sketch ingestion: validates raw image bytes and decodes them to a bitmap.
//!
//! The format check runs before the size check, and both run before any
//! decoding work, so rejected payloads cost nothing.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat};
use log::{debug, info};

use crate::{config::IngestConfig, error::SketchError};

/// An 8-bit grayscale image, row-major, 0 = black ink, 255 = white paper.
///
/// Transparent pixels are composited onto white.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    depth: u16,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Wraps a luminance buffer.
    ///
    /// Returns `None` when the buffer length does not match the dimensions.
    pub fn from_luma(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            depth: 8,
            pixels,
        })
    }

    fn from_image(image: &DynamicImage) -> Self {
        let depth = image.color().bits_per_pixel();
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        let pixels = rgba
            .pixels()
            .map(|pixel| {
                let [r, g, b, a] = pixel.0;
                let luma = (299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000;
                let alpha = a as u32;
                ((luma * alpha + 255 * (255 - alpha)) / 255) as u8
            })
            .collect();

        Self {
            width,
            height,
            depth,
            pixels,
        }
    }

    /// Returns the width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bits per pixel of the source image
    pub fn depth(&self) -> u16 {
        self.depth
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Luminance at `(x, y)`, or `None` outside the image.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

/// Lowercases, drops parameters and maps the `image/jpg` alias.
fn normalize_mime(mime: &str) -> String {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    let essence = essence.to_ascii_lowercase();
    if essence == "image/jpg" {
        "image/jpeg".to_string()
    } else {
        essence
    }
}

fn image_format(mime: &str) -> Option<ImageFormat> {
    match mime {
        "image/png" => Some(ImageFormat::Png),
        "image/jpeg" => Some(ImageFormat::Jpeg),
        "image/gif" => Some(ImageFormat::Gif),
        _ => None,
    }
}

/// Validates and decodes an image payload.
///
/// # Errors
///
/// - [`SketchError::UnsupportedFormat`] when `mime` is not allowed or has no decoder
/// - [`SketchError::PayloadTooLarge`] when `bytes` exceeds the ceiling
/// - [`SketchError::Decode`] when the bytes are not a valid image of that format
pub fn ingest(bytes: &[u8], mime: &str, config: &IngestConfig) -> Result<Bitmap, SketchError> {
    let normalized = normalize_mime(mime);
    let allowed = config
        .allowed_formats()
        .iter()
        .any(|format| normalize_mime(format) == normalized);

    let format = image_format(&normalized)
        .filter(|_| allowed)
        .ok_or_else(|| SketchError::UnsupportedFormat {
            mime: mime.to_string(),
            allowed: config.allowed_formats().to_vec(),
        })?;

    if bytes.len() > config.max_bytes() {
        return Err(SketchError::PayloadTooLarge {
            size: bytes.len(),
            limit: config.max_bytes(),
        });
    }

    info!(mime = normalized, size = bytes.len(); "Decoding sketch");
    let image = image::load_from_memory_with_format(bytes, format)
        .map_err(|err| SketchError::Decode(err.to_string()))?;

    let bitmap = Bitmap::from_image(&image);
    debug!(
        width = bitmap.width(),
        height = bitmap.height(),
        depth = bitmap.depth();
        "Sketch decoded"
    );
    Ok(bitmap)
}

/// Ingests a `data:<mime>;base64,<payload>` URL.
///
/// # Errors
///
/// Returns [`SketchError::Decode`] for malformed URLs, otherwise whatever
/// [`ingest`] returns for the embedded payload.
pub fn ingest_data_url(url: &str, config: &IngestConfig) -> Result<Bitmap, SketchError> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| SketchError::Decode("data URL must start with `data:`".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| SketchError::Decode("data URL has no payload".to_string()))?;

    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| SketchError::Decode("data URL payload must be base64".to_string()))?;

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|err| SketchError::Decode(format!("invalid base64 payload: {err}")))?;

    ingest(&bytes, mime, config)
}
