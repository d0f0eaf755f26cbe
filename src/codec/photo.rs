//! Embedded photo encode/decode.
//!
//! Photos are stored inline on the record as a base64 data URI. The encode
//! path bounds the image first (longer edge capped, lossy re-encode at a
//! fixed quality) so a record never carries a full-resolution camera frame.

use crate::error::{DirectoryError, Result};
use crate::types::Photo;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::io::Reader as ImageReader;
use image::DynamicImage;
use std::io::Cursor;

/// Bounds applied when embedding a photo.
#[derive(Clone, Debug)]
pub struct PhotoConfig {
    /// Maximum width or height after downscaling, in pixels.
    pub max_dimension: u32,

    /// JPEG re-encode quality, 0-100.
    pub jpeg_quality: u8,
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            max_dimension: 800,
            jpeg_quality: 70,
        }
    }
}

/// Encode raw image bytes into an embedded photo.
///
/// Probes the dimensions first (no full decode just to measure), downscales
/// so the longer edge fits `max_dimension` (never upscales), re-encodes as
/// JPEG at the configured quality, and wraps the result in a
/// `data:image/jpeg;base64,` URI with no line wrapping.
pub fn encode_photo(source: &[u8], config: &PhotoConfig) -> Result<Photo> {
    let (width, height) = ImageReader::new(Cursor::new(source))
        .with_guessed_format()
        .map_err(|e| DirectoryError::Photo(e.to_string()))?
        .into_dimensions()?;

    let mut img = ImageReader::new(Cursor::new(source))
        .with_guessed_format()
        .map_err(|e| DirectoryError::Photo(e.to_string()))?
        .decode()?;

    if width.max(height) > config.max_dimension {
        img = img.resize(
            config.max_dimension,
            config.max_dimension,
            FilterType::Triangle,
        );
    }

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, config.jpeg_quality).encode_image(&img.to_rgb8())?;

    let mut uri = String::from("data:image/jpeg;base64,");
    uri.push_str(&STANDARD.encode(&jpeg));
    Ok(Photo::Encoded(uri))
}

/// Recover the compressed image bytes from a data URI.
///
/// Strips everything up to and including the first comma and base64-decodes
/// the remainder.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let payload = uri
        .split_once(',')
        .map(|(_, rest)| rest)
        .ok_or_else(|| DirectoryError::Photo("no comma in data uri".to_string()))?;
    STANDARD
        .decode(payload)
        .map_err(|e| DirectoryError::Photo(e.to_string()))
}

/// Decode a data URI all the way to pixels.
///
/// Failures here are per-photo; the presentation layer substitutes a
/// placeholder rather than failing the record.
pub fn decode_image(uri: &str) -> Result<DynamicImage> {
    let bytes = decode_data_uri(uri)?;
    Ok(image::load_from_memory(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    fn test_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, 95)
            .encode_image(&img)
            .unwrap();
        buf
    }

    #[test]
    fn test_encode_bounds_and_compresses() {
        let source = test_jpeg(1600, 1200);
        let photo = encode_photo(&source, &PhotoConfig::default()).unwrap();

        let uri = match &photo {
            Photo::Encoded(uri) => uri.clone(),
            other => panic!("expected encoded photo, got {other:?}"),
        };
        assert!(uri.starts_with("data:image/jpeg;base64,"));
        assert!(!uri.contains('\n'));

        let compressed = decode_data_uri(&uri).unwrap();
        assert!(!compressed.is_empty());
        assert!(compressed.len() <= source.len());

        let decoded = decode_image(&uri).unwrap();
        let (w, h) = decoded.dimensions();
        assert!(w <= 800 && h <= 800);
        // Aspect ratio preserved: 1600x1200 -> 800x600.
        assert_eq!((w, h), (800, 600));
    }

    #[test]
    fn test_encode_never_upscales() {
        let source = test_jpeg(200, 100);
        let photo = encode_photo(&source, &PhotoConfig::default()).unwrap();

        let decoded = decode_image(photo.as_str()).unwrap();
        assert_eq!(decoded.dimensions(), (200, 100));
    }

    #[test]
    fn test_encode_rejects_garbage() {
        let result = encode_photo(b"definitely not an image", &PhotoConfig::default());
        assert!(matches!(result, Err(DirectoryError::Photo(_))));
    }

    #[test]
    fn test_decode_requires_comma() {
        let result = decode_data_uri("data:image/jpeg;base64");
        assert!(matches!(result, Err(DirectoryError::Photo(_))));
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        let result = decode_data_uri("data:image/jpeg;base64,!!!not-base64!!!");
        assert!(matches!(result, Err(DirectoryError::Photo(_))));
    }
}
