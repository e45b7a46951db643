//! Photo compression collaborator.
//!
//! Photos are stored inline as data URIs. The block layer treats them as
//! opaque strings and only insists they are non-empty, which
//! [`compress_photo`] checks on the way out of any compressor.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, GenericImageView};
use thiserror::Error;

use crate::config::ImageConfig;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MediaError {
    #[error("cannot decode image: {0}")]
    Decode(String),
    #[error("cannot encode image: {0}")]
    Encode(String),
    #[error("compressor returned an empty uri")]
    Empty,
}

/// Turns raw image bytes into a URI suitable for a block's `photos`.
#[async_trait]
pub trait ImageCompressor: Send + Sync {
    async fn compress(&self, raw: &[u8]) -> Result<String, MediaError>;
}

/// Compress `raw` and reject an empty result.
pub async fn compress_photo(
    compressor: &dyn ImageCompressor,
    raw: &[u8],
) -> Result<String, MediaError> {
    let uri = compressor.compress(raw).await?;
    if uri.trim().is_empty() {
        return Err(MediaError::Empty);
    }
    Ok(uri)
}

/// Downscales to fit a bounding box and re-encodes as JPEG data URI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JpegCompressor {
    max_width: u32,
    max_height: u32,
    quality: u8,
}

impl Default for JpegCompressor {
    fn default() -> Self {
        Self::from_config(&ImageConfig::default())
    }
}

impl JpegCompressor {
    pub fn from_config(config: &ImageConfig) -> Self {
        Self {
            max_width: config.max_width,
            max_height: config.max_height,
            quality: config.quality.clamp(1, 100),
        }
    }

    /// Blocking compression; [`ImageCompressor::compress`] runs this off the
    /// async executor.
    pub fn compress_blocking(&self, raw: &[u8]) -> Result<String, MediaError> {
        let img = image::load_from_memory(raw).map_err(|e| MediaError::Decode(e.to_string()))?;

        let (width, height) = img.dimensions();
        // Only ever shrink; resize() keeps the aspect ratio inside the box
        let img = if width > self.max_width || height > self.max_height {
            img.resize(self.max_width, self.max_height, FilterType::Triangle)
        } else {
            img
        };

        let rgb = img.to_rgb8();
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, self.quality)
            .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
            .map_err(|e| MediaError::Encode(e.to_string()))?;

        Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(&jpeg)))
    }
}

#[async_trait]
impl ImageCompressor for JpegCompressor {
    async fn compress(&self, raw: &[u8]) -> Result<String, MediaError> {
        let compressor = *self;
        let raw = raw.to_vec();
        tokio::task::spawn_blocking(move || compressor.compress_blocking(&raw))
            .await
            .map_err(|e| MediaError::Encode(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use image::{DynamicImage, ImageOutputFormat, RgbImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    fn decoded_dimensions(uri: &str) -> (u32, u32) {
        let payload = uri.strip_prefix("data:image/jpeg;base64,").unwrap();
        let jpeg = STANDARD.decode(payload).unwrap();
        image::load_from_memory(&jpeg).unwrap().dimensions()
    }

    #[test]
    fn test_large_image_fits_bounding_box() {
        let uri = JpegCompressor::default().compress_blocking(&png(4000, 1000)).unwrap();
        assert_eq!(decoded_dimensions(&uri), (1920, 480));
    }

    #[test]
    fn test_small_image_is_not_upscaled() {
        let uri = JpegCompressor::default().compress_blocking(&png(64, 48)).unwrap();
        assert_eq!(decoded_dimensions(&uri), (64, 48));
    }

    #[test]
    fn test_garbage_input() {
        let err = JpegCompressor::default().compress_blocking(b"not an image").unwrap_err();
        assert!(matches!(err, MediaError::Decode(_)));
    }

    struct EmptyCompressor;

    #[async_trait]
    impl ImageCompressor for EmptyCompressor {
        async fn compress(&self, _raw: &[u8]) -> Result<String, MediaError> {
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_empty_uri_is_rejected() {
        assert_eq!(compress_photo(&EmptyCompressor, b"x").await, Err(MediaError::Empty));
    }

    #[tokio::test]
    async fn test_async_compress_produces_data_uri() {
        let uri = compress_photo(&JpegCompressor::default(), &png(10, 10)).await.unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }
}
