//! Data models and structures
//!
//! Defines the request shapes handed to a content service and the in-memory
//! raster image carried by image-analysis requests.

use crate::Result;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::Path;

/// An in-memory decoded bitmap.
#[derive(Debug, Clone)]
pub struct RasterImage {
    inner: DynamicImage,
}

impl RasterImage {
    pub fn new(inner: DynamicImage) -> Self {
        Self { inner }
    }

    /// Decode an encoded image (PNG, JPEG, WebP, ...) held in memory.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(image::load_from_memory(bytes)?))
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(image::open(path)?))
    }

    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// JPEG bytes suitable for inline upload. Alpha is dropped because JPEG
    /// cannot carry it.
    pub fn to_jpeg(&self) -> Result<Vec<u8>> {
        let rgb = DynamicImage::ImageRgb8(self.inner.to_rgb8());
        let mut buf = Cursor::new(Vec::new());
        rgb.write_to(&mut buf, ImageFormat::Jpeg)?;
        Ok(buf.into_inner())
    }
}

impl From<DynamicImage> for RasterImage {
    fn from(inner: DynamicImage) -> Self {
        Self::new(inner)
    }
}

/// A single request to the generative content service. Immutable once built.
#[derive(Debug, Clone)]
pub enum ContentRequest {
    Text { prompt: String },
    Multimodal { prompt: String, image: RasterImage },
}

impl ContentRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self::Text {
            prompt: prompt.into(),
        }
    }

    pub fn multimodal(prompt: impl Into<String>, image: RasterImage) -> Self {
        Self::Multimodal {
            prompt: prompt.into(),
            image,
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            Self::Text { prompt } | Self::Multimodal { prompt, .. } => prompt,
        }
    }

    pub fn image(&self) -> Option<&RasterImage> {
        match self {
            Self::Text { .. } => None,
            Self::Multimodal { image, .. } => Some(image),
        }
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Multimodal { .. } => "multimodal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn tiny_image() -> RasterImage {
        RasterImage::new(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            4,
            3,
            Rgba([10, 20, 200, 128]),
        )))
    }

    #[test]
    fn test_to_jpeg_produces_jpeg_signature() {
        let jpeg = tiny_image().to_jpeg().unwrap();
        assert_eq!(&jpeg[..3], &[0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_from_encoded_decodes_dimensions() {
        let jpeg = tiny_image().to_jpeg().unwrap();
        let decoded = RasterImage::from_encoded(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    #[test]
    fn test_from_encoded_rejects_garbage() {
        assert!(RasterImage::from_encoded(&[0x00, 0x01, 0x02, 0x03]).is_err());
    }

    #[test]
    fn test_request_accessors() {
        let text = ContentRequest::text("rain tomorrow?");
        assert_eq!(text.prompt(), "rain tomorrow?");
        assert!(text.image().is_none());
        assert_eq!(text.kind(), "text");

        let multimodal = ContentRequest::multimodal("look", tiny_image());
        assert_eq!(multimodal.prompt(), "look");
        assert!(multimodal.image().is_some());
        assert_eq!(multimodal.kind(), "multimodal");
    }
}
