//! Raster image payloads for pasted and uploaded pictures.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use thiserror::Error;

/// Image format for stored image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// MIME type used in data URLs.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        // RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

impl From<ImageFormat> for ::image::ImageFormat {
    fn from(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Png => ::image::ImageFormat::Png,
            ImageFormat::Jpeg => ::image::ImageFormat::Jpeg,
            ImageFormat::WebP => ::image::ImageFormat::WebP,
        }
    }
}

/// Errors produced while reading image payloads.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("not a data URL")]
    NotDataUrl,
    #[error("data URL payload is not base64 encoded")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("unsupported image format")]
    UnsupportedFormat,
    #[error("failed to decode image: {0}")]
    Decode(#[from] ::image::ImageError),
}

/// An encoded image plus its pixel dimensions.
///
/// Bytes are kept base64-encoded so snapshots and documents stay plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    pub format: ImageFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    pub data_base64: String,
}

impl ImageData {
    /// Read an encoded PNG, JPEG or WebP image. Only the header is decoded.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageError> {
        let format = ImageFormat::from_magic_bytes(bytes).ok_or(ImageError::UnsupportedFormat)?;
        let (width, height) =
            ::image::ImageReader::with_format(Cursor::new(bytes), format.into()).into_dimensions()?;
        Ok(Self {
            format,
            width,
            height,
            data_base64: STANDARD.encode(bytes),
        })
    }

    /// Read a `data:image/...;base64,...` URL, as produced by clipboard pastes
    /// and file uploads.
    pub fn from_data_url(url: &str) -> Result<Self, ImageError> {
        let rest = url.trim().strip_prefix("data:").ok_or(ImageError::NotDataUrl)?;
        let (meta, payload) = rest.split_once(',').ok_or(ImageError::NotDataUrl)?;
        if !meta.ends_with(";base64") {
            return Err(ImageError::NotBase64);
        }
        let bytes = STANDARD.decode(payload.trim())?;
        Self::from_bytes(&bytes)
    }

    /// Encode back into a data URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.data_base64)
    }

    /// Decoded image bytes.
    pub fn bytes(&self) -> Result<Vec<u8>, ImageError> {
        Ok(STANDARD.decode(&self.data_base64)?)
    }
}

/// Encode a blank PNG of the given size (test fixture).
#[cfg(test)]
pub(crate) fn blank_png(width: u32, height: u32) -> Vec<u8> {
    let image = ::image::RgbaImage::new(width, height);
    let mut cursor = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ::image::ImageFormat::Png)
        .unwrap();
    cursor.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D]),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(b"RIFF\0\0\0\0WEBPVP8 "),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF8"), None);
        assert_eq!(ImageFormat::from_magic_bytes(&[]), None);
    }

    #[test]
    fn test_from_bytes_reads_dimensions() {
        let image = ImageData::from_bytes(&blank_png(7, 3)).unwrap();
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!((image.width, image.height), (7, 3));
    }

    #[test]
    fn test_data_url() {
        let png = blank_png(2, 5);
        let url = format!("data:image/png;base64,{}", STANDARD.encode(&png));

        let image = ImageData::from_data_url(&url).unwrap();
        assert_eq!((image.width, image.height), (2, 5));
        assert_eq!(image.to_data_url(), url);
        assert_eq!(image.bytes().unwrap(), png);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            ImageData::from_data_url("http://example.com/a.png"),
            Err(ImageError::NotDataUrl)
        ));
        assert!(matches!(
            ImageData::from_data_url("data:image/png,rawbytes"),
            Err(ImageError::NotBase64)
        ));
        assert!(matches!(
            ImageData::from_data_url("data:image/png;base64,@@@"),
            Err(ImageError::Base64(_))
        ));
        assert!(matches!(
            ImageData::from_bytes(b"plain text"),
            Err(ImageError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_truncated_header_is_a_decode_error() {
        let png = blank_png(4, 4);
        assert!(matches!(
            ImageData::from_bytes(&png[..12]),
            Err(ImageError::Decode(_))
        ));
    }
}
