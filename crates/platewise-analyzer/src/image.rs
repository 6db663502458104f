//! Image validation

use crate::error::AnalyzerError;

/// Image formats the vision provider accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG
    Jpeg,
    /// PNG
    Png,
    /// WebP
    Webp,
    /// GIF
    Gif,
}

impl ImageFormat {
    /// MIME type sent with the image
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Gif => "image/gif",
        }
    }

    /// Detect the format from magic bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(ImageFormat::Jpeg),
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(ImageFormat::Png),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(ImageFormat::Webp),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(ImageFormat::Gif),
            _ => None,
        }
    }
}

/// Check an image before sending it anywhere
pub fn validate_image(bytes: &[u8], max_bytes: usize) -> Result<ImageFormat, AnalyzerError> {
    if bytes.is_empty() {
        return Err(AnalyzerError::InvalidImage("image is empty".to_string()));
    }
    if bytes.len() > max_bytes {
        return Err(AnalyzerError::InvalidImage(format!(
            "image is {} bytes, limit is {}",
            bytes.len(),
            max_bytes
        )));
    }
    ImageFormat::sniff(bytes)
        .ok_or_else(|| AnalyzerError::InvalidImage("unsupported image format".to_string()))
}
