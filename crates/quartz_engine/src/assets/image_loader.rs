//! Image loading utilities
//!
//! Decodes image files into raw RGBA8 pixel data ready for texture upload.

use crate::assets::AssetError;

use std::path::Path;

use log::debug;

/// Decoded image data
///
/// Pixels are always expanded to 4-channel RGBA8 regardless of the
/// source format, matching the texture format the renderer uses.
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Raw pixel data, `width * height * 4` bytes
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Number of channels, always 4 after decoding
    pub channels: u8,
}

impl ImageData {
    /// Load and decode an image file
    pub fn from_file(path: &Path) -> Result<Self, AssetError> {
        let image = image::open(path)?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        debug!("Loaded image {} ({}x{})", path.display(), width, height);

        Ok(Self {
            data: rgba.into_raw(),
            width,
            height,
            channels: 4,
        })
    }

    /// Decode an image from an in-memory byte buffer
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let image = image::load_from_memory(bytes)?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self {
            data: rgba.into_raw(),
            width,
            height,
            channels: 4,
        })
    }

    /// Size of the pixel buffer in bytes
    #[must_use]
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode_test_png(width: u32, height: u32) -> Vec<u8> {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_from_bytes_expands_to_rgba() {
        let png = encode_test_png(4, 2);
        let data = ImageData::from_bytes(&png).unwrap();

        assert_eq!(data.width, 4);
        assert_eq!(data.height, 2);
        assert_eq!(data.channels, 4);
        assert_eq!(data.byte_size(), 4 * 2 * 4);
        assert_eq!(&data.data[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(ImageData::from_bytes(&[0, 1, 2, 3]).is_err());
    }
}
