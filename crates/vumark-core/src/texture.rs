//! Reference texture loading
//!
//! The engine draws augmentations with a reference image uploaded as raw
//! RGBA8 pixels. A new GL context invalidates prior GPU objects, so the
//! decoded pixels are kept on the CPU side and re-uploaded after every
//! surface change.

use std::path::Path;

use crate::{ArError, ArResult};

const BYTES_PER_PIXEL: usize = 4;

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTexture {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl ReferenceTexture {
    /// Decode an image file (JPEG or PNG) into RGBA8.
    pub fn load(path: &Path) -> ArResult<Self> {
        let image = image::open(path).map_err(|source| ArError::TextureLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// Wrap an already decoded buffer.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> ArResult<Self> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if pixels.len() != expected {
            return Err(ArError::TextureSize {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_load_png() {
        let dir = std::env::temp_dir().join(format!("vumark-texture-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("target.png");

        let mut image = RgbaImage::new(3, 2);
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        image.save(&path).unwrap();

        let texture = ReferenceTexture::load(&path).unwrap();
        assert_eq!(texture.width(), 3);
        assert_eq!(texture.height(), 2);
        assert_eq!(texture.pixels().len(), 3 * 2 * 4);
        assert_eq!(&texture.pixels()[..4], &[255, 0, 0, 255]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ReferenceTexture::load(Path::new("/nonexistent/Astronaut.jpg")).unwrap_err();
        assert!(matches!(err, ArError::TextureLoad { .. }));
    }

    #[test]
    fn test_from_rgba_checks_size() {
        assert!(ReferenceTexture::from_rgba(2, 2, vec![0; 16]).is_ok());
        let err = ReferenceTexture::from_rgba(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            ArError::TextureSize {
                expected: 16,
                actual: 15
            }
        ));
    }
}
