use std::path::{Path, PathBuf};

use base64::Engine as _;
use image::DynamicImage;

use crate::errors::{GroundError, GroundResult};

/// A decoded screenshot, plus the file it came from when there is one.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub image: DynamicImage,
    pub path: Option<PathBuf>,
}

impl Screenshot {
    /// Decode a raster file. The file is closed before this returns, on
    /// success and failure alike.
    pub fn open(path: impl AsRef<Path>) -> GroundResult<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|e| GroundError::Decode(format!("{}: {e}", path.display())))?;
        tracing::debug!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "screenshot loaded"
        );
        Ok(Self {
            image,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn from_memory(bytes: &[u8]) -> GroundResult<Self> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| GroundError::Decode(format!("in-memory image: {e}")))?;
        Ok(Self { image, path: None })
    }

    pub fn from_image(image: DynamicImage) -> Self {
        Self { image, path: None }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// PNG bytes, base64-encoded, as sent to multimodal endpoints.
    pub fn to_png_base64(&self) -> GroundResult<String> {
        let mut png = Vec::new();
        self.image
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| GroundError::Encode(format!("PNG encode: {e}")))?;
        Ok(base64::engine::general_purpose::STANDARD.encode(&png))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use image::{Rgb, RgbImage};

    #[test]
    fn corrupt_bytes_are_a_decode_error() {
        let err = Screenshot::from_memory(b"definitely not a png").unwrap_err();
        assert!(matches!(err, GroundError::Decode(_)));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = Screenshot::open("/nonexistent/shot.png").unwrap_err();
        assert!(matches!(err, GroundError::Decode(_)));
    }

    #[test]
    fn open_keeps_path_and_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        RgbImage::from_pixel(40, 30, Rgb([1, 2, 3])).save(&path).unwrap();

        let shot = Screenshot::open(&path).unwrap();
        assert_eq!(shot.dimensions(), (40, 30));
        assert_eq!(shot.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn base64_payload_decodes_back_to_png() {
        let shot = Screenshot::from_image(DynamicImage::ImageRgb8(RgbImage::new(8, 6)));
        let b64 = shot.to_png_base64().unwrap();
        let png = base64::engine::general_purpose::STANDARD.decode(b64).unwrap();
        let back = Screenshot::from_memory(&png).unwrap();
        assert_eq!(back.dimensions(), (8, 6));
    }
}
