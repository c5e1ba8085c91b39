//! Persisting images.
//!
//! The rasterizer and resampler never touch a file format; whatever stores their output goes
//! through [`ImageCodec`]. [`PngCodec`] is the stock implementation on top of `image`.

use std::fs;
use std::io::Write;
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageEncoder, ImageFormat};
use log::info;
use tempfile::NamedTempFile;

use crate::error::{QiError, Result};

/// Encodes images to bytes and back.
pub trait ImageCodec {
    /// Serialises `img` in full.
    ///
    /// # Errors
    ///
    /// [`QiError::Encode`] when the format cannot hold this image.
    fn encode(&self, img: &DynamicImage) -> Result<Vec<u8>>;

    /// Parses `bytes` into an 8-bit image, keeping the stored channel count.
    ///
    /// # Errors
    ///
    /// [`QiError::Decode`] when the bytes are not a readable image.
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage>;

    /// Encodes `img` and writes it to `out`. Nothing is written if encoding fails.
    ///
    /// # Errors
    ///
    /// Encoding errors, or [`QiError::Io`] from the writer.
    fn write_to(&self, img: &DynamicImage, out: &mut dyn Write) -> Result<()> {
        let bytes = self.encode(img)?;
        out.write_all(&bytes)?;
        out.flush()?;
        Ok(())
    }

    /// Encodes `img` and stores it at `path`, creating missing parent directories.
    ///
    /// The bytes go to a temporary file next to `path` which is then renamed over it, so
    /// `path` either keeps its previous content or holds the complete new image.
    ///
    /// # Errors
    ///
    /// Encoding errors, or [`QiError::Io`].
    fn save(&self, img: &DynamicImage, path: &Path) -> Result<()> {
        let bytes = self.encode(img)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| QiError::Io(e.error))?;
        info!(
            "saved {}x{} image to {}",
            img.width(),
            img.height(),
            path.display()
        );
        Ok(())
    }

    /// Reads and decodes the image at `path`.
    ///
    /// # Errors
    ///
    /// [`QiError::Io`] or [`QiError::Decode`].
    fn load(&self, path: &Path) -> Result<DynamicImage> {
        let bytes = fs::read(path)?;
        let img = self.decode(&bytes)?;
        info!(
            "loaded {}: {}x{}, {} channels",
            path.display(),
            img.width(),
            img.height(),
            img.color().channel_count()
        );
        Ok(img)
    }
}

/// Lossless PNG. Decoding yields 8 bits per channel with 1 to 4 channels.
///
/// # Example
///
/// ```rust
/// use qiraster::codec::{ImageCodec, PngCodec};
/// use qiraster::pixel::filled;
///
/// let img = filled(8, 8, &[230, 53, 107]).unwrap();
/// let png = PngCodec.encode(&img).unwrap();
/// assert_eq!(PngCodec.decode(&png).unwrap(), img);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct PngCodec;

impl ImageCodec for PngCodec {
    fn encode(&self, img: &DynamicImage) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(img.as_bytes(), img.width(), img.height(), img.color().into())
            .map_err(|e| QiError::Encode(e.to_string()))?;
        Ok(out)
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(|e| QiError::Decode(e.to_string()))?;
        // 16-bit samples are narrowed to 8 bits, keeping the channel layout.
        Ok(match img {
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgba8(_) => img,
            DynamicImage::ImageLuma16(_) => DynamicImage::ImageLuma8(img.to_luma8()),
            DynamicImage::ImageLumaA16(_) => DynamicImage::ImageLumaA8(img.to_luma_alpha8()),
            other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::filled;
    use image::ExtendedColorType;

    #[test]
    fn test_png_signature() {
        let img = filled(2, 2, &[255, 255, 255]).unwrap();
        let png = PngCodec.encode(&img).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_keeps_channel_count() {
        for color in [&[7u8][..], &[7, 8][..], &[7, 8, 9][..], &[7, 8, 9, 10][..]] {
            let img = filled(3, 5, color).unwrap();
            let back = PngCodec.decode(&PngCodec.encode(&img).unwrap()).unwrap();
            assert_eq!(usize::from(back.color().channel_count()), color.len());
            assert_eq!(back, img);
        }
    }

    #[test]
    fn test_sixteen_bit_gray_stays_gray() {
        for (color, channels) in [(ExtendedColorType::L16, 1u8), (ExtendedColorType::La16, 2)] {
            let bytes = vec![0xFF; 2 * 2 * 2 * usize::from(channels)];
            let mut png = Vec::new();
            PngEncoder::new(&mut png).write_image(&bytes, 2, 2, color).unwrap();

            let img = PngCodec.decode(&png).unwrap();
            assert_eq!(img.color().channel_count(), channels);
            assert!(img.as_bytes().iter().all(|&b| b == 255));
        }
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(PngCodec.decode(b"not a png"), Err(QiError::Decode(_))));
    }

    #[test]
    fn test_write_to() {
        let img = filled(4, 4, &[1, 2, 3]).unwrap();
        let mut out = Vec::new();
        PngCodec.write_to(&img, &mut out).unwrap();
        assert_eq!(PngCodec.decode(&out).unwrap(), img);
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qr.png");
        fs::write(&path, b"old").unwrap();

        let img = filled(3, 3, &[9, 9, 9]).unwrap();
        PngCodec.save(&img, &path).unwrap();
        assert_eq!(PngCodec.load(&path).unwrap(), img);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_save_leaves_target_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qr.png");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep.txt"), b"keep").unwrap();

        let img = filled(3, 3, &[9, 9, 9]).unwrap();
        assert!(matches!(PngCodec.save(&img, &path), Err(QiError::Io(_))));
        assert_eq!(fs::read(path.join("keep.txt")).unwrap(), b"keep");
        // no temporary file left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_unencodable_image_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qr.png");
        let img = DynamicImage::new_rgb32f(2, 2);
        assert!(matches!(PngCodec.save(&img, &path), Err(QiError::Encode(_))));
        assert!(!path.exists());
    }
}
