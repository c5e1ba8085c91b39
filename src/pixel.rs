//! Colors, and the boundary between raw row-major bytes and `image` buffers.
//!
//! Every buffer in the pipeline is an 8-bit [`DynamicImage`] with 1 to 4 channels. The helpers
//! here build those from raw bytes without aborting when memory runs out.

use image::{DynamicImage, ImageBuffer};
use serde::{Deserialize, Serialize};

use crate::error::{QiError, Result};

/// An 8-bit RGB color.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    /// Dark-module color used when nothing else is configured.
    pub const FOREGROUND: Rgb = Rgb([230, 53, 107]);

    /// Light-module color used when nothing else is configured.
    pub const BACKGROUND: Rgb = Rgb([255, 255, 255]);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }
}

impl From<Rgb> for image::Rgb<u8> {
    fn from(color: Rgb) -> Self {
        image::Rgb(color.0)
    }
}

/// Wraps row-major, top-to-bottom bytes as an 8-bit image with `channels` channels.
///
/// # Errors
///
/// [`QiError::InvalidDimensions`] if any size is zero or `data.len()` is not
/// `width * height * channels`, [`QiError::UnsupportedChannels`] above 4 channels.
///
/// # Example
///
/// ```rust
/// use qiraster::pixel::from_raw;
///
/// let img = from_raw(2, 1, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
/// assert_eq!(img.to_rgb8().get_pixel_checked(1, 0).map(|p| p.0), Some([4, 5, 6]));
/// assert!(from_raw(2, 1, 3, vec![0; 5]).is_err());
/// ```
pub fn from_raw(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<DynamicImage> {
    let len = data.len();
    let invalid = QiError::InvalidDimensions {
        width,
        height,
        channels,
        len,
    };
    if width == 0 || height == 0 || channels == 0 || byte_len(width, height, channels) != Some(len)
    {
        return Err(invalid);
    }
    let img = match channels {
        1 => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
        2 => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageLumaA8),
        3 => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
        4 => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageRgba8),
        n => return Err(QiError::UnsupportedChannels(n)),
    };
    img.ok_or(invalid)
}

/// An image with every pixel set to `color`; its length sets the channel count.
///
/// # Errors
///
/// As [`from_raw`], plus [`QiError::AllocationFailure`] when the bytes cannot be reserved.
pub fn filled(width: u32, height: u32, color: &[u8]) -> Result<DynamicImage> {
    let channels = u8::try_from(color.len()).map_err(|_| QiError::UnsupportedChannels(u8::MAX))?;
    if !(1..=4).contains(&channels) {
        return Err(QiError::UnsupportedChannels(channels));
    }
    let mut data = allocate(width, height, channels)?;
    for px in data.chunks_exact_mut(color.len()) {
        px.copy_from_slice(color);
    }
    from_raw(width, height, channels, data)
}

/// Channel count of an 8-bit image, `None` for wider sample types.
pub(crate) fn channels_u8(img: &DynamicImage) -> Option<u8> {
    match img {
        DynamicImage::ImageLuma8(_) => Some(1),
        DynamicImage::ImageLumaA8(_) => Some(2),
        DynamicImage::ImageRgb8(_) => Some(3),
        DynamicImage::ImageRgba8(_) => Some(4),
        _ => None,
    }
}

pub(crate) fn byte_len(width: u32, height: u32, channels: u8) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(usize::from(channels))
}

/// Reserves a zeroed byte vector for the given dimensions without aborting on failure.
pub(crate) fn allocate(width: u32, height: u32, channels: u8) -> Result<Vec<u8>> {
    if width == 0 || height == 0 || channels == 0 {
        return Err(QiError::InvalidDimensions {
            width,
            height,
            channels,
            len: 0,
        });
    }
    let failure = QiError::AllocationFailure {
        width,
        height,
        channels,
    };
    let Some(len) = byte_len(width, height, channels) else {
        return Err(failure);
    };
    let mut data = Vec::new();
    if data.try_reserve_exact(len).is_err() {
        return Err(failure);
    }
    data.resize(len, 0);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_rejects_zero() {
        assert!(matches!(
            allocate(0, 4, 3),
            Err(QiError::InvalidDimensions { width: 0, .. })
        ));
        assert!(matches!(
            allocate(4, 4, 0),
            Err(QiError::InvalidDimensions { channels: 0, .. })
        ));
    }

    #[test]
    fn test_huge_buffer_is_allocation_failure() {
        assert!(matches!(
            allocate(u32::MAX, u32::MAX, 255),
            Err(QiError::AllocationFailure { .. })
        ));
    }

    #[test]
    fn test_from_raw_checks_len() {
        assert!(from_raw(2, 2, 3, vec![0; 12]).is_ok());
        assert!(matches!(
            from_raw(2, 2, 3, vec![0; 11]),
            Err(QiError::InvalidDimensions { len: 11, .. })
        ));
        assert!(matches!(
            from_raw(1, 1, 5, vec![0; 5]),
            Err(QiError::UnsupportedChannels(5))
        ));
    }

    #[test]
    fn test_from_raw_picks_layout() {
        for channels in 1..=4u8 {
            let img = from_raw(3, 2, channels, vec![0; 6 * usize::from(channels)]).unwrap();
            assert_eq!(img.color().channel_count(), channels);
            assert_eq!(channels_u8(&img), Some(channels));
        }
        assert_eq!(channels_u8(&DynamicImage::new_luma16(1, 1)), None);
    }

    #[test]
    fn test_filled() {
        let img = filled(3, 2, &Rgb::FOREGROUND.0).unwrap();
        assert_eq!(img.color().channel_count(), 3);
        assert!(img.as_bytes().chunks_exact(3).all(|px| px == [230, 53, 107]));
        assert!(matches!(filled(1, 1, &[0; 5]), Err(QiError::UnsupportedChannels(5))));
    }
}
