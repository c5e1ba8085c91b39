//! Separable image resizing on top of `fast_image_resize`.
//!
//! The image is resized horizontally into a scratch buffer, then vertically into the
//! destination, so each axis picks its own kernel: bilinear (tent) when that axis grows or
//! keeps its size, box averaging when it shrinks. Kernel taps past the border are dropped and
//! the remaining weights renormalised, so edge pixels repeat the edge and nothing is read out
//! of bounds.

use fast_image_resize::images::{Image, ImageRef};
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::DynamicImage;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{QiError, Result};
use crate::pixel::{allocate, byte_len, channels_u8, from_raw};

/// Which kernel to use along an axis.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Tent when the axis grows or keeps its size, box when it shrinks.
    #[default]
    Auto,
    /// Linear interpolation; widened to the scale ratio when shrinking.
    Tent,
    /// Area averaging over each destination pixel's footprint.
    Box,
}

impl Filter {
    /// Kernel for an axis going from `src` to `dst` samples.
    fn kernel(self, src: u32, dst: u32) -> FilterType {
        match self {
            Filter::Auto if dst >= src => FilterType::Bilinear,
            Filter::Auto => FilterType::Box,
            Filter::Tent => FilterType::Bilinear,
            Filter::Box => FilterType::Box,
        }
    }
}

/// Resizes 8-bit images to arbitrary dimensions, keeping the channel count.
///
/// # Example
///
/// ```rust
/// use qiraster::pixel::filled;
/// use qiraster::resample::ImageResampler;
///
/// let src = filled(30, 30, &[230, 53, 107]).unwrap();
/// let dst = ImageResampler::default().resize(&src, 150, 150).unwrap();
/// assert_eq!((dst.width(), dst.height()), (150, 150));
/// assert!(dst.as_bytes().chunks_exact(3).all(|px| px == [230, 53, 107]));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageResampler {
    filter: Filter,
}

impl ImageResampler {
    pub fn new(filter: Filter) -> Self {
        Self { filter }
    }

    /// Resizes `src` to `target_width` × `target_height`.
    ///
    /// # Errors
    ///
    /// [`QiError::InvalidDimensions`] for an empty source or a zero target,
    /// [`QiError::UnsupportedColor`] for images wider than 8 bits per channel, and
    /// [`QiError::AllocationFailure`] when the destination or scratch buffer cannot be obtained.
    pub fn resize(
        &self,
        src: &DynamicImage,
        target_width: u32,
        target_height: u32,
    ) -> Result<DynamicImage> {
        let channels = channels_u8(src)
            .ok_or_else(|| QiError::UnsupportedColor(format!("{:?}", src.color())))?;
        self.resize_bytes(
            src.as_bytes(),
            src.width(),
            src.height(),
            channels,
            target_width,
            target_height,
        )
    }

    /// Resizes a raw row-major byte sequence, checking it against the stated dimensions first.
    ///
    /// # Errors
    ///
    /// [`QiError::InvalidDimensions`] if a source size or channel count is zero, if
    /// `data.len()` is not `width * height * channels`, or if a target size is zero. No
    /// buffer is allocated in that case. [`QiError::UnsupportedChannels`] above 4 channels,
    /// [`QiError::AllocationFailure`] as for [`ImageResampler::resize`].
    pub fn resize_bytes(
        &self,
        data: &[u8],
        width: u32,
        height: u32,
        channels: u8,
        target_width: u32,
        target_height: u32,
    ) -> Result<DynamicImage> {
        let expected = byte_len(width, height, channels);
        if width == 0 || height == 0 || channels == 0 || expected != Some(data.len()) {
            return Err(QiError::InvalidDimensions {
                width,
                height,
                channels,
                len: data.len(),
            });
        }
        if target_width == 0 || target_height == 0 {
            return Err(QiError::InvalidDimensions {
                width: target_width,
                height: target_height,
                channels,
                len: 0,
            });
        }
        let pixel_type = match channels {
            1 => PixelType::U8,
            2 => PixelType::U8x2,
            3 => PixelType::U8x3,
            4 => PixelType::U8x4,
            n => return Err(QiError::UnsupportedChannels(n)),
        };
        // Both buffers must be representable before either is reserved.
        for (w, h) in [(target_width, target_height), (target_width, height)] {
            if byte_len(w, h, channels).is_none() {
                return Err(QiError::AllocationFailure {
                    width: w,
                    height: h,
                    channels,
                });
            }
        }
        debug!(
            "resampling {width}x{height}x{channels} to {target_width}x{target_height} ({:?})",
            self.filter
        );

        let mut dst = allocate(target_width, target_height, channels)?;
        if (width, height) == (target_width, target_height) {
            dst.copy_from_slice(data);
            return from_raw(target_width, target_height, channels, dst);
        }

        let scratch;
        let rows: &[u8] = if target_width == width {
            data
        } else {
            let mut buf = allocate(target_width, height, channels)?;
            resize_axis(
                data,
                (width, height),
                &mut buf,
                (target_width, height),
                pixel_type,
                self.filter.kernel(width, target_width),
            )?;
            scratch = buf;
            &scratch
        };

        if target_height == height {
            dst.copy_from_slice(rows);
        } else {
            resize_axis(
                rows,
                (target_width, height),
                &mut dst,
                (target_width, target_height),
                pixel_type,
                self.filter.kernel(height, target_height),
            )?;
        }
        from_raw(target_width, target_height, channels, dst)
    }
}

/// One convolution pass from `src` into `dst`; the two differ along a single axis.
fn resize_axis(
    src: &[u8],
    (src_width, src_height): (u32, u32),
    dst: &mut [u8],
    (dst_width, dst_height): (u32, u32),
    pixel_type: PixelType,
    kernel: FilterType,
) -> Result<()> {
    let src_image = ImageRef::new(src_width, src_height, src, pixel_type)
        .map_err(|e| QiError::Resize(format!("invalid source: {e}")))?;
    let mut dst_image = Image::from_slice_u8(dst_width, dst_height, dst, pixel_type)
        .map_err(|e| QiError::Resize(format!("invalid destination: {e}")))?;
    // Buffers carry arbitrary channels, never premultiplied alpha.
    let options = ResizeOptions::new()
        .resize_alg(ResizeAlg::Convolution(kernel))
        .use_alpha(false);
    Resizer::new()
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| QiError::Resize(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{filled, Rgb};

    fn gradient(w: u32, h: u32) -> DynamicImage {
        let mut data = Vec::new();
        for y in 0..h {
            for x in 0..w {
                data.extend_from_slice(&[
                    (x * 17 % 256) as u8,
                    (y * 29 % 256) as u8,
                    ((x + y) * 7 % 256) as u8,
                ]);
            }
        }
        from_raw(w, h, 3, data).unwrap()
    }

    fn at(img: &DynamicImage, x: u32, y: u32) -> Option<[u8; 3]> {
        img.as_rgb8()?.get_pixel_checked(x, y).map(|px| px.0)
    }

    #[test]
    fn test_axis_kernels() {
        assert!(matches!(Filter::Auto.kernel(10, 150), FilterType::Bilinear));
        assert!(matches!(Filter::Auto.kernel(10, 10), FilterType::Bilinear));
        assert!(matches!(Filter::Auto.kernel(150, 10), FilterType::Box));
        assert!(matches!(Filter::Tent.kernel(150, 10), FilterType::Bilinear));
        assert!(matches!(Filter::Box.kernel(10, 150), FilterType::Box));
    }

    #[test]
    fn test_output_len() {
        let src = gradient(13, 7);
        for &(w, h) in &[(1, 1), (13, 7), (26, 3), (5, 40), (150, 150)] {
            let dst = ImageResampler::default().resize(&src, w, h).unwrap();
            assert_eq!(dst.as_bytes().len(), (w * h * 3) as usize);
            assert_eq!(dst.color().channel_count(), 3);
        }
    }

    #[test]
    fn test_flat_color_invariance() {
        let color = Rgb::FOREGROUND.0;
        let src = filled(9, 5, &color).unwrap();
        for filter in [Filter::Auto, Filter::Tent, Filter::Box] {
            for &(w, h) in &[(1, 1), (3, 17), (100, 2), (9, 5), (250, 250)] {
                let dst = ImageResampler::new(filter).resize(&src, w, h).unwrap();
                assert!(dst.as_bytes().chunks_exact(3).all(|px| px == color), "{filter:?} {w}x{h}");
            }
        }
    }

    #[test]
    fn test_same_size_is_identity() {
        let src = gradient(11, 4);
        assert_eq!(ImageResampler::default().resize(&src, 11, 4).unwrap(), src);
        assert_eq!(ImageResampler::new(Filter::Box).resize(&src, 11, 4).unwrap(), src);
    }

    #[test]
    fn test_upscale_two_by_two() {
        let fg = Rgb::FOREGROUND.0;
        let bg = Rgb::BACKGROUND.0;
        let mut data = Vec::new();
        for px in [fg, bg, bg, fg] {
            data.extend_from_slice(&px);
        }
        let dst = ImageResampler::default().resize_bytes(&data, 2, 2, 3, 4, 4).unwrap();

        assert_eq!(at(&dst, 0, 0), Some(fg));
        assert_eq!(at(&dst, 3, 3), Some(fg));
        assert_eq!(at(&dst, 3, 0), Some(bg));
        assert_eq!(at(&dst, 0, 3), Some(bg));

        for y in 0..4 {
            for x in 0..4 {
                let px = at(&dst, x, y).unwrap();
                for c in 0..3 {
                    let (lo, hi) = (fg[c].min(bg[c]), fg[c].max(bg[c]));
                    assert!((lo..=hi).contains(&px[c]));
                }
            }
        }
        // interior samples are blends
        assert_ne!(at(&dst, 1, 1), Some(fg));
        assert_ne!(at(&dst, 1, 1), Some(bg));
    }

    #[test]
    fn test_box_downscale_averages() {
        let src = from_raw(4, 1, 1, vec![0, 100, 200, 250]).unwrap();
        let dst = ImageResampler::default().resize(&src, 2, 1).unwrap();
        assert_eq!(dst.as_bytes(), &[50, 225]);
    }

    #[test]
    fn test_keeps_channels() {
        let src = filled(3, 3, &[10, 20, 30, 40]).unwrap();
        let dst = ImageResampler::default().resize(&src, 7, 2).unwrap();
        assert_eq!(dst.color().channel_count(), 4);
        assert!(dst.as_bytes().chunks_exact(4).all(|px| px == [10, 20, 30, 40]));
    }

    #[test]
    fn test_invalid_dimensions() {
        let r = ImageResampler::default();
        assert!(matches!(
            r.resize_bytes(&[], 0, 4, 3, 8, 8),
            Err(QiError::InvalidDimensions { width: 0, .. })
        ));
        assert!(matches!(
            r.resize_bytes(&[0; 12], 2, 2, 0, 8, 8),
            Err(QiError::InvalidDimensions { channels: 0, .. })
        ));
        assert!(matches!(
            r.resize_bytes(&[0; 11], 2, 2, 3, 8, 8),
            Err(QiError::InvalidDimensions { len: 11, .. })
        ));
        assert!(matches!(
            r.resize(&gradient(2, 2), 0, 8),
            Err(QiError::InvalidDimensions { width: 0, .. })
        ));
        assert!(matches!(
            r.resize_bytes(&[0; 5], 1, 1, 5, 8, 8),
            Err(QiError::UnsupportedChannels(5))
        ));
    }

    #[test]
    fn test_unrepresentable_target_is_allocation_failure() {
        let src = filled(1, 1, &[1, 2, 3]).unwrap();
        assert!(matches!(
            ImageResampler::default().resize(&src, u32::MAX, u32::MAX),
            Err(QiError::AllocationFailure { .. })
        ));
    }

    #[test]
    fn test_wide_samples_rejected() {
        let src = DynamicImage::new_rgb16(2, 2);
        assert!(matches!(
            ImageResampler::default().resize(&src, 4, 4),
            Err(QiError::UnsupportedColor(_))
        ));
    }

    #[test]
    fn test_deterministic() {
        let src = gradient(21, 21);
        let r = ImageResampler::default();
        assert_eq!(r.resize(&src, 150, 150).unwrap(), r.resize(&src, 150, 150).unwrap());
    }
}
