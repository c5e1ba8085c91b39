//! Turns a [`ModuleGrid`] into an [`RgbImage`] with one solid block per module.

use image::{ImageBuffer, RgbImage};
use log::{debug, warn};

use crate::error::{QiError, Result};
use crate::grid::ModuleGrid;
use crate::pixel::{allocate, Rgb};

/// Module pixel size used when nothing else is configured.
pub const DEFAULT_SCALE: u32 = 10;

/// How a grid is painted.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RasterOptions {
    /// Width and height of one module, in pixels.
    pub scale: u32,
    /// Color of dark modules.
    pub foreground: Rgb,
    /// Color of light modules and of the quiet zone.
    pub background: Rgb,
    /// Light modules added on every side of the grid.
    pub border: u32,
    /// Smallest acceptable output side in pixels. When the grid would come out smaller, the
    /// scale is raised until it does not; blocks always stay whole.
    pub min_canvas: Option<u32>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            foreground: Rgb::FOREGROUND,
            background: Rgb::BACKGROUND,
            border: 0,
            min_canvas: None,
        }
    }
}

/// Paints module grids at an integer scale.
///
/// The output of [`ModuleRasterizer::rasterize`] is `(N + 2*border) * S` pixels square, and
/// each `S`×`S` block holds exactly one module's color.
///
/// # Example
///
/// ```rust
/// use qiraster::grid::ModuleGrid;
/// use qiraster::raster::{ModuleRasterizer, RasterOptions};
///
/// let grid = ModuleGrid::from_fn(3, |_, _| true).unwrap();
/// let raster = ModuleRasterizer::new(RasterOptions { scale: 2, ..Default::default() });
/// let img = raster.rasterize(&grid).unwrap();
/// assert_eq!(img.dimensions(), (6, 6));
/// assert!(img.pixels().all(|px| px.0 == [230, 53, 107]));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ModuleRasterizer {
    options: RasterOptions,
}

impl ModuleRasterizer {
    pub fn new(options: RasterOptions) -> Self {
        Self { options }
    }

    /// The module pixel size actually used for a grid of `grid_size` modules, after the
    /// minimum canvas is taken into account.
    ///
    /// # Errors
    ///
    /// [`QiError::InvalidScale`] when the configured scale is zero.
    pub fn effective_scale(&self, grid_size: usize) -> Result<u32> {
        let scale = self.options.scale;
        if scale == 0 {
            return Err(QiError::InvalidScale(scale));
        }
        let Some(min) = self.options.min_canvas else {
            return Ok(scale);
        };
        let side = (grid_size as u64).saturating_add(2 * u64::from(self.options.border)).max(1);
        if side.saturating_mul(u64::from(scale)) >= u64::from(min) {
            return Ok(scale);
        }
        let raised = u64::from(min).div_ceil(side) as u32;
        warn!("raising module scale from {scale} to {raised} to reach a {min}px canvas");
        Ok(raised)
    }

    /// Paints `grid` into a fresh RGB image.
    ///
    /// # Errors
    ///
    /// [`QiError::InvalidScale`] for a zero scale and [`QiError::AllocationFailure`] when the
    /// output does not fit in memory; no partial image is returned.
    pub fn rasterize(&self, grid: &ModuleGrid) -> Result<RgbImage> {
        let scale = self.effective_scale(grid.size())?;
        let border = i64::from(self.options.border);
        let side_modules = (grid.size() as u64) + 2 * u64::from(self.options.border);
        let side = side_modules
            .checked_mul(u64::from(scale))
            .and_then(|px| u32::try_from(px).ok())
            .ok_or(QiError::AllocationFailure {
                width: u32::MAX,
                height: u32::MAX,
                channels: 3,
            })?;
        debug!(
            "rasterizing {0}x{0} modules at scale {scale} into {side}x{side} pixels",
            grid.size()
        );

        let data = allocate(side, side, 3)?;
        let mut img: RgbImage =
            ImageBuffer::from_raw(side, side, data).ok_or(QiError::AllocationFailure {
                width: side,
                height: side,
                channels: 3,
            })?;
        let foreground: image::Rgb<u8> = self.options.foreground.into();
        let background: image::Rgb<u8> = self.options.background.into();
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            let qr_x = i64::from(x / scale) - border;
            let qr_y = i64::from(y / scale) - border;
            *pixel = if grid.get(qr_x, qr_y) {
                foreground
            } else {
                background
            };
        }
        Ok(img)
    }
}
