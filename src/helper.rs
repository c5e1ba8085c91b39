use std::path::Path;

use image::DynamicImage;
use log::debug;

use crate::codec::ImageCodec;
use crate::config::RenderConfig;
use crate::error::Result;
use crate::grid::{EncodeOptions, GridProducer, ModuleGrid};
use crate::raster::ModuleRasterizer;
use crate::resample::{Filter, ImageResampler};

/*---- Utilities ----*/

/// Returns the grid as text, two characters per module, surrounded by `border` light modules.
/// Rows end with `\n` on every platform.
pub fn grid_to_string(grid: &ModuleGrid, border: i64) -> String {
    let size = grid.size() as i64;
    let mut result = String::new();
    for y in -border..size + border {
        for x in -border..size + border {
            let c = if grid.get(x, y) { '█' } else { ' ' };
            result.push(c);
            result.push(c);
        }
        result.push('\n');
    }
    result
}

/// Paints `grid` as configured and resamples it when the config names a target size.
///
/// # Errors
///
/// Whatever the rasterizer or resampler reports; the pipeline stops at the first failure.
///
/// # Example
///
/// ```rust
/// use qiraster::config::RenderConfig;
/// use qiraster::grid::ModuleGrid;
/// use qiraster::helper::render_grid;
///
/// let grid = ModuleGrid::from_fn(21, |x, y| (x * y) % 3 == 0).unwrap();
/// let config = RenderConfig { target_width: Some(150), target_height: Some(150), ..Default::default() };
/// let img = render_grid(&grid, &config).unwrap();
/// assert_eq!((img.width(), img.height()), (150, 150));
/// ```
pub fn render_grid(grid: &ModuleGrid, config: &RenderConfig) -> Result<DynamicImage> {
    config.validate()?;
    let native =
        DynamicImage::ImageRgb8(ModuleRasterizer::new(config.raster_options()).rasterize(grid)?);
    match config.target() {
        Some((width, height)) => {
            debug!(
                "resizing {}x{} raster to {width}x{height}",
                native.width(),
                native.height()
            );
            ImageResampler::new(config.filter).resize(&native, width, height)
        }
        None => Ok(native),
    }
}

/// Renders `grid` and stores it at `path` through `codec`.
///
/// # Errors
///
/// Rendering or codec errors. No file is written unless the image was fully produced.
pub fn render_to_file(
    grid: &ModuleGrid,
    config: &RenderConfig,
    codec: &dyn ImageCodec,
    path: &Path,
) -> Result<()> {
    let img = render_grid(grid, config)?;
    codec.save(&img, path)
}

/// Loads the image at `input`, resizes it to `width` × `height` and writes it to `output`,
/// keeping its channel count.
///
/// # Errors
///
/// Codec, I/O or resampling errors.
pub fn resize_file(
    codec: &dyn ImageCodec,
    input: &Path,
    output: &Path,
    width: u32,
    height: u32,
    filter: Filter,
) -> Result<()> {
    let src = codec.load(input)?;
    let dst = ImageResampler::new(filter).resize(&src, width, height)?;
    codec.save(&dst, output)
}

/// Encodes `text` with `producer`, then renders and stores the result like
/// [`render_to_file`].
///
/// # Errors
///
/// [`crate::QiError::Encoding`] when the producer rejects the text or `options`, otherwise as
/// [`render_to_file`].
pub fn generate_image<P: GridProducer + ?Sized>(
    producer: &P,
    text: &str,
    options: &EncodeOptions,
    config: &RenderConfig,
    codec: &dyn ImageCodec,
    path: &Path,
) -> Result<()> {
    options.validate()?;
    let grid = producer.encode(text, config.ecc, options)?;
    debug!("producer returned a {0}x{0} grid", grid.size());
    render_to_file(&grid, config, codec, path)
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::PngCodec;
    use crate::error::QiError;
    use crate::grid::{EncodingFailure, QrCodeEcc};
    use crate::pixel::Rgb;

    #[test]
    fn test_grid_to_string() {
        let grid = ModuleGrid::from_rows(&[[true, false], [false, true]]).unwrap();
        assert_eq!(grid_to_string(&grid, 0), "██  \n  ██\n");
        let bordered = grid_to_string(&grid, 1);
        assert_eq!(bordered.lines().count(), 4);
        assert!(bordered.lines().all(|l| l.chars().count() == 8));
    }

    #[test]
    fn test_render_grid_native_size() {
        let grid = ModuleGrid::from_fn(3, |_, _| true).unwrap();
        let config = RenderConfig { scale: 2, ..Default::default() };
        let img = render_grid(&grid, &config).unwrap();
        assert_eq!((img.width(), img.height()), (6, 6));
        assert!(img.as_bytes().chunks_exact(3).all(|px| px == Rgb::FOREGROUND.0));
    }

    #[test]
    fn test_render_grid_rejects_invalid_config() {
        let grid = ModuleGrid::from_fn(3, |_, _| true).unwrap();
        let config = RenderConfig { target_width: Some(10), ..Default::default() };
        assert!(matches!(render_grid(&grid, &config), Err(QiError::Config(_))));
    }

    #[test]
    fn test_generate_image_surfaces_producer_failure() {
        let producer = |_: &str, _: QrCodeEcc, _: &EncodeOptions| {
            Err::<ModuleGrid, _>(EncodingFailure::DataOverCapacity(24000, 23648))
        };
        let path = Path::new("never-written.png");
        let result = generate_image(
            &producer,
            "too much",
            &EncodeOptions::default(),
            &RenderConfig::default(),
            &PngCodec,
            path,
        );
        assert!(matches!(
            result,
            Err(QiError::Encoding(EncodingFailure::DataOverCapacity(24000, 23648)))
        ));
        assert!(!path.exists());
    }
}
