//! # qiraster
//!
//! A Rust library for painting QR module grids into RGB images and resampling them to any size.
//!
//! `qiraster` takes the square grid of dark and light modules that a QR encoder produces and turns
//! it into an `image` buffer, one solid block per module. The image can then be resized with a
//! separable `fast_image_resize` filter (linear when enlarging, area averaging when shrinking) and stored as PNG. The
//! encoder itself is not part of this crate; plug one in through [`grid::GridProducer`].
//!
//! ## Features
//!
//! - Rasterize any square grid at an integer scale, with custom colors and an optional quiet zone.
//! - Optionally enforce a minimum canvas size by raising the module scale.
//! - Resize 8-bit images with 1 to 4 channels to arbitrary dimensions.
//! - Load and store lossless PNG through the [`codec::ImageCodec`] trait.
//! - Configure the whole pipeline from a TOML file.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qiraster = "0.1" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! Paint a grid and resize it to 150×150:
//!
//! ```rust
//! use image::DynamicImage;
//! use qiraster::grid::ModuleGrid;
//! use qiraster::raster::{ModuleRasterizer, RasterOptions};
//! use qiraster::resample::ImageResampler;
//!
//! let grid = ModuleGrid::parse("#.#\n.#.\n#.#\n").unwrap();
//! let native = ModuleRasterizer::new(RasterOptions::default()).rasterize(&grid).unwrap();
//! assert_eq!(native.dimensions(), (30, 30));
//!
//! let native = DynamicImage::ImageRgb8(native);
//! let resized = ImageResampler::default().resize(&native, 150, 150).unwrap();
//! assert_eq!(resized.as_bytes().len(), 150 * 150 * 3);
//! ```
//!
//! Store it as PNG:
//!
//! ```rust,no_run
//! use std::path::Path;
//! use qiraster::codec::PngCodec;
//! use qiraster::config::RenderConfig;
//! use qiraster::grid::ModuleGrid;
//! use qiraster::helper::render_to_file;
//!
//! let grid = ModuleGrid::parse("#.#\n.#.\n#.#\n").unwrap();
//! render_to_file(&grid, &RenderConfig::default(), &PngCodec, Path::new("output/qr.png")).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`grid`]: Module grids and the grid producer contract.
//! - [`pixel`]: Colors and raw bytes to `image` buffers.
//! - [`raster`]: Grid to pixel buffer.
//! - [`resample`]: Pixel buffer to any size.
//! - [`codec`]: PNG encoding and decoding.
//! - [`config`]: TOML configuration.
//! - [`helper`]: Whole-pipeline conveniences.

#![forbid(unsafe_code)]

pub mod codec;
pub mod config;
pub mod error;
pub mod grid;
pub mod helper;
pub mod pixel;
pub mod raster;
pub mod resample;

pub use error::{QiError, Result};
