use thiserror::Error;

use crate::grid::EncodingFailure;

/// Errors produced anywhere in the grid → raster → resample → codec pipeline.
#[derive(Debug, Error)]
pub enum QiError {
    /// The pixel buffer for the requested dimensions could not be obtained.
    #[error("cannot allocate a {width}x{height}x{channels} pixel buffer")]
    AllocationFailure {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
        /// Requested channel count.
        channels: u8,
    },

    /// Zero sizes, zero channels, or a byte length that does not match them.
    #[error("invalid dimensions: {width}x{height}x{channels} with {len} bytes")]
    InvalidDimensions {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Channel count.
        channels: u8,
        /// Length of the backing byte sequence.
        len: usize,
    },

    /// A rasterizer scale factor of zero.
    #[error("scale factor must be at least 1, got {0}")]
    InvalidScale(u32),

    /// A module grid with side length zero.
    #[error("module grid is empty")]
    EmptyGrid,

    /// The codec could not persist the buffer.
    #[error("image encode failed: {0}")]
    Encode(String),

    /// The codec could not parse the bytes.
    #[error("image decode failed: {0}")]
    Decode(String),

    /// No 8-bit pixel layout exists for this channel count.
    #[error("unsupported channel count: {0}")]
    UnsupportedChannels(u8),

    /// The image is not 8 bits per channel.
    #[error("unsupported pixel layout: {0}")]
    UnsupportedColor(String),

    /// The resize backend refused the buffers.
    #[error("resize failed: {0}")]
    Resize(String),

    /// The grid producer rejected the text or its parameters.
    #[error("grid encoding failed: {0}")]
    Encoding(#[from] EncodingFailure),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, QiError>;
