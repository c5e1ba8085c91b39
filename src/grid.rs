//! Module grids and the contract for whatever produces them.
//!
//! A [`ModuleGrid`] is the square matrix of dark/light modules that a QR encoder emits. This
//! crate never builds one from text itself; an encoder is plugged in through [`GridProducer`],
//! or a grid is built directly with [`ModuleGrid::from_rows`], [`ModuleGrid::from_fn`] or
//! [`ModuleGrid::parse`].

use serde::{Deserialize, Serialize};

use crate::error::{QiError, Result};

/// An immutable square grid of dark (`true`) and light (`false`) modules.
///
/// # Example
///
/// ```rust
/// use qiraster::grid::ModuleGrid;
///
/// let grid = ModuleGrid::from_rows(&[[true, false], [false, true]]).unwrap();
/// assert_eq!(grid.size(), 2);
/// assert!(grid.get(0, 0));
/// assert!(!grid.get(5, 5));
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ModuleGrid {
    size: usize,
    modules: Vec<bool>,
}

impl ModuleGrid {
    /// Builds a grid from rows of modules, top row first.
    ///
    /// # Errors
    ///
    /// Returns [`QiError::EmptyGrid`] for zero rows and [`QiError::InvalidDimensions`] when the
    /// rows do not form a square.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Result<Self> {
        let size = rows.len();
        if size == 0 {
            return Err(QiError::EmptyGrid);
        }
        let mut modules = Vec::with_capacity(size * size);
        for row in rows {
            let row = row.as_ref();
            if row.len() != size {
                return Err(QiError::InvalidDimensions {
                    width: u32::try_from(row.len()).unwrap_or(u32::MAX),
                    height: u32::try_from(size).unwrap_or(u32::MAX),
                    channels: 1,
                    len: row.len(),
                });
            }
            modules.extend_from_slice(row);
        }
        Ok(Self { size, modules })
    }

    /// Builds a `size` × `size` grid by asking `dark(x, y)` for every module.
    ///
    /// # Errors
    ///
    /// Returns [`QiError::EmptyGrid`] when `size` is zero.
    pub fn from_fn(size: usize, mut dark: impl FnMut(usize, usize) -> bool) -> Result<Self> {
        if size == 0 {
            return Err(QiError::EmptyGrid);
        }
        let mut modules = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                modules.push(dark(x, y));
            }
        }
        Ok(Self { size, modules })
    }

    /// Parses a text grid, one row per line.
    ///
    /// `#`, `1`, `X` and `█` are dark; `.`, `0`, `-` and space are light. Blank lines are
    /// skipped, trailing whitespace is not.
    ///
    /// # Errors
    ///
    /// Returns [`QiError::Decode`] on any other character, and the errors of
    /// [`ModuleGrid::from_rows`] when the rows are not square.
    pub fn parse(text: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let row = line
                .chars()
                .map(|c| match c {
                    '#' | '1' | 'X' | '█' => Ok(true),
                    '.' | '0' | '-' | ' ' => Ok(false),
                    other => Err(QiError::Decode(format!(
                        "unexpected module {other:?} on line {}",
                        lineno + 1
                    ))),
                })
                .collect::<Result<Vec<bool>>>()?;
            rows.push(row);
        }
        Self::from_rows(&rows)
    }

    /// The width and height of this grid, in modules.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the module at (x, y). Coordinates outside the grid are light.
    ///
    /// # Arguments
    ///
    /// * `x` - X-coordinate (0 is left).
    /// * `y` - Y-coordinate (0 is top).
    pub fn get(&self, x: i64, y: i64) -> bool {
        let range = 0..self.size as i64;
        range.contains(&x) && range.contains(&y) && self.modules[y as usize * self.size + x as usize]
    }
}

/// Error correction level requested from a grid producer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrCodeEcc {
    /// Tolerates ~7% erroneous codewords.
    #[default]
    Low,
    /// Tolerates ~15% erroneous codewords.
    Medium,
    /// Tolerates ~25% erroneous codewords.
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    High,
}

/// A QR code version (1–40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version from the given number, or `None` outside [1, 40].
    pub const fn new(ver: u8) -> Option<Self> {
        if Version::MIN.0 <= ver && ver <= Version::MAX.0 {
            Some(Self(ver))
        } else {
            None
        }
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Side length in modules of a symbol of this version.
    pub const fn side_len(self) -> usize {
        self.0 as usize * 4 + 17
    }
}

/// Knobs forwarded to a [`GridProducer`] alongside the ECC level.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct EncodeOptions {
    /// Smallest version the producer may pick.
    pub min_version: Version,
    /// Largest version the producer may pick.
    pub max_version: Version,
    /// Fixed mask pattern (0–7), or `None` for automatic selection.
    pub mask: Option<u8>,
    /// Raise the ECC level when it does not increase the version.
    pub boost_ecl: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            min_version: Version::MIN,
            max_version: Version::MAX,
            mask: None,
            boost_ecl: true,
        }
    }
}

impl EncodeOptions {
    /// Checks the option ranges before any encoder sees them.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingFailure::InvalidParameter`] for an inverted version range or a mask
    /// above 7.
    pub fn validate(&self) -> std::result::Result<(), EncodingFailure> {
        if self.min_version > self.max_version {
            return Err(EncodingFailure::InvalidParameter(format!(
                "min version {} above max version {}",
                self.min_version.value(),
                self.max_version.value()
            )));
        }
        if let Some(mask) = self.mask {
            if mask > 7 {
                return Err(EncodingFailure::InvalidParameter(format!(
                    "mask {mask} out of range 0..=7"
                )));
            }
        }
        Ok(())
    }
}

/// Why a grid producer refused to build a symbol.
///
/// Ways to handle `SegmentTooLong` and `DataOverCapacity`:
///
/// - Decrease the error correction level.
/// - Increase the max version.
/// - Shorten the text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingFailure {
    /// A segment is too long for the chosen mode.
    #[error("segment too long")]
    SegmentTooLong,
    /// Data length exceeds capacity.
    #[error("data length = {0} bits, max capacity = {1} bits")]
    DataOverCapacity(usize, usize),
    /// A parameter was out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Anything that turns text into a module grid, typically a QR encoder.
///
/// # Example
///
/// ```rust
/// use qiraster::grid::{EncodeOptions, EncodingFailure, GridProducer, ModuleGrid, QrCodeEcc};
///
/// struct Checkerboard;
///
/// impl GridProducer for Checkerboard {
///     fn encode(&self, text: &str, _ecc: QrCodeEcc, _options: &EncodeOptions)
///         -> Result<ModuleGrid, EncodingFailure>
///     {
///         ModuleGrid::from_fn(text.len().max(1), |x, y| (x + y) % 2 == 0)
///             .map_err(|e| EncodingFailure::InvalidParameter(e.to_string()))
///     }
/// }
///
/// let grid = Checkerboard.encode("abc", QrCodeEcc::Low, &EncodeOptions::default()).unwrap();
/// assert_eq!(grid.size(), 3);
/// ```
pub trait GridProducer {
    /// Encodes `text` at the given ECC level.
    ///
    /// # Errors
    ///
    /// Returns an [`EncodingFailure`] when the text does not fit or a parameter is invalid.
    fn encode(
        &self,
        text: &str,
        ecc: QrCodeEcc,
        options: &EncodeOptions,
    ) -> std::result::Result<ModuleGrid, EncodingFailure>;
}

impl<F> GridProducer for F
where
    F: Fn(&str, QrCodeEcc, &EncodeOptions) -> std::result::Result<ModuleGrid, EncodingFailure>,
{
    fn encode(
        &self,
        text: &str,
        ecc: QrCodeEcc,
        options: &EncodeOptions,
    ) -> std::result::Result<ModuleGrid, EncodingFailure> {
        self(text, ecc, options)
    }
}
