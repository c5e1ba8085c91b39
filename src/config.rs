//! Render settings, loadable from TOML.
//!
//! [`RenderConfig`] gathers everything the pipeline needs besides the grid itself: raster scale,
//! colors, quiet zone, optional resize target and filter, and the error correction level handed
//! to the grid producer. Unknown keys are rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QiError, Result};
use crate::grid::QrCodeEcc;
use crate::pixel::Rgb;
use crate::raster::{RasterOptions, DEFAULT_SCALE};
use crate::resample::Filter;

/// Everything needed to turn a grid into a stored image, loadable from TOML.
///
/// Missing keys take their defaults.
///
/// # Example
///
/// ```rust
/// use qiraster::config::RenderConfig;
///
/// let config = RenderConfig::from_toml_str("scale = 4\ntarget_width = 150\ntarget_height = 150").unwrap();
/// assert_eq!(config.scale, 4);
/// assert_eq!(config.target(), Some((150, 150)));
/// assert_eq!(config.foreground.0, [230, 53, 107]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Pixels per module.
    pub scale: u32,
    pub foreground: Rgb,
    pub background: Rgb,
    /// Quiet-zone width in modules.
    pub border: u32,
    /// Minimum output side in pixels before resampling.
    pub min_canvas: Option<u32>,
    pub target_width: Option<u32>,
    pub target_height: Option<u32>,
    pub filter: Filter,
    /// Handed to the grid producer.
    pub ecc: QrCodeEcc,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            foreground: Rgb::FOREGROUND,
            background: Rgb::BACKGROUND,
            border: 0,
            min_canvas: None,
            target_width: None,
            target_height: None,
            filter: Filter::Auto,
            ecc: QrCodeEcc::Low,
        }
    }
}

impl RenderConfig {
    /// Loads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`QiError::Io`] if the file cannot be read, [`QiError::Config`] if it does not parse or
    /// fails [`RenderConfig::validate`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| QiError::Config(format!("{}: {e}", path.display())))
    }

    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// [`QiError::Config`].
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| QiError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises back to TOML.
    ///
    /// # Errors
    ///
    /// [`QiError::Config`] if serialisation fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| QiError::Config(e.to_string()))
    }

    /// Rejects values the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// [`QiError::Config`] for a zero scale, a zero target side or only one target side.
    pub fn validate(&self) -> Result<()> {
        if self.scale == 0 {
            return Err(QiError::Config("scale must be at least 1".into()));
        }
        match (self.target_width, self.target_height) {
            (Some(0), _) | (_, Some(0)) => {
                Err(QiError::Config("target size must be at least 1".into()))
            }
            (Some(_), None) | (None, Some(_)) => Err(QiError::Config(
                "target_width and target_height must be set together".into(),
            )),
            _ => Ok(()),
        }
    }

    /// The resample target, if any.
    pub fn target(&self) -> Option<(u32, u32)> {
        self.target_width.zip(self.target_height)
    }

    pub fn raster_options(&self) -> RasterOptions {
        RasterOptions {
            scale: self.scale,
            foreground: self.foreground,
            background: self.background,
            border: self.border,
            min_canvas: self.min_canvas,
        }
    }
}
