//! TOML configuration for a kernel session
//!
//! Every section and field is optional; omitted values take the ship
//! defaults. A complete file looks like:
//!
//! ```toml
//! [fusion]
//! euler_order = "yaw_pitch_roll"
//! remap = { x = "+x", y = "+z", z = "-y" }
//!
//! [mixer]
//! hover_throttle = 55.0
//! pitch_gain = 0.8
//! roll_gain = 0.8
//! full_scale_deg = 30.0
//! authority = 20.0
//! max_rpm = 4000.0
//!
//! [smoothing.mode.time_constant]
//! seconds = 0.0747
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{FusionSettings, MixerSettings, SmoothingSettings};

/// All tunables for one [`Session`](crate::Session).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub fusion: FusionSettings,
    pub mixer: MixerSettings,
    pub smoothing: SmoothingSettings,
}

impl KernelConfig {
    /// Parse and validate a TOML document
    ///
    /// # Example
    /// ```
    /// use quad_attitude::{AxisRemap, KernelConfig};
    ///
    /// let config = KernelConfig::from_toml_str(
    ///     r#"
    ///     [mixer]
    ///     hover_throttle = 40.0
    ///     "#,
    /// )
    /// .unwrap();
    /// assert_eq!(config.mixer.hover_throttle, 40.0);
    /// assert_eq!(config.fusion.remap, AxisRemap::Z_UP_TO_Y_UP);
    ///
    /// assert!(KernelConfig::from_toml_str("[mixer]\nhover_throttle = 140.0").is_err());
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: KernelConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(?path, "loaded kernel config");
        Ok(config)
    }

    /// Check every section against its allowed ranges
    ///
    /// Axis remaps are checked when they are built, so an invalid one never
    /// reaches this point.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mixer.validate()?;
        self.smoothing.validate()
    }
}
