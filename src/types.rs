//! Core types and settings for the attitude kernel

use nalgebra::{Quaternion, UnitQuaternion};
use serde::{Deserialize, Serialize};

use crate::axes::AxisRemap;
use crate::error::ConfigError;
use crate::euler::{EulerAngles, EulerOrder};

/// Nominal render cadence in seconds (60 Hz)
pub const NOMINAL_TICK: f64 = 1.0 / 60.0;

/// One inbound orientation reading.
///
/// Exactly one variant arrives per packet. Euler angles are degrees in the
/// render convention described in [`crate::euler`]; quaternions are in the
/// sensor's native frame and are remapped during fusion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrientationSample {
    /// Legacy roll/pitch/yaw triple
    Euler(EulerAngles),
    /// Sensor-frame quaternion with optional fusion quality in `0..=1`
    Quaternion {
        quaternion: Quaternion<f64>,
        quality: Option<f64>,
    },
}

impl OrientationSample {
    pub fn euler(roll: f64, pitch: f64, yaw: f64) -> Self {
        OrientationSample::Euler(EulerAngles::new(roll, pitch, yaw))
    }

    /// Quaternion sample from components in `x, y, z, w` order
    pub fn quaternion(x: f64, y: f64, z: f64, w: f64, quality: Option<f64>) -> Self {
        OrientationSample::Quaternion {
            quaternion: Quaternion::new(w, x, y, z),
            quality,
        }
    }

    pub fn source(&self) -> SampleSource {
        match self {
            OrientationSample::Euler(_) => SampleSource::Euler,
            OrientationSample::Quaternion { .. } => SampleSource::Quaternion,
        }
    }
}

/// Which input path produced the latest orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSource {
    Euler,
    Quaternion,
}

/// Unit orientation in render space plus its Euler decomposition.
///
/// The quaternion is renormalised whenever one of these is built, so its norm
/// stays within floating-point epsilon of 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedOrientation {
    pub quaternion: UnitQuaternion<f64>,
    /// Decomposition in the fusion's configured [`EulerOrder`]
    pub euler: EulerAngles,
    /// Fusion quality forwarded from the sample, if it carried one
    pub quality: Option<f64>,
}

impl FusedOrientation {
    pub fn from_quaternion(quaternion: UnitQuaternion<f64>, order: EulerOrder, quality: Option<f64>) -> Self {
        Self {
            quaternion,
            euler: order.decompose(&quaternion),
            quality,
        }
    }
}

impl Default for FusedOrientation {
    fn default() -> Self {
        Self {
            quaternion: UnitQuaternion::identity(),
            euler: EulerAngles::default(),
            quality: None,
        }
    }
}

/// Link state reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    Connected,
    #[default]
    Disconnected,
}

impl Connectivity {
    pub fn is_connected(&self) -> bool {
        matches!(self, Connectivity::Connected)
    }
}

/// Orientation fusion settings
///
/// # Example
/// ```
/// use quad_attitude::{AxisRemap, EulerOrder, FusionSettings};
///
/// let settings = FusionSettings {
///     remap: AxisRemap::IDENTITY,     // sensor already reports Y-up
///     euler_order: EulerOrder::YawPitchRoll,
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionSettings {
    /// Rotation order for composing and decomposing Euler angles
    pub euler_order: EulerOrder,
    /// Sensor-to-render axis mapping for quaternion samples
    pub remap: AxisRemap,
}

/// Quad-X mixer settings
///
/// # Example
/// ```
/// use quad_attitude::MixerSettings;
///
/// let settings = MixerSettings {
///     hover_throttle: 50.0,
///     pitch_gain: 1.0,
///     ..Default::default()
/// };
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerSettings {
    /// Per-rotor throttle percentage with no pitch or roll command
    pub hover_throttle: f64,
    /// Scale applied to the normalised pitch input
    pub pitch_gain: f64,
    /// Scale applied to the normalised roll input
    pub roll_gain: f64,
    /// Tilt in degrees that saturates the normalised input at ±1
    pub full_scale_deg: f64,
    /// Percentage points a fully saturated, unit-gain input adds or removes
    pub authority: f64,
    /// Rotor speed at 100 % throttle, for illustrative RPM readouts
    pub max_rpm: f64,
}

impl Default for MixerSettings {
    fn default() -> Self {
        Self {
            hover_throttle: 55.0,
            pitch_gain: 0.8,
            roll_gain: 0.8,
            full_scale_deg: 30.0,
            authority: 20.0,
            max_rpm: 4000.0,
        }
    }
}

impl MixerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.hover_throttle) {
            return Err(ConfigError::Invalid {
                field: "mixer.hover_throttle",
                reason: "must lie in 0..=100",
            });
        }
        for (field, gain) in [("mixer.pitch_gain", self.pitch_gain), ("mixer.roll_gain", self.roll_gain)] {
            if !gain.is_finite() || gain < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be finite and non-negative",
                });
            }
        }
        if !(self.full_scale_deg.is_finite() && self.full_scale_deg > 0.0) {
            return Err(ConfigError::Invalid {
                field: "mixer.full_scale_deg",
                reason: "must be positive",
            });
        }
        if !(self.authority.is_finite() && self.authority >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "mixer.authority",
                reason: "must be finite and non-negative",
            });
        }
        if !(self.max_rpm.is_finite() && self.max_rpm >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "mixer.max_rpm",
                reason: "must be finite and non-negative",
            });
        }
        Ok(())
    }
}

/// How the legacy Euler smoother derives its per-tick coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingMode {
    /// Fixed fraction of the remaining error closed on every tick,
    /// regardless of how long the tick took
    PerTick { coefficient: f64 },
    /// Exponential approach with the given e-folding time in seconds; the
    /// coefficient is `1 - exp(-elapsed / seconds)`
    TimeConstant { seconds: f64 },
}

impl SmoothingMode {
    /// Per-frame coefficient of the frame-coupled legacy viewer
    pub const LEGACY_COEFFICIENT: f64 = 0.2;

    /// Time constant that reproduces [`LEGACY_COEFFICIENT`](Self::LEGACY_COEFFICIENT)
    /// at the nominal 60 Hz cadence
    pub fn legacy_equivalent() -> Self {
        SmoothingMode::TimeConstant {
            seconds: -NOMINAL_TICK / (1.0 - Self::LEGACY_COEFFICIENT).ln(),
        }
    }
}

impl Default for SmoothingMode {
    fn default() -> Self {
        Self::legacy_equivalent()
    }
}

/// Legacy Euler smoothing settings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingSettings {
    pub mode: SmoothingMode,
}

impl SmoothingSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.mode {
            SmoothingMode::PerTick { coefficient } if !(coefficient > 0.0 && coefficient <= 1.0) => {
                Err(ConfigError::Invalid {
                    field: "smoothing.mode.per_tick.coefficient",
                    reason: "must lie in (0, 1]",
                })
            }
            SmoothingMode::TimeConstant { seconds } if !(seconds.is_finite() && seconds > 0.0) => {
                Err(ConfigError::Invalid {
                    field: "smoothing.mode.time_constant.seconds",
                    reason: "must be positive",
                })
            }
            _ => Ok(()),
        }
    }
}
