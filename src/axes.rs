//! Sensor-to-render axis remapping
//!
//! The sensor's native frame depends on how the board is mounted, so the
//! mapping into render space is a configuration value rather than a literal.
//! A remap is a signed permutation: each render axis takes exactly one sensor
//! axis, optionally negated.
//!
//! # Example
//! ```
//! use nalgebra::Vector3;
//! use quad_attitude::AxisRemap;
//!
//! // Ship default: render.x = sensor.x, render.y = sensor.z, render.z = -sensor.y
//! let remap = AxisRemap::Z_UP_TO_Y_UP;
//! let render = remap.remap_vector(Vector3::new(1.0, 2.0, 3.0));
//!
//! assert_eq!(render, Vector3::new(1.0, 3.0, -2.0));
//! ```

use nalgebra::{Matrix3, Quaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One sensor axis with a sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignedAxis {
    #[serde(rename = "+x")]
    PosX,
    #[serde(rename = "-x")]
    NegX,
    #[serde(rename = "+y")]
    PosY,
    #[serde(rename = "-y")]
    NegY,
    #[serde(rename = "+z")]
    PosZ,
    #[serde(rename = "-z")]
    NegZ,
}

impl SignedAxis {
    /// Index of the sensor axis (0 = x, 1 = y, 2 = z)
    pub fn index(self) -> usize {
        match self {
            SignedAxis::PosX | SignedAxis::NegX => 0,
            SignedAxis::PosY | SignedAxis::NegY => 1,
            SignedAxis::PosZ | SignedAxis::NegZ => 2,
        }
    }

    pub fn sign(self) -> f64 {
        match self {
            SignedAxis::PosX | SignedAxis::PosY | SignedAxis::PosZ => 1.0,
            SignedAxis::NegX | SignedAxis::NegY | SignedAxis::NegZ => -1.0,
        }
    }

    fn pick(self, sensor: &Vector3<f64>) -> f64 {
        self.sign() * sensor[self.index()]
    }
}

/// Signed permutation taking sensor axes to render axes.
///
/// Field `x` names the sensor axis that becomes render X, and so on.
///
/// # Example
/// ```
/// use quad_attitude::{AxisRemap, SignedAxis};
///
/// // Sensor mounted with its Y axis pointing up
/// let remap = AxisRemap::new(SignedAxis::PosX, SignedAxis::PosY, SignedAxis::PosZ).unwrap();
/// assert_eq!(remap, AxisRemap::IDENTITY);
///
/// // Reusing a sensor axis is not a permutation
/// assert!(AxisRemap::new(SignedAxis::PosX, SignedAxis::NegX, SignedAxis::PosZ).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRemap", into = "RawRemap")]
pub struct AxisRemap {
    x: SignedAxis,
    y: SignedAxis,
    z: SignedAxis,
}

impl AxisRemap {
    /// No remapping; sensor and render frames coincide.
    pub const IDENTITY: AxisRemap = AxisRemap {
        x: SignedAxis::PosX,
        y: SignedAxis::PosY,
        z: SignedAxis::PosZ,
    };

    /// Z-up sensor into the Y-up render frame: x←x, y←z, z←−y.
    pub const Z_UP_TO_Y_UP: AxisRemap = AxisRemap {
        x: SignedAxis::PosX,
        y: SignedAxis::PosZ,
        z: SignedAxis::NegY,
    };

    pub fn new(x: SignedAxis, y: SignedAxis, z: SignedAxis) -> Result<Self, ConfigError> {
        let mut seen = [false; 3];
        for axis in [x, y, z] {
            let index = axis.index();
            if seen[index] {
                return Err(ConfigError::DuplicateAxis(['x', 'y', 'z'][index]));
            }
            seen[index] = true;
        }
        Ok(Self { x, y, z })
    }

    pub fn axes(&self) -> [SignedAxis; 3] {
        [self.x, self.y, self.z]
    }

    /// The 3×3 signed-permutation matrix `M` with `render = M · sensor`
    pub fn matrix(&self) -> Matrix3<f64> {
        let mut m = Matrix3::zeros();
        for (row, axis) in self.axes().into_iter().enumerate() {
            m[(row, axis.index())] = axis.sign();
        }
        m
    }

    /// +1 for a proper rotation, -1 for a mirrored mount
    pub fn determinant(&self) -> f64 {
        self.matrix().determinant()
    }

    pub fn remap_vector(&self, sensor: Vector3<f64>) -> Vector3<f64> {
        Vector3::new(self.x.pick(&sensor), self.y.pick(&sensor), self.z.pick(&sensor))
    }

    /// Express a sensor-frame rotation in render axes.
    ///
    /// The vector part follows the axes; `w` is untouched. A rotation axis is a
    /// pseudovector, so a mirrored remap also flips its sign to keep the result
    /// a proper rotation.
    pub fn remap_quaternion(&self, sensor: Quaternion<f64>) -> Quaternion<f64> {
        let v = self.remap_vector(sensor.imag()) * self.determinant();
        Quaternion::from_parts(sensor.w, v)
    }
}

impl Default for AxisRemap {
    fn default() -> Self {
        Self::Z_UP_TO_Y_UP
    }
}

#[derive(Serialize, Deserialize)]
struct RawRemap {
    x: SignedAxis,
    y: SignedAxis,
    z: SignedAxis,
}

impl TryFrom<RawRemap> for AxisRemap {
    type Error = ConfigError;

    fn try_from(raw: RawRemap) -> Result<Self, Self::Error> {
        AxisRemap::new(raw.x, raw.y, raw.z)
    }
}

impl From<AxisRemap> for RawRemap {
    fn from(remap: AxisRemap) -> Self {
        RawRemap {
            x: remap.x,
            y: remap.y,
            z: remap.z,
        }
    }
}
