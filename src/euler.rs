//! Euler angle conventions in render space
//!
//! Render space is right-handed and Y-up, with the airframe nose along -Z.
//! Angles are degrees:
//!
//! - **yaw** rotates about +Y (up)
//! - **pitch** is positive nose-down, a rotation about +X by `-pitch`
//! - **roll** rotates about +Z
//!
//! The order the three rotations are composed in decides which attitude a
//! triple describes, so it is carried as an explicit [`EulerOrder`] value.

use core::fmt;

use nalgebra::{Matrix3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::math::{DEG_TO_RAD, QuaternionExt, RAD_TO_DEG};

/// Sine of the pitch beyond which yaw and roll share one degree of freedom
const GIMBAL_LOCK_THRESHOLD: f64 = 0.999_999_9;

/// Roll, pitch and yaw in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EulerAngles {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl EulerAngles {
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    pub fn is_finite(&self) -> bool {
        self.roll.is_finite() && self.pitch.is_finite() && self.yaw.is_finite()
    }
}

impl fmt::Display for EulerAngles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R:{:>6.1} P:{:>6.1} Y:{:>6.1}", self.roll, self.pitch, self.yaw)
    }
}

/// Composition order of the yaw, pitch and roll rotations.
///
/// # Example
/// ```
/// use quad_attitude::{EulerAngles, EulerOrder};
///
/// let order = EulerOrder::default();
/// let angles = EulerAngles::new(10.0, -20.0, 135.0);
/// let recovered = order.decompose(&order.compose(angles));
///
/// assert!((recovered.roll - 10.0).abs() < 1e-9);
/// assert!((recovered.pitch + 20.0).abs() < 1e-9);
/// assert!((recovered.yaw - 135.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EulerOrder {
    /// `Ry(yaw) · Rx(-pitch) · Rz(roll)`: yaw about render-up first, then
    /// pitch about the yawed right axis, then roll about the resulting
    /// forward axis.
    #[default]
    YawPitchRoll,
    /// `Rz(roll) · Rx(-pitch) · Ry(yaw)`: the same three axes taken in the
    /// opposite order.
    RollPitchYaw,
}

impl EulerOrder {
    /// Build the render-space rotation for an angle triple
    pub fn compose(&self, angles: EulerAngles) -> UnitQuaternion<f64> {
        let yaw = UnitQuaternion::from_yaw(angles.yaw * DEG_TO_RAD);
        let pitch = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -angles.pitch * DEG_TO_RAD);
        let roll = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angles.roll * DEG_TO_RAD);

        let q = match self {
            EulerOrder::YawPitchRoll => yaw * pitch * roll,
            EulerOrder::RollPitchYaw => roll * pitch * yaw,
        };
        q.renormalized()
    }

    /// Recover the angle triple for a rotation.
    ///
    /// Exact inverse of [`compose`](Self::compose) for |pitch| < 90°. At gimbal
    /// lock roll is reported as 0 and the remaining rotation is folded into yaw.
    pub fn decompose(&self, q: &UnitQuaternion<f64>) -> EulerAngles {
        let rotation = q.to_rotation_matrix();
        let m: &Matrix3<f64> = rotation.matrix();

        // (x, y, z) are the raw rotation angles about each render axis
        let (x, y, z) = match self {
            EulerOrder::YawPitchRoll => {
                let sin_x = (-m[(1, 2)]).clamp(-1.0, 1.0);
                let x = sin_x.asin();
                if sin_x.abs() < GIMBAL_LOCK_THRESHOLD {
                    (x, m[(0, 2)].atan2(m[(2, 2)]), m[(1, 0)].atan2(m[(1, 1)]))
                } else {
                    (x, (-m[(2, 0)]).atan2(m[(0, 0)]), 0.0)
                }
            }
            EulerOrder::RollPitchYaw => {
                let sin_x = m[(2, 1)].clamp(-1.0, 1.0);
                let x = sin_x.asin();
                if sin_x.abs() < GIMBAL_LOCK_THRESHOLD {
                    (x, (-m[(2, 0)]).atan2(m[(2, 2)]), (-m[(0, 1)]).atan2(m[(1, 1)]))
                } else {
                    (x, m[(0, 2)].atan2(m[(0, 0)]), 0.0)
                }
            }
        };

        EulerAngles::new(z * RAD_TO_DEG, -x * RAD_TO_DEG, y * RAD_TO_DEG)
    }

    /// Apply a pure render-vertical rotation so that only the decomposed yaw
    /// changes.
    ///
    /// Yaw is the outermost rotation for [`YawPitchRoll`](Self::YawPitchRoll)
    /// and the innermost for [`RollPitchYaw`](Self::RollPitchYaw); the yaw
    /// rotation is composed on that side of the product.
    pub fn apply_yaw(&self, q: &UnitQuaternion<f64>, radians: f64) -> UnitQuaternion<f64> {
        let yaw = UnitQuaternion::from_yaw(radians);
        let rotated = match self {
            EulerOrder::YawPitchRoll => yaw * q,
            EulerOrder::RollPitchYaw => q * yaw,
        };
        rotated.renormalized()
    }
}
