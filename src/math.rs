//! Mathematical utilities and nalgebra extensions

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

use crate::error::SampleError;

/// Mathematical constants
pub const DEG_TO_RAD: f64 = core::f64::consts::PI / 180.0;
pub const RAD_TO_DEG: f64 = 180.0 / core::f64::consts::PI;

/// Quaternions whose largest component is below this are treated as degenerate
const MIN_NORM: f64 = 1e-12;

/// Extension trait for UnitQuaternion operations
pub trait QuaternionExt {
    /// Pure rotation about the render vertical (+Y) axis
    fn from_yaw(radians: f64) -> UnitQuaternion<f64>;

    /// Divide by the current norm again, removing accumulated drift
    fn renormalized(&self) -> UnitQuaternion<f64>;

    /// Absolute distance of the underlying norm from 1
    fn norm_error(&self) -> f64;
}

impl QuaternionExt for UnitQuaternion<f64> {
    fn from_yaw(radians: f64) -> UnitQuaternion<f64> {
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), radians)
    }

    fn renormalized(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::new_normalize(self.into_inner())
    }

    fn norm_error(&self) -> f64 {
        (self.as_ref().norm() - 1.0).abs()
    }
}

/// Normalise a raw quaternion, rejecting non-finite or zero-length input
pub fn try_normalize(quaternion: Quaternion<f64>) -> Result<UnitQuaternion<f64>, SampleError> {
    if !quaternion.coords.iter().all(|c| c.is_finite()) {
        return Err(SampleError::NonFinite);
    }
    let largest = quaternion.coords.amax();
    if largest < MIN_NORM {
        return Err(SampleError::ZeroQuaternion);
    }
    // Scale first so the norm cannot overflow for huge finite components
    Ok(UnitQuaternion::new_normalize(quaternion / largest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaw_rotates_forward_towards_left() {
        let q = UnitQuaternion::from_yaw(90.0 * DEG_TO_RAD);
        // -Z is forward in render space; +90° about +Y turns it to -X
        let forward = q * Vector3::new(0.0, 0.0, -1.0);
        assert!((forward - Vector3::new(-1.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_try_normalize_scales_to_unit_length() {
        let q = try_normalize(Quaternion::new(2.0, 0.0, 0.0, 0.0)).unwrap();
        assert!(q.norm_error() < 1e-12);
        assert_eq!(q.w, 1.0);
    }

    #[test]
    fn test_try_normalize_rejects_degenerate_input() {
        assert_eq!(
            try_normalize(Quaternion::new(0.0, 0.0, 0.0, 0.0)),
            Err(SampleError::ZeroQuaternion)
        );
        assert_eq!(
            try_normalize(Quaternion::new(f64::NAN, 0.0, 0.0, 1.0)),
            Err(SampleError::NonFinite)
        );
    }

    #[test]
    fn test_try_normalize_handles_huge_components() {
        let q = try_normalize(Quaternion::new(1e200, 1e200, 0.0, 0.0)).unwrap();
        assert!(q.norm_error() < 1e-12);
        assert!((q.w - core::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);

        let q = try_normalize(Quaternion::new(f64::MAX, 0.0, -f64::MAX, f64::MAX)).unwrap();
        assert!(q.norm_error() < 1e-12);
    }

    #[test]
    fn test_renormalized_removes_drift() {
        let drifted = UnitQuaternion::new_unchecked(Quaternion::new(1.0001, 0.0, 0.0, 0.0));
        assert!(drifted.norm_error() > 1e-5);
        assert!(drifted.renormalized().norm_error() < 1e-12);
    }
}
