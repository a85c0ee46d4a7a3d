//! Operator-triggered yaw re-zero

use nalgebra::UnitQuaternion;

use crate::euler::EulerOrder;
use crate::math::{DEG_TO_RAD, RAD_TO_DEG};
use crate::types::FusedOrientation;

/// Holds a single heading offset and applies it to fused orientations.
///
/// The offset only changes through [`reset_yaw`](Self::reset_yaw) and lives
/// as long as the calibrator; nothing is persisted.
///
/// # Example
/// ```
/// use quad_attitude::{EulerOrder, OrientationFusion, OrientationSample, YawCalibrator};
///
/// let mut fusion = OrientationFusion::new();
/// let fused = fusion.ingest(OrientationSample::euler(0.0, 10.0, 75.0)).unwrap();
///
/// let mut calibrator = YawCalibrator::new(EulerOrder::default());
/// calibrator.reset_yaw(&fused);
///
/// let level = calibrator.apply_to(&fused);
/// assert!(level.euler.yaw.abs() < 1e-9);
/// assert!((level.euler.pitch - 10.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YawCalibrator {
    order: EulerOrder,
    /// Heading offset in radians
    offset: f64,
}

impl YawCalibrator {
    pub fn new(order: EulerOrder) -> Self {
        Self { order, offset: 0.0 }
    }

    /// Make the current heading read as zero
    ///
    /// `current` must be the uncalibrated orientation; repeating the call with
    /// the same input yields the same offset.
    pub fn reset_yaw(&mut self, current: &FusedOrientation) {
        let yaw = self.order.decompose(&current.quaternion).yaw;
        self.offset = -yaw * DEG_TO_RAD;
        tracing::info!(yaw_deg = yaw, "yaw re-zeroed");
    }

    /// Rotate `q` by the offset about the render vertical axis
    pub fn apply(&self, q: &UnitQuaternion<f64>) -> UnitQuaternion<f64> {
        if self.offset == 0.0 {
            return *q;
        }
        self.order.apply_yaw(q, self.offset)
    }

    /// Calibrated copy of a fused orientation, with its Euler angles refreshed
    pub fn apply_to(&self, fused: &FusedOrientation) -> FusedOrientation {
        FusedOrientation::from_quaternion(self.apply(&fused.quaternion), self.order, fused.quality)
    }

    /// Heading offset in radians
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Heading offset in degrees
    pub fn offset_degrees(&self) -> f64 {
        self.offset * RAD_TO_DEG
    }
}

impl Default for YawCalibrator {
    fn default() -> Self {
        Self::new(EulerOrder::default())
    }
}
