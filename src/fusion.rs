//! Orientation fusion: inbound samples to a canonical render-space orientation

use crate::error::SampleError;
use crate::math::try_normalize;
use crate::types::{FusedOrientation, FusionSettings, OrientationSample};

/// Converts inbound samples into a unit orientation in render space.
///
/// Holds the last fused orientation. Each accepted sample replaces it
/// wholesale; a rejected sample leaves it untouched.
///
/// # Example
/// ```
/// use quad_attitude::{OrientationFusion, OrientationSample};
///
/// let mut fusion = OrientationFusion::new();
/// let fused = fusion.ingest(OrientationSample::quaternion(0.0, 0.0, 0.0, 1.0, None)).unwrap();
///
/// assert!(fused.euler.yaw.abs() < 1e-9);
/// assert_eq!(fused.quality, None);
/// ```
#[derive(Debug, Clone)]
pub struct OrientationFusion {
    settings: FusionSettings,
    last: FusedOrientation,
}

impl OrientationFusion {
    /// Create a fusion stage with the ship-default remap and Euler order
    pub fn new() -> Self {
        Self::with_settings(FusionSettings::default())
    }

    pub fn with_settings(settings: FusionSettings) -> Self {
        Self {
            settings,
            last: FusedOrientation::default(),
        }
    }

    pub fn settings(&self) -> FusionSettings {
        self.settings
    }

    /// Fuse one sample and remember the result
    ///
    /// Quaternion samples are remapped into render axes and renormalised;
    /// quality is forwarded unchanged. Euler samples are composed in the
    /// configured order and carry no quality.
    pub fn ingest(&mut self, sample: OrientationSample) -> Result<FusedOrientation, SampleError> {
        let fused = self.fuse(sample)?;
        self.last = fused;
        Ok(fused)
    }

    /// Last successfully fused orientation
    pub fn last(&self) -> FusedOrientation {
        self.last
    }

    fn fuse(&self, sample: OrientationSample) -> Result<FusedOrientation, SampleError> {
        let order = self.settings.euler_order;
        match sample {
            OrientationSample::Quaternion { quaternion, quality } => {
                let render = self.settings.remap.remap_quaternion(quaternion);
                let unit = try_normalize(render)?;
                Ok(FusedOrientation::from_quaternion(unit, order, quality))
            }
            OrientationSample::Euler(angles) => {
                if !angles.is_finite() {
                    return Err(SampleError::NonFinite);
                }
                Ok(FusedOrientation::from_quaternion(order.compose(angles), order, None))
            }
        }
    }
}

impl Default for OrientationFusion {
    fn default() -> Self {
        Self::new()
    }
}
