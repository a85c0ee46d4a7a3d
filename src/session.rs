//! Session context tying fusion, calibration, smoothing and mixing together
//!
//! A [`Session`] owns every piece of mutable kernel state, so independent
//! sessions never interfere. It is driven by two triggers:
//!
//! - inbound packets, at whatever rate the transport delivers them
//!   ([`Session::handle_packet`] / [`Session::ingest`])
//! - a fixed-cadence render tick ([`Session::tick`]) that re-derives the
//!   displayed pose and the motor command from the latest cached state
//!
//! Only the most recent sample is kept. Packets that arrive faster than the
//! tick simply overwrite each other.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use quad_attitude::{Connectivity, Session};
//!
//! let mut session = Session::new();
//! session.set_connectivity(Connectivity::Connected);
//! session.handle_packet(r#"{"quat":{"x":0,"y":0,"z":0,"w":1},"quality":0.9}"#);
//!
//! let frame = session.tick(Duration::from_millis(16));
//! assert_eq!(frame.command.throttles(), [55.0; 4]);
//!
//! session.set_connectivity(Connectivity::Disconnected);
//! let frame = session.tick(Duration::from_millis(16));
//! assert!(frame.command.is_idle());
//! assert_eq!(frame.orientation.quality, Some(0.9));
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::calibration::YawCalibrator;
use crate::config::KernelConfig;
use crate::error::SampleError;
use crate::euler::EulerAngles;
use crate::fusion::OrientationFusion;
use crate::mixer::{MotorCommand, MotorMixer};
use crate::packet;
use crate::smoothing::SmoothingFilter;
use crate::types::{Connectivity, FusedOrientation, OrientationSample, SampleSource, SmoothingSettings};

/// What the presenter draws on one render tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Displayed pose, with the yaw offset applied
    pub orientation: FusedOrientation,
    pub command: MotorCommand,
    pub connectivity: Connectivity,
    /// Input path the pose was derived from, `None` before the first sample
    pub source: Option<SampleSource>,
}

/// Smoothers for the legacy Euler path, one per axis.
#[derive(Debug, Clone, Copy)]
struct EulerSmoother {
    roll: SmoothingFilter,
    pitch: SmoothingFilter,
    yaw: SmoothingFilter,
}

impl EulerSmoother {
    fn new(settings: SmoothingSettings) -> Self {
        Self {
            roll: SmoothingFilter::new(settings),
            pitch: SmoothingFilter::new(settings),
            yaw: SmoothingFilter::new(settings),
        }
    }

    fn step(&mut self, target: EulerAngles, elapsed: Duration) -> EulerAngles {
        EulerAngles::new(
            self.roll.step_elapsed(target.roll, elapsed),
            self.pitch.step_elapsed(target.pitch, elapsed),
            self.yaw.step_elapsed(target.yaw, elapsed),
        )
    }
}

/// Owned kernel state for one sensor stream.
#[derive(Debug, Clone)]
pub struct Session {
    fusion: OrientationFusion,
    calibrator: YawCalibrator,
    smoother: EulerSmoother,
    mixer: MotorMixer,
    connectivity: Connectivity,
    source: Option<SampleSource>,
    /// Latest legacy Euler sample, the smoother's target
    euler_target: EulerAngles,
}

impl Session {
    /// Session with ship defaults, starting disconnected
    pub fn new() -> Self {
        Self::with_config(&KernelConfig::default())
    }

    pub fn with_config(config: &KernelConfig) -> Self {
        Self {
            fusion: OrientationFusion::with_settings(config.fusion),
            calibrator: YawCalibrator::new(config.fusion.euler_order),
            smoother: EulerSmoother::new(config.smoothing),
            mixer: MotorMixer::with_settings(config.mixer),
            connectivity: Connectivity::default(),
            source: None,
            euler_target: EulerAngles::default(),
        }
    }

    /// Decode and ingest one text packet
    ///
    /// Returns whether the packet changed state. Malformed packets are
    /// dropped silently.
    pub fn handle_packet(&mut self, text: &str) -> bool {
        let sample = match packet::decode(text) {
            Ok(sample) => sample,
            Err(err) => {
                tracing::debug!(%err, "dropping packet");
                return false;
            }
        };
        match self.ingest(sample) {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(%err, "dropping sample");
                false
            }
        }
    }

    /// Fuse a typed sample, replacing the last known orientation
    pub fn ingest(&mut self, sample: OrientationSample) -> Result<FusedOrientation, SampleError> {
        let fused = self.fusion.ingest(sample)?;
        if let OrientationSample::Euler(angles) = sample {
            self.euler_target = angles;
        }
        self.source = Some(sample.source());
        Ok(fused)
    }

    /// Record a transport link change
    ///
    /// Going down leaves the orientation frozen and makes every following
    /// tick idle the motors. Coming back up resumes mixing on the next tick.
    pub fn set_connectivity(&mut self, connectivity: Connectivity) {
        if connectivity != self.connectivity {
            tracing::info!(?connectivity, "link state changed");
        }
        self.connectivity = connectivity;
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Make the current heading read as zero
    pub fn reset_yaw(&mut self) {
        self.calibrator.reset_yaw(&self.fusion.last());
    }

    /// Re-derive the displayed pose and motor command
    ///
    /// `elapsed` is the time since the previous tick; it only matters for a
    /// time-constant smoother on the legacy Euler path.
    pub fn tick(&mut self, elapsed: Duration) -> Frame {
        let connected = self.connectivity.is_connected();
        let order = self.fusion.settings().euler_order;

        let (orientation, command) = match self.source {
            Some(SampleSource::Euler) => {
                let target = EulerAngles {
                    yaw: self.euler_target.yaw + self.calibrator.offset_degrees(),
                    ..self.euler_target
                };
                let smoothed = self.smoother.step(target, elapsed);
                let orientation = FusedOrientation::from_quaternion(order.compose(smoothed), order, None);
                (orientation, self.mixer.mix(smoothed.pitch, smoothed.roll, connected))
            }
            Some(SampleSource::Quaternion) | None => {
                let orientation = self.calibrated();
                let command = self.mixer.mix(orientation.euler.pitch, orientation.euler.roll, connected);
                (orientation, command)
            }
        };

        Frame {
            orientation,
            command,
            connectivity: self.connectivity,
            source: self.source,
        }
    }

    /// Last fused orientation without the yaw offset
    pub fn orientation(&self) -> FusedOrientation {
        self.fusion.last()
    }

    /// Last fused orientation with the yaw offset applied
    pub fn calibrated(&self) -> FusedOrientation {
        self.calibrator.apply_to(&self.fusion.last())
    }

    /// Heading offset in radians
    pub fn yaw_offset(&self) -> f64 {
        self.calibrator.offset()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`Session`] behind a mutex, for hosts that receive packets on one
/// thread and render on another.
///
/// Every call holds the lock for its whole duration, so a tick never observes
/// a half-written orientation.
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn handle_packet(&self, text: &str) -> bool {
        self.lock().handle_packet(text)
    }

    pub fn ingest(&self, sample: OrientationSample) -> Result<FusedOrientation, SampleError> {
        self.lock().ingest(sample)
    }

    pub fn set_connectivity(&self, connectivity: Connectivity) {
        self.lock().set_connectivity(connectivity);
    }

    pub fn reset_yaw(&self) {
        self.lock().reset_yaw();
    }

    pub fn tick(&self, elapsed: Duration) -> Frame {
        self.lock().tick(elapsed)
    }

    pub fn orientation(&self) -> FusedOrientation {
        self.lock().orientation()
    }

    // Session has no multi-step invariants a panicking holder could break
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MixerSettings, SmoothingMode};

    const TICK: Duration = Duration::from_millis(16);

    fn connected_session() -> Session {
        let mut session = Session::new();
        session.set_connectivity(Connectivity::Connected);
        session
    }

    #[test]
    fn test_starts_disconnected_and_idle() {
        let mut session = Session::new();
        let frame = session.tick(TICK);
        assert_eq!(frame.connectivity, Connectivity::Disconnected);
        assert!(frame.command.is_idle());
        assert_eq!(frame.source, None);
        assert_eq!(frame.orientation, FusedOrientation::default());
    }

    #[test]
    fn test_identity_quaternion_hovers() {
        let mut session = connected_session();
        assert!(session.handle_packet(r#"{"quat":{"x":0,"y":0,"z":0,"w":1}}"#));

        let frame = session.tick(TICK);
        assert!(frame.orientation.euler.pitch.abs() < 1e-9);
        assert!(frame.orientation.euler.roll.abs() < 1e-9);
        assert!(frame.orientation.euler.yaw.abs() < 1e-9);
        assert_eq!(frame.command.throttles(), [55.0; 4]);
        assert_eq!(frame.source, Some(SampleSource::Quaternion));
    }

    #[test]
    fn test_malformed_packets_change_nothing() {
        let mut session = connected_session();
        session.handle_packet(r#"{"r":10,"p":5,"y":20}"#);
        let before = session.orientation();

        assert!(!session.handle_packet("garbage"));
        assert!(!session.handle_packet(r#"{"quat":{"x":0,"y":0,"z":0,"w":0}}"#));
        assert!(!session.handle_packet("{}"));

        assert_eq!(session.orientation(), before);
    }

    #[test]
    fn test_broken_quaternion_does_not_fall_back_to_euler() {
        let mut session = connected_session();
        session.handle_packet(r#"{"quat":{"x":0,"y":0,"z":0.2,"w":0.98}}"#);
        let before = session.tick(TICK);

        assert!(!session.handle_packet(r#"{"quat":{"x":0,"y":0,"z":0.38},"y":90}"#));

        let after = session.tick(TICK);
        assert_eq!(after.source, Some(SampleSource::Quaternion));
        assert_eq!(after.orientation, before.orientation);
    }

    #[test]
    fn test_huge_quaternion_components_stay_unit() {
        let mut session = connected_session();
        assert!(session.handle_packet(r#"{"quat":{"x":1e200,"y":0,"z":0,"w":1e200}}"#));
        let fused = session.orientation();
        assert!((fused.quaternion.as_ref().norm() - 1.0).abs() < 1e-9);
        assert!(fused.euler.is_finite());
    }

    #[test]
    fn test_unvalidated_nan_hover_never_reaches_rotors() {
        let config = KernelConfig {
            mixer: MixerSettings {
                hover_throttle: f64::NAN,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let mut session = Session::with_config(&config);
        session.set_connectivity(Connectivity::Connected);
        session.handle_packet(r#"{"quat":{"x":0.1,"y":0,"z":0,"w":0.99}}"#);
        for throttle in session.tick(TICK).command.throttles() {
            assert!((0.0..=100.0).contains(&throttle), "{throttle}");
        }
    }

    #[test]
    fn test_latest_packet_wins() {
        let mut session = connected_session();
        session.handle_packet(r#"{"r":10,"p":0,"y":0}"#);
        session.handle_packet(r#"{"r":-20,"p":0,"y":0}"#);
        session.handle_packet(r#"{"r":5,"p":15,"y":0}"#);
        let euler = session.orientation().euler;
        assert!((euler.roll - 5.0).abs() < 1e-9);
        assert!((euler.pitch - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_disconnect_freezes_orientation_and_zeroes_throttle() {
        let mut session = connected_session();
        session.handle_packet(r#"{"quat":{"x":0.1,"y":0.2,"z":0.3,"w":0.9},"quality":0.8}"#);
        let live = session.tick(TICK);
        assert!(!live.command.is_idle());

        session.set_connectivity(Connectivity::Disconnected);
        let frozen = session.tick(TICK);
        assert!(frozen.command.is_idle());
        assert_eq!(frozen.orientation, live.orientation);

        session.set_connectivity(Connectivity::Connected);
        let resumed = session.tick(TICK);
        assert_eq!(resumed.command, live.command);
    }

    #[test]
    fn test_reset_yaw_on_quaternion_path() {
        let mut session = connected_session();
        // 40° about the sensor's up axis plus some tilt
        session.handle_packet(r#"{"quat":{"x":0.1,"y":-0.05,"z":0.34,"w":0.93}}"#);
        let before = session.tick(TICK).orientation.euler;
        assert!(before.yaw.abs() > 1.0);

        session.reset_yaw();
        let after = session.tick(TICK).orientation.euler;
        assert!(after.yaw.abs() < 1e-9);
        assert!((after.pitch - before.pitch).abs() < 1e-9);
        assert!((after.roll - before.roll).abs() < 1e-9);

        // Raw orientation is untouched
        assert!((session.orientation().euler.yaw - before.yaw).abs() < 1e-9);
    }

    #[test]
    fn test_legacy_path_smooths_towards_target() {
        let config = KernelConfig {
            smoothing: SmoothingSettings {
                mode: SmoothingMode::PerTick { coefficient: 0.2 },
            },
            ..Default::default()
        };
        let mut session = Session::with_config(&config);
        session.set_connectivity(Connectivity::Connected);
        session.handle_packet(r#"{"r":0,"p":30,"y":0}"#);

        let first = session.tick(TICK);
        assert!((first.orientation.euler.pitch - 6.0).abs() < 1e-9);
        // Mixer reads the smoothed pitch: 6/30 * 0.8 * 20 = 3.2 points
        assert!((first.command.throttles()[0] - 58.2).abs() < 1e-9);

        let mut frame = first;
        for _ in 0..40 {
            frame = session.tick(TICK);
        }
        assert!((frame.orientation.euler.pitch - 30.0).abs() < 0.01);
        assert_eq!(frame.source, Some(SampleSource::Euler));
    }

    #[test]
    fn test_reset_yaw_on_legacy_path() {
        let config = KernelConfig {
            smoothing: SmoothingSettings {
                mode: SmoothingMode::PerTick { coefficient: 1.0 },
            },
            ..Default::default()
        };
        let mut session = Session::with_config(&config);
        session.handle_packet(r#"{"r":0,"p":0,"y":75}"#);
        assert!((session.tick(TICK).orientation.euler.yaw - 75.0).abs() < 1e-9);

        session.reset_yaw();
        assert!(session.tick(TICK).orientation.euler.yaw.abs() < 1e-9);

        session.handle_packet(r#"{"r":0,"p":0,"y":100}"#);
        assert!((session.tick(TICK).orientation.euler.yaw - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_mixer_settings_flow_from_config() {
        let config = KernelConfig {
            mixer: MixerSettings {
                hover_throttle: 40.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut session = Session::with_config(&config);
        session.set_connectivity(Connectivity::Connected);
        session.handle_packet(r#"{"quat":{"x":0,"y":0,"z":0,"w":1}}"#);
        assert_eq!(session.tick(TICK).command.throttles(), [40.0; 4]);
    }

    #[test]
    fn test_shared_session_across_threads() {
        let shared = SharedSession::new(Session::new());
        shared.set_connectivity(Connectivity::Connected);

        let producer = shared.clone();
        let handle = std::thread::spawn(move || {
            for i in 0..100 {
                let text = format!(r#"{{"r":0,"p":{},"y":0}}"#, i % 30);
                producer.handle_packet(&text);
            }
        });
        for _ in 0..50 {
            let frame = shared.tick(TICK);
            assert!(frame.command.throttles().iter().all(|t| (0.0..=100.0).contains(t)));
        }
        handle.join().unwrap();

        let last = shared.orientation().euler;
        assert!((last.pitch - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_shared_session_survives_poisoned_lock() {
        let shared = SharedSession::new(Session::new());
        shared.set_connectivity(Connectivity::Connected);
        shared.handle_packet(r#"{"r":0,"p":12,"y":0}"#);

        let holder = shared.clone();
        let result = std::thread::spawn(move || {
            let _guard = holder.inner.lock().unwrap();
            panic!("renderer crashed mid-frame");
        })
        .join();
        assert!(result.is_err());
        assert!(shared.inner.is_poisoned());

        let frame = shared.tick(TICK);
        assert!(!frame.command.is_idle());
        assert!((shared.orientation().euler.pitch - 12.0).abs() < 1e-9);
        assert!(shared.handle_packet(r#"{"r":0,"p":4,"y":0}"#));
    }
}
