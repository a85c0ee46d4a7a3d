//! Quad Attitude - orientation fusion and throttle mixing for live quadrotor visualisation
//!
//! This crate turns a stream of orientation packets from a physical IMU into
//! two things a viewer draws on every frame: the vehicle pose in a Y-up render
//! frame, and an illustrative per-rotor throttle split for a quad-X airframe.
//!
//! # Features
//!
//! - Two packet shapes: legacy Euler triples `{"r","p","y"}` and sensor-fused
//!   quaternions `{"quat":{..},"quality":..}`
//! - Configurable sensor-to-render axis remapping (Z-up sensor by default)
//! - Explicit Euler rotation order shared by every conversion
//! - Operator yaw re-zero that leaves pitch and roll untouched
//! - Frame-rate independent smoothing for the legacy Euler path
//! - Quad-X mixer with disconnect-to-idle behaviour
//! - TOML configuration with validation
//!
//! # Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use quad_attitude::{Connectivity, MotorId, Session};
//!
//! let mut session = Session::new();
//! session.set_connectivity(Connectivity::Connected);
//!
//! // Sensor pitched nose-down by 10° about its X axis
//! session.handle_packet(r#"{"quat":{"x":-0.0872,"y":0,"z":0,"w":0.9962},"quality":0.95}"#);
//!
//! let frame = session.tick(Duration::from_secs_f64(1.0 / 60.0));
//! println!("{}  {}", frame.orientation.euler, frame.command);
//!
//! let front = frame.command.get(MotorId::FrontLeft).throttle;
//! let back = frame.command.get(MotorId::BackLeft).throttle;
//! assert!(front > back);
//! ```

mod axes;
mod calibration;
mod config;
mod error;
mod euler;
mod fusion;
mod math;
mod mixer;
pub mod packet;
mod session;
mod smoothing;
mod types;

pub use axes::{AxisRemap, SignedAxis};
pub use calibration::YawCalibrator;
pub use config::KernelConfig;
pub use error::{ConfigError, PacketError, SampleError};
pub use euler::{EulerAngles, EulerOrder};
pub use fusion::OrientationFusion;
pub use math::{DEG_TO_RAD, QuaternionExt, RAD_TO_DEG};
pub use mixer::{Motor, MotorCommand, MotorId, MotorMixer, Spin};
pub use session::{Frame, SharedSession, Session};
pub use smoothing::SmoothingFilter;
pub use types::*;
