//! Text packet decoding
//!
//! Packets are JSON objects in one of two shapes:
//!
//! - `{"r": .., "p": .., "y": ..}`: Euler angles in degrees. Missing angles
//!   read as 0, but at least one must be present.
//! - `{"quat": {"x": .., "y": .., "z": .., "w": ..}, "quality": ..}`:
//!   sensor-frame quaternion with optional fusion quality.
//!
//! A packet carrying both shapes is read as a quaternion.
//!
//! # Example
//! ```
//! use quad_attitude::{OrientationSample, packet};
//!
//! let sample = packet::decode(r#"{"r": -12.3, "p": 8.5, "y": 42.1}"#).unwrap();
//! assert_eq!(sample, OrientationSample::euler(-12.3, 8.5, 42.1));
//!
//! assert!(packet::decode("booting IMU...").is_err());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{PacketError, SampleError};
use crate::euler::EulerAngles;
use crate::types::OrientationSample;

#[derive(Debug, Deserialize)]
struct QuaternionShape {
    quat: QuaternionPacket,
    #[serde(default)]
    quality: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EulerShape {
    r: Option<f64>,
    p: Option<f64>,
    y: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct QuaternionPacket {
    x: f64,
    y: f64,
    z: f64,
    w: f64,
}

#[derive(Serialize)]
struct EulerPacket {
    r: f64,
    p: f64,
    y: f64,
}

/// Decode one text packet into a typed sample
pub fn decode(text: &str) -> Result<OrientationSample, PacketError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(PacketError::UnrecognisedShape);
    }
    // A `quat` key commits the packet to the quaternion shape
    if value.get("quat").is_some() {
        let QuaternionShape { quat, quality } =
            QuaternionShape::deserialize(value).map_err(|_| PacketError::UnrecognisedShape)?;
        let QuaternionPacket { x, y, z, w } = quat;
        if x == 0.0 && y == 0.0 && z == 0.0 && w == 0.0 {
            return Err(SampleError::ZeroQuaternion.into());
        }
        return Ok(OrientationSample::quaternion(x, y, z, w, quality));
    }

    match EulerShape::deserialize(value).map_err(|_| PacketError::UnrecognisedShape)? {
        EulerShape { r: None, p: None, y: None } => Err(PacketError::UnrecognisedShape),
        EulerShape { r, p, y } => Ok(OrientationSample::Euler(EulerAngles::new(
            r.unwrap_or(0.0),
            p.unwrap_or(0.0),
            y.unwrap_or(0.0),
        ))),
    }
}

/// Render Euler angles in the legacy packet shape
pub fn encode_euler(angles: &EulerAngles) -> String {
    let packet = EulerPacket {
        r: angles.roll,
        p: angles.pitch,
        y: angles.yaw,
    };
    // Non-finite angles serialise as null, so this cannot fail
    serde_json::to_string(&packet).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_euler() {
        let sample = decode(r#"{"r":1.5,"p":-2,"y":300}"#).unwrap();
        assert_eq!(sample, OrientationSample::euler(1.5, -2.0, 300.0));
    }

    #[test]
    fn test_missing_angles_default_to_zero() {
        let sample = decode(r#"{"p": 12}"#).unwrap();
        assert_eq!(sample, OrientationSample::euler(0.0, 12.0, 0.0));
    }

    #[test]
    fn test_decode_quaternion_with_quality() {
        let sample = decode(r#"{"quat":{"x":0,"y":0,"z":0.3827,"w":0.9239},"quality":0.75}"#).unwrap();
        assert_eq!(sample, OrientationSample::quaternion(0.0, 0.0, 0.3827, 0.9239, Some(0.75)));
    }

    #[test]
    fn test_decode_quaternion_without_quality() {
        let sample = decode(r#"{"quat":{"x":0,"y":0,"z":0,"w":1}}"#).unwrap();
        assert_eq!(sample, OrientationSample::quaternion(0.0, 0.0, 0.0, 1.0, None));
    }

    #[test]
    fn test_quaternion_wins_over_euler() {
        let sample = decode(r#"{"r":5,"quat":{"x":0,"y":0,"z":0,"w":1}}"#).unwrap();
        assert!(matches!(sample, OrientationSample::Quaternion { .. }));
    }

    #[test]
    fn test_unrecognised_shapes_are_rejected() {
        for text in [
            "",
            "not json",
            "42",
            "[1, 2, 3]",
            "{}",
            r#"{"foo": 1}"#,
            r#"{"r": "ten"}"#,
            r#"{"quat": {"x": 0, "y": 0, "z": 0}}"#,
            r#"{"quat": {"x": 0, "y": 0, "z": 0.38}, "y": 90}"#,
            r#"{"quat": "level", "r": 5}"#,
            r#"{"quat": null, "p": 10}"#,
        ] {
            assert!(decode(text).is_err(), "accepted {:?}", text);
        }
    }

    #[test]
    fn test_zero_quaternion_is_rejected() {
        let result = decode(r#"{"quat":{"x":0,"y":0,"z":0,"w":0}}"#);
        assert!(matches!(result, Err(PacketError::Sample(SampleError::ZeroQuaternion))));
    }

    #[test]
    fn test_encode_decode_euler() {
        let angles = EulerAngles::new(-12.3, 8.5, 42.1);
        let sample = decode(&encode_euler(&angles)).unwrap();
        assert_eq!(sample, OrientationSample::Euler(angles));
    }
}
