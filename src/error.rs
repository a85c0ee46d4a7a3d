//! Error types for packet decoding, sample validation and configuration

use std::path::PathBuf;

/// Reasons an inbound text packet could not be turned into a sample.
///
/// A session never surfaces these to its caller; they are logged and the
/// packet is dropped without touching any state.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("packet is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("packet carries neither an Euler triple nor a quaternion")]
    UnrecognisedShape,
    #[error(transparent)]
    Sample(#[from] SampleError),
}

/// Reasons a typed orientation sample cannot be fused.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SampleError {
    #[error("sample contains a non-finite component")]
    NonFinite,
    #[error("quaternion has zero length and cannot be normalised")]
    ZeroQuaternion,
}

/// Configuration loading and validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("axis remap uses sensor axis {0} more than once")]
    DuplicateAxis(char),
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
