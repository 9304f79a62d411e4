//! Error types for configuration loading and solver input validation.
//!
//! Unreachable branches, limit violations and wrist singularities are not
//! errors: the solver drops or resolves them silently. Only malformed input
//! surfaces here.

use std::path::PathBuf;

/// Errors raised at the API boundary of the solver.
#[derive(Debug, thiserror::Error)]
pub enum KinematicsError {
    /// A joint-limit table did not have one entry per joint.
    #[error("expected {expected} joint limits, found {found}")]
    JointLimitCount { expected: usize, found: usize },

    /// A single joint limit is inverted or not finite.
    #[error("invalid limit for joint {joint}: [{min}, {max}]")]
    InvalidJointLimit { joint: usize, min: f64, max: f64 },

    /// A pose component is NaN or infinite.
    #[error("pose component `{component}` is not finite ({value})")]
    NonFinitePose { component: &'static str, value: f64 },

    /// One pose of a sequence failed validation (1-based position).
    #[error("pose {pose} is invalid: {source}")]
    InvalidPose {
        pose: usize,
        source: Box<KinematicsError>,
    },

    /// The DH geometry cannot describe a working arm.
    #[error("invalid robot geometry: {0}")]
    InvalidGeometry(String),

    /// A solver tolerance is not a positive finite number.
    #[error("invalid tolerance `{name}`: {value}")]
    InvalidTolerance { name: &'static str, value: f64 },

    /// Failed to read a job or configuration file.
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A job or configuration document could not be parsed.
    #[error("failed to parse job: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KinematicsError>;
