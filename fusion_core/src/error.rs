// fusion_core/src/error.rs

//! Error types shared across the estimation engine.

use crate::types::Timestamp;
use thiserror::Error;

/// Failures raised by the Kalman correction step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// The innovation covariance `S = H·P·Hᵀ + R` could not be inverted safely.
    /// `condition` is the Frobenius condition estimate, or `None` when `S` was
    /// singular or contained non-finite entries.
    #[error("innovation covariance is singular or ill-conditioned (condition estimate: {condition:?})")]
    DegenerateInnovationCovariance { condition: Option<f64> },
}

/// Failures raised by the fusion orchestrator for a single record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FusionError {
    /// The record is older than the last accepted one.
    #[error("timestamp {current} precedes the previous accepted timestamp {previous}")]
    NonMonotonicTimestamp {
        previous: Timestamp,
        current: Timestamp,
    },

    /// The gap to the previous accepted record does not fit in a timestamp.
    #[error("elapsed time from {previous} to {current} overflows the timestamp range")]
    TimestampOverflow {
        previous: Timestamp,
        current: Timestamp,
    },
}

/// Failures raised while turning a text line into a `SensorRecord`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("line {line}: unknown sensor type '{tag}'")]
    UnknownSensorType { line: usize, tag: String },

    #[error("line {line}: malformed record: {reason}")]
    MalformedRecord { line: usize, reason: String },
}

impl RecordError {
    pub fn line(&self) -> usize {
        match self {
            Self::UnknownSensorType { line, .. } | Self::MalformedRecord { line, .. } => *line,
        }
    }
}

/// Failures raised by the accuracy tool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccuracyError {
    #[error(
        "invalid accuracy input: {estimates} estimates vs {ground_truths} ground-truth samples"
    )]
    InvalidAccuracyInput {
        estimates: usize,
        ground_truths: usize,
    },
}
