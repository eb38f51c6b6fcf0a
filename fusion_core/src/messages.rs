// fusion_core/src/messages.rs

use crate::error::RecordError;
use crate::types::{StateVector, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The last four tokens of every input line hold the ground-truth state.
pub const GROUND_TRUTH_FIELDS: usize = 4;

// =========================================================================
// == Sensor Data ==
// =========================================================================

/// The two sensor modalities the filter knows how to fuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Lidar,
    Radar,
}

impl SensorKind {
    /// Maps the leading token of an input line to a sensor kind.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "L" => Some(Self::Lidar),
            "R" => Some(Self::Radar),
            _ => None,
        }
    }

    /// Number of raw measurement components carried by a record of this kind.
    pub fn measurement_dim(self) -> usize {
        match self {
            Self::Lidar => 2,
            Self::Radar => 3,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lidar => write!(f, "lidar"),
            Self::Radar => write!(f, "radar"),
        }
    }
}

/// A single sensor reading, resolved to its concrete shape at parse time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    /// Cartesian position in the tracking frame.
    Lidar {
        px: f64,
        py: f64,
        timestamp: Timestamp,
    },
    /// Range, bearing and range rate relative to the sensor origin.
    Radar {
        rho: f64,
        phi: f64,
        rho_dot: f64,
        timestamp: Timestamp,
    },
}

impl Measurement {
    pub fn timestamp(&self) -> Timestamp {
        match *self {
            Self::Lidar { timestamp, .. } | Self::Radar { timestamp, .. } => timestamp,
        }
    }

    pub fn sensor(&self) -> SensorKind {
        match self {
            Self::Lidar { .. } => SensorKind::Lidar,
            Self::Radar { .. } => SensorKind::Radar,
        }
    }

    /// The first two raw components as received (`px, py` or `rho, phi`).
    pub fn leading_components(&self) -> [f64; 2] {
        match *self {
            Self::Lidar { px, py, .. } => [px, py],
            Self::Radar { rho, phi, .. } => [rho, phi],
        }
    }

    /// Cartesian position implied by this reading alone.
    pub fn position(&self) -> (f64, f64) {
        match *self {
            Self::Lidar { px, py, .. } => (px, py),
            Self::Radar { rho, phi, .. } => (rho * phi.cos(), rho * phi.sin()),
        }
    }
}

// =========================================================================
// == Record Stream ==
// =========================================================================

/// One line of the input stream: a measurement plus the ground truth
/// recorded alongside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorRecord {
    pub measurement: Measurement,
    pub ground_truth: StateVector,
}

impl SensorRecord {
    /// Parses a whitespace-delimited record line.
    ///
    /// Layouts:
    /// * `L <px> <py> <timestamp> <gt_px> <gt_py> <gt_vx> <gt_vy>`
    /// * `R <rho> <phi> <rho_dot> <timestamp> <gt_px> <gt_py> <gt_vx> <gt_vy>`
    ///
    /// The ground truth is always read from the last four tokens.
    pub fn parse(line: &str, line_number: usize) -> Result<Self, RecordError> {
        let malformed = |reason: String| RecordError::MalformedRecord {
            line: line_number,
            reason,
        };

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let tag = *tokens
            .first()
            .ok_or_else(|| malformed("empty record".to_string()))?;
        let kind = SensorKind::from_tag(tag).ok_or_else(|| RecordError::UnknownSensorType {
            line: line_number,
            tag: tag.to_string(),
        })?;

        // tag + measurement + timestamp + ground truth
        let expected = 1 + kind.measurement_dim() + 1 + GROUND_TRUTH_FIELDS;
        if tokens.len() != expected {
            return Err(malformed(format!(
                "expected {} fields for a {} record, found {}",
                expected,
                kind,
                tokens.len()
            )));
        }

        let number = |token: &str, field: &str| -> Result<f64, RecordError> {
            match token.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(malformed(format!("invalid {} value '{}'", field, token))),
            }
        };

        let gt_start = tokens.len() - GROUND_TRUTH_FIELDS;
        let gt = &tokens[gt_start..];
        let ground_truth = StateVector::new(
            number(gt[0], "gt_px")?,
            number(gt[1], "gt_py")?,
            number(gt[2], "gt_vx")?,
            number(gt[3], "gt_vy")?,
        );

        let ts_token = tokens[gt_start - 1];
        let timestamp = ts_token
            .parse::<Timestamp>()
            .map_err(|_| malformed(format!("invalid timestamp '{}'", ts_token)))?;

        let measurement = match kind {
            SensorKind::Lidar => Measurement::Lidar {
                px: number(tokens[1], "px")?,
                py: number(tokens[2], "py")?,
                timestamp,
            },
            SensorKind::Radar => Measurement::Radar {
                rho: number(tokens[1], "rho")?,
                phi: number(tokens[2], "phi")?,
                rho_dot: number(tokens[3], "rho_dot")?,
                timestamp,
            },
        };

        Ok(Self {
            measurement,
            ground_truth,
        })
    }
}

/// One line of the output stream:
/// `est_px est_py est_vx est_vy meas_1 meas_2 gt_px gt_py gt_vx gt_vy`.
///
/// `meas_1, meas_2` are `px, py` for lidar records and `rho, phi` for radar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateRecord {
    pub estimate: StateVector,
    pub measured: [f64; 2],
    pub ground_truth: StateVector,
}

impl EstimateRecord {
    pub fn new(estimate: StateVector, record: &SensorRecord) -> Self {
        Self {
            estimate,
            measured: record.measurement.leading_components(),
            ground_truth: record.ground_truth,
        }
    }
}

impl fmt::Display for EstimateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = &self.estimate;
        let g = &self.ground_truth;
        write!(
            f,
            "{} {} {} {} {} {} {} {} {} {}",
            e[0], e[1], e[2], e[3], self.measured[0], self.measured[1], g[0], g[1], g[2], g[3]
        )
    }
}
