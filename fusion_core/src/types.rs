// fusion_core/src/types.rs

use nalgebra::{Matrix4, Vector4};

/// Number of entries in the tracked state `[px, py, vx, vy]`.
pub const STATE_DIM: usize = 4;

// --- Core Type Aliases ---
pub type StateVector = Vector4<f64>;
pub type StateCovariance = Matrix4<f64>;

/// Sensor timestamps are integer microseconds.
pub type Timestamp = i64;

pub const MICROS_PER_SECOND: f64 = 1.0e6;

/// Index of each variable inside the state vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateVariable {
    Px = 0,
    Py = 1,
    Vx = 2,
    Vy = 3,
}

impl StateVariable {
    pub const ALL: [StateVariable; STATE_DIM] = [Self::Px, Self::Py, Self::Vx, Self::Vy];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Px => "px",
            Self::Py => "py",
            Self::Vx => "vx",
            Self::Vy => "vy",
        }
    }
}

/// Converts the difference between two microsecond timestamps into seconds.
///
/// Returns `None` when the difference does not fit in a `Timestamp`.
pub fn elapsed_seconds(previous: Timestamp, current: Timestamp) -> Option<f64> {
    current
        .checked_sub(previous)
        .map(|micros| micros as f64 / MICROS_PER_SECOND)
}
