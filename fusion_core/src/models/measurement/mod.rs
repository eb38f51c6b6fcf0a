// fusion_core/src/models/measurement/mod.rs

use crate::types::{StateVector, STATE_DIM};
use nalgebra::{SMatrix, SVector};
use std::fmt::Debug;

// --- MEASUREMENT MODEL TRAIT ---
// Represents the mathematical model of a sensor. `z = h(x) + v`
// `M` is the dimension of the measurement vector `z`.
pub trait MeasurementModel<const M: usize>: Debug + Send + Sync {
    /// Returns the measurement noise covariance matrix `R`.
    fn get_r(&self) -> &SMatrix<f64, M, M>;

    /// Predicts the ideal measurement `z_pred = h(x)` from the filter state.
    fn predict_measurement(&self, x: &StateVector) -> SVector<f64, M>;

    /// Calculates the measurement Jacobian `H = ∂h/∂x` at `x`.
    fn calculate_jacobian(&self, x: &StateVector) -> SMatrix<f64, M, STATE_DIM>;

    /// The innovation `y = z - z_pred`. Models with angular components
    /// override this to keep the residual wrapped.
    fn residual(&self, z: &SVector<f64, M>, z_pred: &SVector<f64, M>) -> SVector<f64, M> {
        z - z_pred
    }
}

pub mod lidar;
pub mod radar;

pub use lidar::LidarModel;
pub use radar::{calculate_radar_jacobian, RadarModel};
