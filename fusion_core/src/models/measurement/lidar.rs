// fusion_core/src/models/measurement/lidar.rs

use crate::models::measurement::MeasurementModel;
use crate::types::StateVector;
use nalgebra::{Matrix2, Matrix2x4, Vector2};

/// A lidar observes the Cartesian position directly, so `h(x) = H·x`.
#[derive(Debug, Clone, PartialEq)]
pub struct LidarModel {
    /// The 2x2 measurement noise covariance matrix, R.
    pub r_matrix: Matrix2<f64>,
    h_matrix: Matrix2x4<f64>,
}

impl LidarModel {
    /// Builds the model from the per-axis position variances.
    pub fn new(noise: [f64; 2]) -> Self {
        #[rustfmt::skip]
        let h_matrix = Matrix2x4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
        );
        Self {
            r_matrix: Matrix2::from_diagonal(&Vector2::from(noise)),
            h_matrix,
        }
    }

    /// The fixed projection of the state onto `[px, py]`.
    pub fn h_matrix(&self) -> &Matrix2x4<f64> {
        &self.h_matrix
    }
}

impl Default for LidarModel {
    fn default() -> Self {
        Self::new([0.0225, 0.0225])
    }
}

impl MeasurementModel<2> for LidarModel {
    fn get_r(&self) -> &Matrix2<f64> {
        &self.r_matrix
    }

    fn predict_measurement(&self, x: &StateVector) -> Vector2<f64> {
        self.h_matrix * x
    }

    fn calculate_jacobian(&self, _x: &StateVector) -> Matrix2x4<f64> {
        // Linear model: the Jacobian does not depend on the state.
        self.h_matrix
    }
}
