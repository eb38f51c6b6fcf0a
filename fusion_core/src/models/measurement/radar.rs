// fusion_core/src/models/measurement/radar.rs

use crate::models::measurement::MeasurementModel;
use crate::types::StateVector;
use crate::utils::normalize_angle;
use nalgebra::{Matrix3, Matrix3x4, Vector3};

/// Below this squared range the radar model is not linearized.
pub const JACOBIAN_EPSILON: f64 = 1.0e-4;

/// Below this range the range rate is reported as zero.
pub const RANGE_EPSILON: f64 = 1.0e-9;

/// Evaluates the polar measurement function `h(x) = [ρ, θ, ρ̇]`.
pub fn radar_measurement_function(x: &StateVector) -> Vector3<f64> {
    let (px, py, vx, vy) = (x[0], x[1], x[2], x[3]);

    let rho = px.hypot(py);
    let theta = py.atan2(px);
    let rho_dot = if rho > RANGE_EPSILON {
        (px * vx + py * vy) / rho
    } else {
        0.0
    };

    Vector3::new(rho, theta, rho_dot)
}

/// Linearizes the radar measurement function around `x`.
///
/// Near the sensor origin (`px² + py² < JACOBIAN_EPSILON`) the derivatives are
/// undefined and the zero matrix is returned instead. A zero Jacobian makes the
/// Kalman gain vanish, so the radar update for that cycle carries no information.
pub fn calculate_radar_jacobian(x: &StateVector) -> Matrix3x4<f64> {
    let (px, py, vx, vy) = (x[0], x[1], x[2], x[3]);

    let c1 = px * px + py * py;
    if c1.abs() < JACOBIAN_EPSILON {
        return Matrix3x4::zeros();
    }

    let c2 = c1.sqrt();
    let c3 = c1 * c2;

    #[rustfmt::skip]
    let h_jac = Matrix3x4::new(
        px / c2,                           py / c2,                           0.0,     0.0,
        -py / c1,                          px / c1,                           0.0,     0.0,
        py * (vx * py - vy * px) / c3,     px * (px * vy - py * vx) / c3,     px / c2, py / c2,
    );
    h_jac
}

/// A radar observes range, bearing and range rate in polar coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarModel {
    /// The 3x3 measurement noise covariance matrix, R.
    pub r_matrix: Matrix3<f64>,
}

impl RadarModel {
    /// Builds the model from the range, bearing and range-rate variances.
    pub fn new(noise: [f64; 3]) -> Self {
        Self {
            r_matrix: Matrix3::from_diagonal(&Vector3::from(noise)),
        }
    }
}

impl Default for RadarModel {
    fn default() -> Self {
        Self::new([0.09, 0.0009, 0.09])
    }
}

impl MeasurementModel<3> for RadarModel {
    fn get_r(&self) -> &Matrix3<f64> {
        &self.r_matrix
    }

    fn predict_measurement(&self, x: &StateVector) -> Vector3<f64> {
        radar_measurement_function(x)
    }

    fn calculate_jacobian(&self, x: &StateVector) -> Matrix3x4<f64> {
        calculate_radar_jacobian(x)
    }

    fn residual(&self, z: &Vector3<f64>, z_pred: &Vector3<f64>) -> Vector3<f64> {
        let mut y = z - z_pred;
        y[1] = normalize_angle(y[1]);
        y
    }
}
