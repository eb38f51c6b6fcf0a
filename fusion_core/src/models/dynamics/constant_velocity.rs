// fusion_core/src/models/dynamics/constant_velocity.rs

use crate::types::StateCovariance;
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

// --- Constant Velocity Model ---
// The object keeps its velocity between measurements; unmodeled acceleration
// along each axis is white noise with variance `noise_ax` / `noise_ay`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstantVelocityModel {
    /// Acceleration noise variance along X (m²/s⁴).
    pub noise_ax: f64,
    /// Acceleration noise variance along Y (m²/s⁴).
    pub noise_ay: f64,
}

impl Default for ConstantVelocityModel {
    fn default() -> Self {
        Self {
            noise_ax: 9.0,
            noise_ay: 9.0,
        }
    }
}

impl ConstantVelocityModel {
    pub fn new(noise_ax: f64, noise_ay: f64) -> Self {
        Self { noise_ax, noise_ay }
    }

    /// State transition `F(dt)` for `[px, py, vx, vy]`.
    pub fn transition_matrix(&self, dt: f64) -> Matrix4<f64> {
        #[rustfmt::skip]
        let f = Matrix4::new(
            1.0, 0.0, dt,  0.0,
            0.0, 1.0, 0.0, dt,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        f
    }

    /// Discretized white-noise-acceleration covariance `Q(dt)`.
    /// The X and Y axes are uncorrelated.
    pub fn process_noise(&self, dt: f64) -> StateCovariance {
        let dt_2 = dt * dt;
        let dt_3 = dt_2 * dt;
        let dt_4 = dt_3 * dt;
        let qx = self.noise_ax;
        let qy = self.noise_ay;

        #[rustfmt::skip]
        let q = Matrix4::new(
            dt_4 / 4.0 * qx, 0.0,             dt_3 / 2.0 * qx, 0.0,
            0.0,             dt_4 / 4.0 * qy, 0.0,             dt_3 / 2.0 * qy,
            dt_3 / 2.0 * qx, 0.0,             dt_2 * qx,       0.0,
            0.0,             dt_3 / 2.0 * qy, 0.0,             dt_2 * qy,
        );
        q
    }
}
