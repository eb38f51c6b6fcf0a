// fusion_core/src/estimation/kalman.rs

use crate::error::FilterError;
use crate::estimation::ekf::{ekf_correct, ekf_predict, CorrectionSettings, GaussianState};
use crate::models::measurement::MeasurementModel;
use crate::types::{StateCovariance, StateVector, STATE_DIM};
use nalgebra::{SMatrix, SVector};

/// Kalman filter core: the current belief plus the motion model matrices
/// assigned for the next prediction.
///
/// Every step computes a new `GaussianState` and swaps it in. A failed
/// correction leaves the previous value in place.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    state: GaussianState,
    /// State transition matrix (F).
    f: StateCovariance,
    /// Process noise covariance (Q).
    q: StateCovariance,
    settings: CorrectionSettings,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new(CorrectionSettings::default())
    }
}

impl KalmanFilter {
    pub fn new(settings: CorrectionSettings) -> Self {
        Self {
            state: GaussianState::default(),
            f: StateCovariance::identity(),
            q: StateCovariance::zeros(),
            settings,
        }
    }

    pub fn initialize(&mut self, x0: StateVector, p0: StateCovariance) {
        self.state = GaussianState::new(x0, p0);
    }

    pub fn state(&self) -> &GaussianState {
        &self.state
    }

    pub fn x(&self) -> &StateVector {
        &self.state.x
    }

    pub fn covariance(&self) -> &StateCovariance {
        &self.state.covariance
    }

    pub fn set_transition(&mut self, f: StateCovariance) {
        self.f = f;
    }

    pub fn set_process_noise(&mut self, q: StateCovariance) {
        self.q = q;
    }

    /// `x = F·x`, `P = F·P·Fᵀ + Q` using the currently assigned `F` and `Q`.
    pub fn predict(&mut self) {
        self.state = ekf_predict(&self.state, &self.f, &self.q);
    }

    /// Linear update with innovation `y = z - H·x`.
    pub fn update_linear<const M: usize>(
        &mut self,
        z: &SVector<f64, M>,
        h: &SMatrix<f64, M, STATE_DIM>,
        r: &SMatrix<f64, M, M>,
    ) -> Result<(), FilterError> {
        let y = z - h * self.state.x;
        self.state = ekf_correct(&self.state, &y, h, r, &self.settings)?;
        Ok(())
    }

    /// Extended update for a nonlinear sensor.
    ///
    /// The innovation is `z - h(x)` formed by the model (which also wraps any
    /// angular residuals). `h_jacobian` must be the model's Jacobian evaluated
    /// at the current, pre-update state.
    pub fn update_extended<const M: usize, Model: MeasurementModel<M>>(
        &mut self,
        model: &Model,
        z: &SVector<f64, M>,
        h_jacobian: &SMatrix<f64, M, STATE_DIM>,
    ) -> Result<(), FilterError> {
        let z_pred = model.predict_measurement(&self.state.x);
        let y = model.residual(z, &z_pred);
        self.state = ekf_correct(&self.state, &y, h_jacobian, model.get_r(), &self.settings)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::measurement::{calculate_radar_jacobian, RadarModel};
    use approx::assert_abs_diff_eq;
    use nalgebra::{Matrix2, Matrix2x4, Vector2, Vector3};
    use std::f64::consts::PI;

    fn initialized(x: StateVector) -> KalmanFilter {
        let mut kf = KalmanFilter::default();
        kf.initialize(
            x,
            StateCovariance::from_diagonal(&StateVector::new(1.0, 1.0, 1000.0, 1000.0)),
        );
        kf
    }

    #[test]
    fn predict_uses_assigned_matrices() {
        let mut kf = initialized(StateVector::new(1.0, 2.0, 3.0, 4.0));
        kf.set_transition(StateCovariance::new(
            1.0, 0.0, 0.5, 0.0, //
            0.0, 1.0, 0.0, 0.5, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ));
        kf.set_process_noise(StateCovariance::identity() * 0.1);
        kf.predict();

        assert_abs_diff_eq!(*kf.x(), StateVector::new(2.5, 4.0, 3.0, 4.0), epsilon = 1e-12);
        // 1 + 0.25 * 1000 + 0.1
        assert_abs_diff_eq!(kf.covariance()[(0, 0)], 251.1, epsilon = 1e-9);
    }

    #[test]
    fn failed_update_keeps_the_previous_state() {
        let mut kf = initialized(StateVector::new(1.0, 1.0, 0.0, 0.0));
        let before = *kf.state();

        let h = Matrix2x4::zeros();
        let r = Matrix2::zeros();
        let result = kf.update_linear(&Vector2::new(5.0, 5.0), &h, &r);

        assert!(result.is_err());
        assert_eq!(*kf.state(), before);
    }

    #[test]
    fn extended_update_wraps_bearing_residual() {
        // Target just below the negative x axis, measurement just above it.
        let x = StateVector::new(-10.0, -0.1, 0.0, 0.0);
        let mut kf = initialized(x);
        let radar = RadarModel::default();

        let z = Vector3::new(10.0, PI - 0.005, 0.0);
        let h_jac = calculate_radar_jacobian(kf.x());
        kf.update_extended(&radar, &z, &h_jac).unwrap();

        // A naive residual of ~2π would throw the estimate far away.
        assert!((kf.x()[0] + 10.0).abs() < 0.5);
        assert!(kf.x()[1] > -0.1 && kf.x()[1] < 0.1);
    }

    #[test]
    fn zero_jacobian_yields_no_correction() {
        let mut kf = initialized(StateVector::new(0.0, 0.0, 1.0, 1.0));
        let before = *kf.state();
        let radar = RadarModel::default();

        let h_jac = calculate_radar_jacobian(kf.x());
        kf.update_extended(&radar, &Vector3::new(1.0, 0.3, 0.2), &h_jac)
            .unwrap();

        assert_eq!(kf.x(), &before.x);
        assert_eq!(kf.covariance(), &before.covariance);
    }
}
