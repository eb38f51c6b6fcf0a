// fusion_core/src/estimation/ekf.rs

use crate::error::FilterError;
use crate::types::{StateCovariance, StateVariable, StateVector, STATE_DIM};
use nalgebra::{SMatrix, SVector};
use serde::{Deserialize, Serialize};

/// The Gaussian belief held by the filter: mean `x` and covariance `P`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianState {
    pub x: StateVector,
    pub covariance: StateCovariance,
}

impl Default for GaussianState {
    fn default() -> Self {
        Self {
            x: StateVector::zeros(),
            covariance: StateCovariance::identity(),
        }
    }
}

impl GaussianState {
    pub fn new(x: StateVector, covariance: StateCovariance) -> Self {
        Self { x, covariance }
    }

    /// State variables whose variance has drifted below zero.
    pub fn negative_variances(&self) -> Vec<StateVariable> {
        StateVariable::ALL
            .into_iter()
            .filter(|v| self.covariance[(v.index(), v.index())] < 0.0)
            .collect()
    }
}

/// How the corrected covariance is formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CovarianceUpdate {
    /// `P = (I - K·H)·P`
    #[default]
    Standard,
    /// `P = (I - K·H)·P·(I - K·H)ᵀ + K·R·Kᵀ`, which keeps `P` symmetric PSD.
    Joseph,
}

/// Parameters of the shared correction step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectionSettings {
    pub covariance_update: CovarianceUpdate,
    /// Innovation covariances with a larger condition estimate are rejected.
    /// See `FusionConfig::max_condition_number` for long-gap behavior.
    pub max_condition_number: f64,
}

impl Default for CorrectionSettings {
    fn default() -> Self {
        Self {
            covariance_update: CovarianceUpdate::Standard,
            max_condition_number: 1.0e12,
        }
    }
}

/// PURE FUNCTION: Performs one prediction step.
/// `x = F·x`, `P = F·P·Fᵀ + Q`.
pub fn ekf_predict(
    current: &GaussianState,
    f: &StateCovariance,
    q: &StateCovariance,
) -> GaussianState {
    GaussianState {
        x: f * current.x,
        covariance: f * current.covariance * f.transpose() + q,
    }
}

/// PURE FUNCTION: The correction shared by the linear and extended updates.
///
/// Takes the predicted state and an already-formed innovation `y`, and returns
/// the corrected state. Fails without producing a state when the innovation
/// covariance cannot be inverted safely.
pub fn ekf_correct<const M: usize>(
    predicted: &GaussianState,
    y: &SVector<f64, M>,
    h: &SMatrix<f64, M, STATE_DIM>,
    r: &SMatrix<f64, M, M>,
    settings: &CorrectionSettings,
) -> Result<GaussianState, FilterError> {
    let p = &predicted.covariance;
    let ht = h.transpose();

    let s = h * p * ht + r;
    let s_inv = invert_innovation_covariance(s, settings.max_condition_number)?;
    let k_gain = p * ht * s_inv;

    let x = predicted.x + k_gain * y;
    let i_kh = StateCovariance::identity() - k_gain * h;
    let covariance = match settings.covariance_update {
        CovarianceUpdate::Standard => i_kh * p,
        CovarianceUpdate::Joseph => i_kh * p * i_kh.transpose() + k_gain * r * k_gain.transpose(),
    };

    Ok(GaussianState { x, covariance })
}

/// Inverts `S`, rejecting non-finite, singular and ill-conditioned matrices.
/// The condition number is estimated as `‖S‖_F · ‖S⁻¹‖_F`.
fn invert_innovation_covariance<const M: usize>(
    s: SMatrix<f64, M, M>,
    max_condition_number: f64,
) -> Result<SMatrix<f64, M, M>, FilterError> {
    let singular = FilterError::DegenerateInnovationCovariance { condition: None };

    if !s.iter().all(|v| v.is_finite()) {
        return Err(singular);
    }
    let s_inv = s.try_inverse().ok_or_else(|| singular.clone())?;
    if !s_inv.iter().all(|v| v.is_finite()) {
        return Err(singular);
    }

    let condition = s.norm() * s_inv.norm();
    if !condition.is_finite() || condition > max_condition_number {
        return Err(FilterError::DegenerateInnovationCovariance {
            condition: Some(condition),
        });
    }

    Ok(s_inv)
}
