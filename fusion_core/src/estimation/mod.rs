// fusion_core/src/estimation/mod.rs

use crate::error::FusionError;
use crate::messages::Measurement;

pub mod ekf;
pub mod filters;
pub mod kalman;

pub use ekf::{CorrectionSettings, CovarianceUpdate, GaussianState};
pub use filters::fusion_ekf::{FusionEkf, FusionPhase, FusionStep, StepKind};
pub use kalman::KalmanFilter;

/// The contract for any algorithm that performs the "State Estimator" role.
/// Its sole responsibility is to estimate the state of a single target.
pub trait StateEstimator: Send + Sync {
    /// Feeds one measurement, in timestamp order, and reports the outcome.
    fn process(&mut self, measurement: &Measurement) -> Result<FusionStep, FusionError>;

    /// Returns the current belief, or `None` before the first accepted measurement.
    fn get_state(&self) -> Option<&GaussianState>;

    /// Discards the current belief.
    fn reset(&mut self);
}
