// fusion_core/src/accuracy.rs

//! Root-mean-square error between estimates and ground truth, computed
//! independently for each state dimension.

use crate::error::AccuracyError;
use crate::types::StateVector;

/// RMSE of `estimates` against `ground_truths`, one value per state entry.
///
/// Both slices must be non-empty and of equal length.
pub fn calculate_rmse(
    estimates: &[StateVector],
    ground_truths: &[StateVector],
) -> Result<StateVector, AccuracyError> {
    if estimates.is_empty() || estimates.len() != ground_truths.len() {
        return Err(AccuracyError::InvalidAccuracyInput {
            estimates: estimates.len(),
            ground_truths: ground_truths.len(),
        });
    }

    let mut accumulator = RmseAccumulator::default();
    for (estimate, truth) in estimates.iter().zip(ground_truths) {
        accumulator.push(estimate, truth);
    }
    accumulator.rmse()
}

/// Streaming form of [`calculate_rmse`]: keeps only the running sum of
/// squared residuals.
#[derive(Debug, Clone)]
pub struct RmseAccumulator {
    squared_sum: StateVector,
    count: usize,
}

impl Default for RmseAccumulator {
    fn default() -> Self {
        Self {
            squared_sum: StateVector::zeros(),
            count: 0,
        }
    }
}

impl RmseAccumulator {
    pub fn push(&mut self, estimate: &StateVector, truth: &StateVector) {
        let residual = estimate - truth;
        self.squared_sum += residual.component_mul(&residual);
        self.count += 1;
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn rmse(&self) -> Result<StateVector, AccuracyError> {
        if self.count == 0 {
            return Err(AccuracyError::InvalidAccuracyInput {
                estimates: 0,
                ground_truths: 0,
            });
        }
        Ok((self.squared_sum / self.count as f64).map(f64::sqrt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn identical_sequences_have_zero_error() {
        let xs = vec![
            StateVector::new(1.0, 2.0, 3.0, 4.0),
            StateVector::new(-1.0, 0.5, 0.0, 9.0),
        ];
        assert_eq!(calculate_rmse(&xs, &xs).unwrap(), StateVector::zeros());
    }

    #[test]
    fn per_dimension_rmse() {
        let estimates = vec![
            StateVector::new(1.0, 0.0, 0.0, 0.0),
            StateVector::new(3.0, 0.0, 0.0, 2.0),
        ];
        let truths = vec![StateVector::zeros(), StateVector::zeros()];
        let rmse = calculate_rmse(&estimates, &truths).unwrap();

        assert_abs_diff_eq!(rmse[0], (5.0_f64).sqrt(), epsilon = 1e-12);
        assert_eq!(rmse[1], 0.0);
        assert_eq!(rmse[2], 0.0);
        assert_abs_diff_eq!(rmse[3], (2.0_f64).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn empty_or_mismatched_input_is_rejected() {
        assert_eq!(
            calculate_rmse(&[], &[]),
            Err(AccuracyError::InvalidAccuracyInput {
                estimates: 0,
                ground_truths: 0
            })
        );

        let one = vec![StateVector::zeros()];
        let two = vec![StateVector::zeros(), StateVector::zeros()];
        assert_eq!(
            calculate_rmse(&one, &two),
            Err(AccuracyError::InvalidAccuracyInput {
                estimates: 1,
                ground_truths: 2
            })
        );
    }

    #[test]
    fn accumulator_matches_batch_result() {
        let estimates = vec![
            StateVector::new(0.5, 1.5, 2.0, -1.0),
            StateVector::new(0.1, 1.1, 2.2, -0.8),
            StateVector::new(0.0, 0.9, 1.9, -1.2),
        ];
        let truths = vec![
            StateVector::new(0.4, 1.4, 2.1, -1.0),
            StateVector::new(0.2, 1.0, 2.0, -1.0),
            StateVector::new(0.0, 1.0, 2.0, -1.0),
        ];

        let mut acc = RmseAccumulator::default();
        assert!(acc.rmse().is_err());
        for (e, t) in estimates.iter().zip(&truths) {
            acc.push(e, t);
        }
        assert_eq!(acc.len(), 3);
        assert_abs_diff_eq!(
            acc.rmse().unwrap(),
            calculate_rmse(&estimates, &truths).unwrap(),
            epsilon = 1e-15
        );
    }
}
