// fusion_core/src/config.rs

//! Tuning parameters for the fusion filter. All values default to the
//! reference tuning for the lidar/radar pedestrian tracking data set.

use crate::estimation::ekf::{CorrectionSettings, CovarianceUpdate};
use crate::models::dynamics::ConstantVelocityModel;
use crate::models::measurement::{LidarModel, RadarModel};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("'{field}' must be a finite, non-negative number (got {value})")]
    InvalidNoise { field: &'static str, value: f64 },

    #[error("'{field}' must be a finite, positive number (got {value})")]
    InvalidVariance { field: &'static str, value: f64 },

    #[error("at least one of 'use_lidar' or 'use_radar' must be enabled")]
    NoSensorsEnabled,
}

/// Everything the fusion orchestrator needs at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Diagonal of the lidar `R` matrix: `[σ²_px, σ²_py]`.
    pub lidar_noise: [f64; 2],
    /// Diagonal of the radar `R` matrix: `[σ²_rho, σ²_phi, σ²_rho_dot]`.
    pub radar_noise: [f64; 3],
    /// Initial variance of the position entries of `P`.
    pub initial_position_variance: f64,
    /// Initial variance of the velocity entries of `P`.
    pub initial_velocity_variance: f64,
    pub use_lidar: bool,
    pub use_radar: bool,
    pub covariance_update: CovarianceUpdate,
    /// Upper bound on the `‖S‖_F·‖S⁻¹‖_F` estimate before an update is skipped.
    ///
    /// This is an absolute limit, not scaled by `R`. After very long gaps
    /// between records (around 10³ s) the predicted position variance grows so
    /// large that the range and range-rate rows of the radar `S` become nearly
    /// collinear, and the default `1e12` skips updates that would otherwise be
    /// applied. Raise it when such gaps are expected.
    pub max_condition_number: f64,
    /// Process noise of the constant-velocity motion model.
    pub process: ConstantVelocityModel,
}

impl Default for FusionConfig {
    fn default() -> Self {
        let correction = CorrectionSettings::default();
        Self {
            lidar_noise: [0.0225, 0.0225],
            radar_noise: [0.09, 0.0009, 0.09],
            initial_position_variance: 1.0,
            initial_velocity_variance: 1000.0,
            use_lidar: true,
            use_radar: true,
            covariance_update: correction.covariance_update,
            max_condition_number: correction.max_condition_number,
            process: ConstantVelocityModel::default(),
        }
    }
}

impl FusionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let noise = [
            ("process.noise_ax", self.process.noise_ax),
            ("process.noise_ay", self.process.noise_ay),
            ("lidar_noise[0]", self.lidar_noise[0]),
            ("lidar_noise[1]", self.lidar_noise[1]),
            ("radar_noise[0]", self.radar_noise[0]),
            ("radar_noise[1]", self.radar_noise[1]),
            ("radar_noise[2]", self.radar_noise[2]),
        ];
        for (field, value) in noise {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidNoise { field, value });
            }
        }

        let positive = [
            ("initial_position_variance", self.initial_position_variance),
            ("initial_velocity_variance", self.initial_velocity_variance),
            ("max_condition_number", self.max_condition_number),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidVariance { field, value });
            }
        }

        if !self.use_lidar && !self.use_radar {
            return Err(ConfigError::NoSensorsEnabled);
        }
        Ok(())
    }

    pub fn correction_settings(&self) -> CorrectionSettings {
        CorrectionSettings {
            covariance_update: self.covariance_update,
            max_condition_number: self.max_condition_number,
        }
    }

    pub fn lidar_model(&self) -> LidarModel {
        LidarModel::new(self.lidar_noise)
    }

    pub fn radar_model(&self) -> RadarModel {
        RadarModel::new(self.radar_noise)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_reference_values() {
        let config = FusionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.process.noise_ax, 9.0);
        assert_eq!(config.process.noise_ay, 9.0);
        assert_eq!(config.lidar_noise, [0.0225, 0.0225]);
        assert_eq!(config.radar_noise, [0.09, 0.0009, 0.09]);
    }

    #[test]
    fn rejects_negative_noise() {
        let mut config = FusionConfig::default();
        config.radar_noise[1] = -1.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidNoise {
                field: "radar_noise[1]",
                value: -1.0
            })
        );
    }

    #[test]
    fn rejects_disabling_every_sensor() {
        let config = FusionConfig {
            use_lidar: false,
            use_radar: false,
            ..FusionConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoSensorsEnabled));
    }
}
