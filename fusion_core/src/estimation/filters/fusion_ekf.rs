// fusion_core/src/estimation/filters/fusion_ekf.rs

use crate::config::{ConfigError, FusionConfig};
use crate::error::{FilterError, FusionError};
use crate::estimation::ekf::GaussianState;
use crate::estimation::kalman::KalmanFilter;
use crate::estimation::StateEstimator;
use crate::messages::{Measurement, SensorKind};
use crate::models::dynamics::ConstantVelocityModel;
use crate::models::measurement::{LidarModel, MeasurementModel, RadarModel};
use crate::types::{elapsed_seconds, StateCovariance, StateVariable, StateVector, Timestamp};
use nalgebra::{Vector2, Vector3};
use tracing::{debug, warn};

/// Lifecycle of the orchestrator. Leaves `Uninitialized` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FusionPhase {
    Uninitialized,
    Initialized { previous_timestamp: Timestamp },
}

/// What happened to the filter while processing one measurement.
#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    /// The first accepted measurement seeded the state. No predict/update ran.
    Initialized,
    /// Predict followed by a successful update.
    /// `degenerate_jacobian` marks a radar update linearized at the origin,
    /// which carries no information.
    Updated {
        sensor: SensorKind,
        degenerate_jacobian: bool,
    },
    /// The measurement advanced time, but its sensor is disabled.
    Predicted { sensor: SensorKind },
    /// The update was abandoned; the state is the predicted one.
    UpdateSkipped {
        sensor: SensorKind,
        error: FilterError,
    },
    /// A disabled sensor reported before the filter was initialized.
    Ignored { sensor: SensorKind },
}

/// The result of feeding one measurement to the filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionStep {
    pub estimate: StateVector,
    pub kind: StepKind,
    /// Diagonal entries of `P` that went negative during this step.
    pub negative_variances: Vec<StateVariable>,
}

impl FusionStep {
    /// `true` when the step produced an estimate worth reporting.
    pub fn has_estimate(&self) -> bool {
        !matches!(self.kind, StepKind::Ignored { .. })
    }
}

/// Lidar/radar fusion filter.
///
/// Receives one measurement at a time in timestamp order, initializes from
/// the first one, and afterwards runs a constant-velocity prediction to the
/// measurement time followed by the sensor-specific update.
#[derive(Debug, Clone)]
pub struct FusionEkf {
    config: FusionConfig,
    phase: FusionPhase,
    filter: KalmanFilter,
    dynamics: ConstantVelocityModel,
    lidar: LidarModel,
    radar: RadarModel,
}

impl FusionEkf {
    pub fn new(config: FusionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            phase: FusionPhase::Uninitialized,
            filter: KalmanFilter::new(config.correction_settings()),
            dynamics: config.process,
            lidar: config.lidar_model(),
            radar: config.radar_model(),
            config,
        })
    }

    pub fn phase(&self) -> FusionPhase {
        self.phase
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.phase, FusionPhase::Initialized { .. })
    }

    /// Read-only view of the underlying Kalman filter.
    pub fn filter(&self) -> &KalmanFilter {
        &self.filter
    }

    /// Processes one measurement and returns the resulting estimate.
    ///
    /// A measurement older than the previous accepted one, or one whose gap
    /// to it overflows the timestamp range, is rejected and leaves the filter
    /// untouched.
    pub fn process_measurement(
        &mut self,
        measurement: &Measurement,
    ) -> Result<FusionStep, FusionError> {
        let sensor = measurement.sensor();

        let previous_timestamp = match self.phase {
            FusionPhase::Uninitialized => {
                if !self.sensor_enabled(sensor) {
                    debug!(%sensor, "sensor disabled; waiting for an enabled sensor to initialize");
                    return Ok(self.step(StepKind::Ignored { sensor }));
                }
                self.initialize(measurement);
                return Ok(self.step(StepKind::Initialized));
            }
            FusionPhase::Initialized { previous_timestamp } => previous_timestamp,
        };

        let timestamp = measurement.timestamp();
        if timestamp < previous_timestamp {
            warn!(
                previous = previous_timestamp,
                current = timestamp,
                "rejecting out-of-order measurement"
            );
            return Err(FusionError::NonMonotonicTimestamp {
                previous: previous_timestamp,
                current: timestamp,
            });
        }

        let Some(dt) = elapsed_seconds(previous_timestamp, timestamp) else {
            warn!(
                previous = previous_timestamp,
                current = timestamp,
                "rejecting measurement with an unrepresentable time gap"
            );
            return Err(FusionError::TimestampOverflow {
                previous: previous_timestamp,
                current: timestamp,
            });
        };

        // --- PREDICT: advance the state to the measurement time ---
        self.phase = FusionPhase::Initialized {
            previous_timestamp: timestamp,
        };
        self.filter
            .set_transition(self.dynamics.transition_matrix(dt));
        self.filter.set_process_noise(self.dynamics.process_noise(dt));
        self.filter.predict();

        if !self.sensor_enabled(sensor) {
            return Ok(self.step(StepKind::Predicted { sensor }));
        }

        // --- UPDATE: fuse the measurement with the matching sensor model ---
        let (result, degenerate_jacobian) = match *measurement {
            Measurement::Radar {
                rho, phi, rho_dot, ..
            } => self.update_radar(&Vector3::new(rho, phi, rho_dot)),
            Measurement::Lidar { px, py, .. } => (self.update_lidar(&Vector2::new(px, py)), false),
        };

        let kind = match result {
            Ok(()) => {
                if degenerate_jacobian {
                    debug!(timestamp, "radar Jacobian is zero near the origin; update is uninformative");
                }
                StepKind::Updated {
                    sensor,
                    degenerate_jacobian,
                }
            }
            Err(error) => {
                warn!(%sensor, timestamp, %error, "skipping update; keeping predicted state");
                StepKind::UpdateSkipped { sensor, error }
            }
        };

        Ok(self.step(kind))
    }

    /// Returns the filter to its uninitialized state.
    pub fn reset(&mut self) {
        self.phase = FusionPhase::Uninitialized;
        self.filter = KalmanFilter::new(self.config.correction_settings());
    }

    fn sensor_enabled(&self, sensor: SensorKind) -> bool {
        match sensor {
            SensorKind::Lidar => self.config.use_lidar,
            SensorKind::Radar => self.config.use_radar,
        }
    }

    fn initialize(&mut self, measurement: &Measurement) {
        // Velocity is not observable from a single frame.
        let (px, py) = measurement.position();
        let x0 = StateVector::new(px, py, 0.0, 0.0);

        let position = self.config.initial_position_variance;
        let velocity = self.config.initial_velocity_variance;
        let p0 = StateCovariance::from_diagonal(&StateVector::new(
            position, position, velocity, velocity,
        ));

        self.filter.initialize(x0, p0);
        self.phase = FusionPhase::Initialized {
            previous_timestamp: measurement.timestamp(),
        };
        debug!(sensor = %measurement.sensor(), px, py, "filter initialized");
    }

    fn update_lidar(&mut self, z: &Vector2<f64>) -> Result<(), FilterError> {
        let h = *self.lidar.h_matrix();
        let r = *self.lidar.get_r();
        self.filter.update_linear(z, &h, &r)
    }

    fn update_radar(&mut self, z: &Vector3<f64>) -> (Result<(), FilterError>, bool) {
        // Linearize at the just-predicted state.
        let h_jac = self.radar.calculate_jacobian(self.filter.x());
        let degenerate = h_jac.iter().all(|v| *v == 0.0);
        (self.filter.update_extended(&self.radar, z, &h_jac), degenerate)
    }

    fn step(&self, kind: StepKind) -> FusionStep {
        let state = self.filter.state();
        let negative_variances = state.negative_variances();
        if !negative_variances.is_empty() {
            let names: Vec<&str> = negative_variances.iter().map(|v| v.name()).collect();
            warn!(?names, "covariance has negative variances");
        }
        FusionStep {
            estimate: state.x,
            kind,
            negative_variances,
        }
    }
}

impl Default for FusionEkf {
    fn default() -> Self {
        Self {
            phase: FusionPhase::Uninitialized,
            filter: KalmanFilter::default(),
            dynamics: ConstantVelocityModel::default(),
            lidar: LidarModel::default(),
            radar: RadarModel::default(),
            config: FusionConfig::default(),
        }
    }
}

// --- The Public Trait Implementation ---
impl StateEstimator for FusionEkf {
    fn process(&mut self, measurement: &Measurement) -> Result<FusionStep, FusionError> {
        self.process_measurement(measurement)
    }

    fn get_state(&self) -> Option<&GaussianState> {
        self.is_initialized().then(|| self.filter.state())
    }

    fn reset(&mut self) {
        FusionEkf::reset(self);
    }
}
