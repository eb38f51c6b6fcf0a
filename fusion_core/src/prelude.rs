// fusion_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::estimation::StateEstimator;
pub use crate::models::measurement::MeasurementModel;

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::messages::{EstimateRecord, Measurement, SensorKind, SensorRecord};
pub use crate::types::{StateCovariance, StateVariable, StateVector, Timestamp};

// --- Estimation Algorithms ---
pub use crate::estimation::{FusionEkf, FusionStep, GaussianState, KalmanFilter, StepKind};

// --- Tools ---
pub use crate::accuracy::{calculate_rmse, RmseAccumulator};
pub use crate::config::{ConfigError, FusionConfig};
pub use crate::error::{AccuracyError, FilterError, FusionError, RecordError};
pub use crate::models::measurement::calculate_radar_jacobian;
