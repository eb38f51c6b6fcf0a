// fusion_core/src/models/dynamics/mod.rs

pub mod constant_velocity;

pub use constant_velocity::ConstantVelocityModel;
