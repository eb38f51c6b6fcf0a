// fusion_core/src/utils/mod.rs

pub mod angles;

pub use angles::normalize_angle;
