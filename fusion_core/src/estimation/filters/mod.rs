// fusion_core/src/estimation/filters/mod.rs

pub mod fusion_ekf;
