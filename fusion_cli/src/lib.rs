// fusion_cli/src/lib.rs

// This module contains the command-line surface of the tracker.
pub mod cli;
pub mod config;
pub mod runner;

pub use config::{load_config, ConfigOverrides, RunConfig};
pub use runner::{format_rmse, run_files, run_stream, RunSummary};
