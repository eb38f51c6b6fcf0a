use clap::Parser;
use std::path::PathBuf;

use crate::config::ConfigOverrides;

/// fusion-ekf: lidar/radar Extended Kalman Filter tracker.
///
/// Reads a measurement log, writes one estimate line per accepted record,
/// and prints the RMSE against the ground truth carried in the log.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The measurement log to process.
    #[arg(short, long, required_unless_present = "print_config")]
    pub input: Option<PathBuf>,

    /// Where to write the estimate records. Nothing is written when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Optional TOML file with a `[filter]` table overriding the defaults.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Acceleration noise variance along X.
    #[arg(long)]
    pub noise_ax: Option<f64>,

    /// Acceleration noise variance along Y.
    #[arg(long)]
    pub noise_ay: Option<f64>,

    /// Fuse lidar records only (radar records still advance time).
    #[arg(long, default_value_t = false, conflicts_with = "radar_only")]
    pub lidar_only: bool,

    /// Fuse radar records only (lidar records still advance time).
    #[arg(long, default_value_t = false)]
    pub radar_only: bool,

    /// Use the Joseph form for the covariance update.
    #[arg(long, default_value_t = false)]
    pub joseph: bool,

    /// Print the effective configuration as TOML and exit.
    #[arg(long, default_value_t = false)]
    pub print_config: bool,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            noise_ax: self.noise_ax,
            noise_ay: self.noise_ay,
            lidar_only: self.lidar_only,
            radar_only: self.radar_only,
            joseph: self.joseph,
        }
    }
}
