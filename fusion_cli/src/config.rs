// fusion_cli/src/config.rs

//! Layered run configuration: built-in defaults, then an optional TOML file,
//! then command-line overrides.

use anyhow::{bail, Context, Result};
use figment::{
    providers::{Format, Serialized, Toml},
    Figment,
};
use fusion_core::estimation::CovarianceUpdate;
use fusion_core::prelude::FusionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub filter: FusionConfig,
}

/// Command-line values that take precedence over every file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub noise_ax: Option<f64>,
    pub noise_ay: Option<f64>,
    pub lidar_only: bool,
    pub radar_only: bool,
    pub joseph: bool,
}

impl ConfigOverrides {
    fn apply(&self, filter: &mut FusionConfig) {
        if let Some(noise_ax) = self.noise_ax {
            filter.process.noise_ax = noise_ax;
        }
        if let Some(noise_ay) = self.noise_ay {
            filter.process.noise_ay = noise_ay;
        }
        if self.lidar_only {
            filter.use_lidar = true;
            filter.use_radar = false;
        }
        if self.radar_only {
            filter.use_lidar = false;
            filter.use_radar = true;
        }
        if self.joseph {
            filter.covariance_update = CovarianceUpdate::Joseph;
        }
    }
}

pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<RunConfig> {
    let mut figment = Figment::from(Serialized::defaults(RunConfig::default()));

    if let Some(path) = path {
        if !path.is_file() {
            bail!("config file not found: {}", path.display());
        }
        info!("Loading configuration from: {}", path.display());
        figment = figment.merge(Toml::file(path));
    }

    let mut config: RunConfig = figment
        .extract()
        .context("failed to load or parse the configuration")?;

    overrides.apply(&mut config.filter);
    config
        .filter
        .validate()
        .context("invalid filter configuration")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_a_file() {
        let config = load_config(None, &ConfigOverrides::default()).unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn overrides_win() {
        let overrides = ConfigOverrides {
            noise_ax: Some(4.0),
            radar_only: true,
            joseph: true,
            ..ConfigOverrides::default()
        };
        let config = load_config(None, &overrides).unwrap();

        assert_eq!(config.filter.process.noise_ax, 4.0);
        assert_eq!(config.filter.process.noise_ay, 9.0);
        assert!(!config.filter.use_lidar);
        assert!(config.filter.use_radar);
        assert_eq!(config.filter.covariance_update, CovarianceUpdate::Joseph);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let overrides = ConfigOverrides {
            noise_ay: Some(f64::NAN),
            ..ConfigOverrides::default()
        };
        assert!(load_config(None, &overrides).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_config(
            Some(Path::new("/definitely/not/here.toml")),
            &ConfigOverrides::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
