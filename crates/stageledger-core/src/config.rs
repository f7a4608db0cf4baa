//! Engine configuration
//!
//! Formula parameters are read once (defaults or `config.toml`) and frozen
//! into a [`CostModel`](crate::cost::CostModel). Changing them means building
//! a new model, which also starts with an empty cache.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Cost formula and engine tuning parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Flat amount added to every event before the per-m² part
    pub base_cost: f64,
    /// Rate per m² up to and including `rate_threshold_sqm`
    pub small_stage_rate: f64,
    /// Rate per m² above `rate_threshold_sqm`
    pub large_stage_rate: f64,
    pub rate_threshold_sqm: f64,
    /// Fraction of the total cost kept by the coordinator (0.10 = 10%)
    pub coordinator_percentage: f64,
    /// Fixed per-event certification fee
    pub certification_fee: f64,
    /// Total cost and coordinator share are rounded to multiples of this
    pub rounding_quantum: f64,
    /// Max entries per memo cache
    pub cache_capacity: u64,
    /// Events per task in concurrent aggregation
    pub concurrency_chunk_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_cost: 100.0,
            small_stage_rate: 6.0,
            large_stage_rate: 5.5,
            rate_threshold_sqm: 70.0,
            coordinator_percentage: 0.10,
            certification_fee: 50.0,
            rounding_quantum: 10.0,
            cache_capacity: 1000,
            concurrency_chunk_size: 256,
        }
    }
}

impl EngineConfig {
    /// Default location: `<config_dir>/stageledger/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stageledger").join("config.toml"))
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                CoreError::FileRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let config: EngineConfig = toml::from_str(&content).map_err(|e| CoreError::TomlParse {
            path: path.to_path_buf(),
            message: e.to_string(),
            source: e,
        })?;

        config.validate()?;
        info!(path = %path.display(), "Loaded engine config");
        Ok(config)
    }

    /// Explicit path must exist; the default path is optional
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, CoreError> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(default) if default.exists() => Self::load(&default),
            _ => {
                debug!("No config file found, using built-in formula parameters");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let amounts = [
            ("base_cost", self.base_cost),
            ("small_stage_rate", self.small_stage_rate),
            ("large_stage_rate", self.large_stage_rate),
            ("rate_threshold_sqm", self.rate_threshold_sqm),
            ("certification_fee", self.certification_fee),
        ];
        for (name, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::InvalidConfig {
                    message: format!("{} must be a finite non-negative number, got {}", name, value),
                });
            }
        }

        if !(0.0..=1.0).contains(&self.coordinator_percentage) {
            return Err(CoreError::InvalidConfig {
                message: format!(
                    "coordinator_percentage must be within 0..=1, got {}",
                    self.coordinator_percentage
                ),
            });
        }

        if !self.rounding_quantum.is_finite() || self.rounding_quantum <= 0.0 {
            return Err(CoreError::InvalidConfig {
                message: format!("rounding_quantum must be positive, got {}", self.rounding_quantum),
            });
        }

        if self.concurrency_chunk_size == 0 {
            return Err(CoreError::InvalidConfig {
                message: "concurrency_chunk_size must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}
