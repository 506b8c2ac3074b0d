/*!
 * Configuration Module
 * Simulation settings, JSON loading and start-up validation
 */

mod types;
mod validation;

pub use types::{
    CoreConfig, CpuConfig, IoConfig, MemoryConfig, ProcessConfig, SimulationConfig,
};

use crate::core::errors::{ConfigError, SimResult};
use std::path::Path;

impl SimulationConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(Self::from_json_str(&raw)?)
    }
}
