//! Configuration module for paramtune.
//!
//! Structured loading from environment variables (optimizer knobs,
//! observability) plus TOML files for score weights and starting parameters.

mod observability_config;
mod optimizer_env_config;

pub use observability_config::ObservabilityEnvConfig;
pub use optimizer_env_config::OptimizerEnvConfig;

use crate::domain::optimization::{BoundsRegistry, ParameterSet, ScoreWeights};
use anyhow::{Context, Result};
use std::path::Path;

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub optimizer: OptimizerEnvConfig,
    pub observability: ObservabilityEnvConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            optimizer: OptimizerEnvConfig::from_env()?,
            observability: ObservabilityEnvConfig::from_env(),
        })
    }
}

/// Load score weights from a TOML file; missing keys keep their defaults
pub fn load_score_weights(path: &Path) -> Result<ScoreWeights> {
    let content = std::fs::read_to_string(path)
        .context(format!("Failed to read weights file: {}", path.display()))?;
    let weights: ScoreWeights = toml::from_str(&content)
        .context(format!("Failed to parse weights file: {}", path.display()))?;
    weights.validate()?;
    Ok(weights)
}

/// Load a starting parameter set from a TOML file and check it against `bounds`
pub fn load_parameter_set(path: &Path, bounds: &BoundsRegistry) -> Result<ParameterSet> {
    let content = std::fs::read_to_string(path)
        .context(format!("Failed to read parameters file: {}", path.display()))?;
    let params: ParameterSet = toml::from_str(&content)
        .context(format!("Failed to parse parameters file: {}", path.display()))?;
    params
        .validate(bounds)
        .context(format!("Invalid parameters in {}", path.display()))?;
    Ok(params)
}
