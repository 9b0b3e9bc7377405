//! Optimizer configuration parsing from environment variables.
//!
//! This module handles loading the runner knobs: seed, starting and target
//! score, history depth, score noise and perturbation intensity.

use crate::application::optimization::OptimizerSettings;
use crate::domain::errors::ConfigurationError;
use crate::domain::optimization::optimization_history::DEFAULT_HISTORY_CAPACITY;
use crate::domain::optimization::scoring::{MAX_SCORE, MIN_SCORE};
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Optimizer environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerEnvConfig {
    /// `None` seeds from OS entropy
    pub seed: Option<u64>,
    pub initial_score: f64,
    pub target_score: f64,
    pub history_capacity: usize,
    /// Half-width of the uniform noise added to each score
    pub score_noise: f64,
    pub intensity: f64,
}

impl Default for OptimizerEnvConfig {
    fn default() -> Self {
        Self {
            seed: None,
            initial_score: 87.5,
            target_score: 95.0,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            score_noise: 2.0,
            intensity: 1.0,
        }
    }
}

impl OptimizerEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Parse from an arbitrary key lookup; `from_env` passes `std::env::var`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let seed = match lookup("OPTIMIZER_SEED") {
            Some(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<u64>()
                    .context("Failed to parse OPTIMIZER_SEED")?,
            ),
            _ => None,
        };

        let config = Self {
            seed,
            initial_score: Self::parse(&lookup, "OPTIMIZER_INITIAL_SCORE", defaults.initial_score)?,
            target_score: Self::parse(&lookup, "OPTIMIZER_TARGET_SCORE", defaults.target_score)?,
            history_capacity: Self::parse(
                &lookup,
                "OPTIMIZER_HISTORY_CAPACITY",
                defaults.history_capacity,
            )?,
            score_noise: Self::parse(&lookup, "OPTIMIZER_SCORE_NOISE", defaults.score_noise)?,
            intensity: Self::parse(&lookup, "OPTIMIZER_INTENSITY", defaults.intensity)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// `ConfigurationError::InvalidValue` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let score_range = MIN_SCORE..=MAX_SCORE;
        if !score_range.contains(&self.initial_score) {
            return Err(invalid("OPTIMIZER_INITIAL_SCORE", self.initial_score));
        }
        if !score_range.contains(&self.target_score) {
            return Err(invalid("OPTIMIZER_TARGET_SCORE", self.target_score));
        }
        if self.history_capacity == 0 {
            return Err(invalid("OPTIMIZER_HISTORY_CAPACITY", self.history_capacity));
        }
        if !self.score_noise.is_finite() || self.score_noise < 0.0 {
            return Err(invalid("OPTIMIZER_SCORE_NOISE", self.score_noise));
        }
        if !self.intensity.is_finite() || self.intensity <= 0.0 {
            return Err(invalid("OPTIMIZER_INTENSITY", self.intensity));
        }
        Ok(())
    }

    pub fn settings(&self) -> OptimizerSettings {
        OptimizerSettings {
            initial_score: self.initial_score,
            target_score: self.target_score,
            history_capacity: self.history_capacity,
            intensity: self.intensity,
        }
    }

    fn parse<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
    where
        T: FromStr + ToString,
        T::Err: std::error::Error + Send + Sync + 'static,
        F: Fn(&str) -> Option<String>,
    {
        lookup(key)
            .unwrap_or_else(|| default.to_string())
            .trim()
            .parse::<T>()
            .context(format!("Failed to parse {}", key))
    }
}

fn invalid(key: &str, value: impl ToString) -> ConfigurationError {
    ConfigurationError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
