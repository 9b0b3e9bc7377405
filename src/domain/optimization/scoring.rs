//! Composite quality score for a parameter set.
//!
//! The formula is a placeholder objective behind the `ScoreEvaluator` trait.
//! What callers may rely on: the score is in `[0, 100]`, it rises with
//! `commission_rate` and `burn_allocation`, and it falls as `max_daily_loss`
//! grows. Exact constants are not a contract.

use super::parameters::{Parameter, ParameterSet};
use super::random::RandomSource;
use crate::domain::errors::{ConfigurationError, OptimizationError};
use serde::{Deserialize, Serialize};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

// Reference points that map a raw value onto a 0-100 term
const COMMISSION_REFERENCE: f64 = 0.025;
const BURN_REFERENCE: f64 = 0.30;
const TREASURY_REFERENCE: f64 = 0.80;
const DAILY_LOSS_REFERENCE: f64 = 0.08;
const REWARD_RISK_SCALE: f64 = 25.0;
const REACTION_PENALTY_PER_SECOND: f64 = 25.0;

/// Pluggable objective: `ParameterSet -> [0, 100]`
pub trait ScoreEvaluator: Send + Sync {
    fn name(&self) -> &str;

    /// Score a parameter set. The random source feeds any stochastic term.
    ///
    /// # Errors
    ///
    /// Fails when the set contains non-finite values or the objective
    /// cannot produce a finite score.
    fn score(
        &self,
        params: &ParameterSet,
        rng: &mut dyn RandomSource,
    ) -> Result<f64, OptimizationError>;
}

/// Relative weight of each component term
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub commission: f64,
    pub burn: f64,
    pub treasury: f64,
    pub execution: f64,
    pub loss_headroom: f64,
    pub confidence: f64,
    pub reward_risk: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            commission: 0.20,
            burn: 0.20,
            treasury: 0.10,
            execution: 0.10,
            loss_headroom: 0.20,
            confidence: 0.10,
            reward_risk: 0.10,
        }
    }
}

impl ScoreWeights {
    fn entries(&self) -> [(&'static str, f64); 7] {
        [
            ("commission", self.commission),
            ("burn", self.burn),
            ("treasury", self.treasury),
            ("execution", self.execution),
            ("loss_headroom", self.loss_headroom),
            ("confidence", self.confidence),
            ("reward_risk", self.reward_risk),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (field, value) in self.entries() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidWeight {
                    field: field.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }

    pub fn total(&self) -> f64 {
        self.entries().iter().map(|(_, w)| w).sum()
    }
}

/// Per-component terms, each on a 0-100 scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub commission: f64,
    pub burn: f64,
    pub treasury: f64,
    pub execution: f64,
    pub loss_headroom: f64,
    pub confidence: f64,
    pub reward_risk: f64,
}

impl ScoreBreakdown {
    pub fn from_params(params: &ParameterSet) -> Self {
        let reward_risk = if params.stop_loss > 0.0 {
            params.take_profit / params.stop_loss * REWARD_RISK_SCALE
        } else {
            0.0
        };
        let reaction_seconds = params.reaction_time_ms / 1000.0;

        Self {
            commission: percent_of(params.commission_rate, COMMISSION_REFERENCE),
            burn: percent_of(params.burn_allocation, BURN_REFERENCE),
            treasury: percent_of(params.treasury_allocation, TREASURY_REFERENCE),
            execution: (MAX_SCORE - (reaction_seconds - 1.0) * REACTION_PENALTY_PER_SECOND)
                .clamp(MIN_SCORE, MAX_SCORE),
            loss_headroom: ((1.0 - params.max_daily_loss / DAILY_LOSS_REFERENCE) * MAX_SCORE)
                .clamp(MIN_SCORE, MAX_SCORE),
            confidence: (params.ai_min_confidence * MAX_SCORE).clamp(MIN_SCORE, MAX_SCORE),
            reward_risk: reward_risk.clamp(MIN_SCORE, MAX_SCORE),
        }
    }

    /// Weighted mean of the terms; 0 when every weight is 0
    pub fn weighted(&self, weights: &ScoreWeights) -> f64 {
        let total = weights.total();
        if total <= 0.0 {
            return MIN_SCORE;
        }

        (self.commission * weights.commission
            + self.burn * weights.burn
            + self.treasury * weights.treasury
            + self.execution * weights.execution
            + self.loss_headroom * weights.loss_headroom
            + self.confidence * weights.confidence
            + self.reward_risk * weights.reward_risk)
            / total
    }
}

fn percent_of(value: f64, reference: f64) -> f64 {
    (value / reference * MAX_SCORE).clamp(MIN_SCORE, MAX_SCORE)
}

/// Default evaluator: weighted component terms plus bounded measurement noise
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeScoreEvaluator {
    weights: ScoreWeights,
    noise_amplitude: f64,
}

impl CompositeScoreEvaluator {
    /// # Errors
    ///
    /// `InvalidWeight` for negative or non-finite weights or noise amplitude.
    pub fn new(weights: ScoreWeights, noise_amplitude: f64) -> Result<Self, ConfigurationError> {
        weights.validate()?;
        if !noise_amplitude.is_finite() || noise_amplitude < 0.0 {
            return Err(ConfigurationError::InvalidWeight {
                field: "noise_amplitude".to_string(),
                value: noise_amplitude,
            });
        }

        Ok(Self {
            weights,
            noise_amplitude,
        })
    }

    /// Noise-free evaluator, mainly for monotonicity checks
    pub fn deterministic() -> Self {
        Self {
            weights: ScoreWeights::default(),
            noise_amplitude: 0.0,
        }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    pub fn noise_amplitude(&self) -> f64 {
        self.noise_amplitude
    }

    pub fn breakdown(&self, params: &ParameterSet) -> ScoreBreakdown {
        ScoreBreakdown::from_params(params)
    }
}

impl Default for CompositeScoreEvaluator {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            noise_amplitude: 2.0,
        }
    }
}

impl ScoreEvaluator for CompositeScoreEvaluator {
    fn name(&self) -> &str {
        "composite"
    }

    fn score(
        &self,
        params: &ParameterSet,
        rng: &mut dyn RandomSource,
    ) -> Result<f64, OptimizationError> {
        if let Some(parameter) = Parameter::ALL
            .into_iter()
            .find(|p| !params.get(*p).is_finite())
        {
            return Err(OptimizationError::NonFiniteParameter { parameter });
        }

        let mut score = ScoreBreakdown::from_params(params).weighted(&self.weights);
        if self.noise_amplitude > 0.0 {
            score += rng.uniform(-self.noise_amplitude, self.noise_amplitude);
        }

        if !score.is_finite() {
            return Err(OptimizationError::NonFiniteScore);
        }

        Ok(score.clamp(MIN_SCORE, MAX_SCORE))
    }
}
