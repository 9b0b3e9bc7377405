use super::parameters::Parameter;
use crate::domain::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Inclusive `[min, max]` range for one parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub min: f64,
    pub max: f64,
}

impl Bound {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// NaN is never contained
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Static per-parameter bounds used for validation and clamping.
///
/// Construction fails if any parameter lacks a bound, so a registry that
/// exists is always complete.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundsRegistry {
    bounds: HashMap<Parameter, Bound>,
}

impl BoundsRegistry {
    /// Build a registry from explicit bounds.
    ///
    /// # Errors
    ///
    /// `MissingBound` when a parameter has no entry, `InvalidBound` when an
    /// entry is non-finite or has `min > max`.
    pub fn new(bounds: HashMap<Parameter, Bound>) -> Result<Self, ConfigurationError> {
        for parameter in Parameter::ALL {
            let bound = bounds
                .get(&parameter)
                .ok_or(ConfigurationError::MissingBound(parameter))?;

            if !bound.min.is_finite() || !bound.max.is_finite() || bound.min > bound.max {
                return Err(ConfigurationError::InvalidBound {
                    parameter,
                    min: bound.min,
                    max: bound.max,
                });
            }
        }

        Ok(Self { bounds })
    }

    /// The production search space
    pub fn standard() -> Self {
        let bounds = Parameter::ALL
            .into_iter()
            .map(|p| (p, Self::standard_bound(p)))
            .collect();
        Self { bounds }
    }

    fn standard_bound(parameter: Parameter) -> Bound {
        match parameter {
            Parameter::MinLiquidity => Bound::new(5.0, 50.0),
            Parameter::MaxEntrySize => Bound::new(0.5, 5.0),
            Parameter::ReactionTimeMs => Bound::new(1000.0, 5000.0),
            Parameter::EntryConfidence => Bound::new(0.60, 0.95),
            Parameter::MomentumThreshold => Bound::new(0.05, 0.30),
            Parameter::VolumeSpikeThreshold => Bound::new(1.5, 5.0),
            Parameter::OscillatorOversold => Bound::new(20.0, 40.0),
            Parameter::OscillatorOverbought => Bound::new(60.0, 80.0),
            Parameter::MaxPositionSize => Bound::new(1.0, 10.0),
            Parameter::StopLoss => Bound::new(0.05, 0.25),
            Parameter::TakeProfit => Bound::new(0.15, 0.50),
            Parameter::MaxDailyLoss => Bound::new(0.01, 0.08),
            Parameter::CommissionRate => Bound::new(0.010, 0.025),
            Parameter::TreasuryAllocation => Bound::new(0.60, 0.80),
            Parameter::BurnAllocation => Bound::new(0.15, 0.30),
            Parameter::BurnThreshold => Bound::new(500.0, 2000.0),
            Parameter::AiMinConfidence => Bound::new(0.60, 0.90),
            Parameter::SentimentWeight => Bound::new(0.10, 0.50),
            Parameter::TechnicalWeight => Bound::new(0.50, 0.90),
        }
    }

    pub fn bounds_of(&self, parameter: Parameter) -> Bound {
        // Completeness is checked at construction
        self.bounds
            .get(&parameter)
            .copied()
            .unwrap_or_else(|| Self::standard_bound(parameter))
    }

    /// Clip `value` into the parameter's range; integral parameters are rounded first
    pub fn clamp(&self, parameter: Parameter, value: f64) -> f64 {
        let bound = self.bounds_of(parameter);
        let value = if parameter.is_integral() {
            value.round()
        } else {
            value
        };
        value.clamp(bound.min, bound.max)
    }

    pub fn contains(&self, parameter: Parameter, value: f64) -> bool {
        self.bounds_of(parameter).contains(value)
    }
}

impl Default for BoundsRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_is_complete() {
        let registry = BoundsRegistry::standard();
        let rebuilt = BoundsRegistry::new(registry.bounds.clone());
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn test_missing_bound_is_configuration_error() {
        let mut bounds = BoundsRegistry::standard().bounds;
        bounds.remove(&Parameter::BurnThreshold);

        assert_eq!(
            BoundsRegistry::new(bounds),
            Err(ConfigurationError::MissingBound(Parameter::BurnThreshold))
        );
    }

    #[test]
    fn test_inverted_bound_rejected() {
        let mut bounds = BoundsRegistry::standard().bounds;
        bounds.insert(Parameter::StopLoss, Bound::new(0.3, 0.1));

        assert!(matches!(
            BoundsRegistry::new(bounds),
            Err(ConfigurationError::InvalidBound {
                parameter: Parameter::StopLoss,
                ..
            })
        ));
    }

    #[test]
    fn test_clamp() {
        let registry = BoundsRegistry::standard();
        assert_eq!(registry.clamp(Parameter::CommissionRate, 0.05), 0.025);
        assert_eq!(registry.clamp(Parameter::CommissionRate, 0.0), 0.010);
        assert_eq!(registry.clamp(Parameter::CommissionRate, 0.02), 0.02);
    }

    #[test]
    fn test_clamp_rounds_integral_parameters() {
        let registry = BoundsRegistry::standard();
        assert_eq!(registry.clamp(Parameter::OscillatorOversold, 29.6), 30.0);
        assert_eq!(registry.clamp(Parameter::OscillatorOversold, 40.4), 40.0);
        assert_eq!(registry.clamp(Parameter::ReactionTimeMs, 999.0), 1000.0);
    }

    #[test]
    fn test_boundary_values_contained() {
        let registry = BoundsRegistry::standard();
        assert!(registry.contains(Parameter::MaxDailyLoss, 0.01));
        assert!(registry.contains(Parameter::MaxDailyLoss, 0.08));
        assert!(!registry.contains(Parameter::MaxDailyLoss, 0.081));
        assert!(!registry.contains(Parameter::MaxDailyLoss, f64::NAN));
    }

    #[test]
    fn test_oscillator_bounds_cannot_overlap() {
        let registry = BoundsRegistry::standard();
        assert!(
            registry.bounds_of(Parameter::OscillatorOversold).max
                < registry.bounds_of(Parameter::OscillatorOverbought).min
        );
    }
}
