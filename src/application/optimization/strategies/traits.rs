use crate::domain::errors::OptimizationError;
use crate::domain::optimization::{BoundsRegistry, Parameter, ParameterSet, RandomSource};

/// Candidate generator used by the optimizer.
///
/// Implementations must not touch shared state: they receive a copy of the
/// current set and return a new one. Adding a strategy only requires
/// implementing this trait and registering it.
pub trait OptimizationStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Relative step size; 0.05 means each field moves at most +/-2.5% at intensity 1
    fn variance(&self) -> f64;

    /// Fields this strategy may move
    fn perturbed_fields(&self) -> &[Parameter] {
        &Parameter::ALL
    }

    /// Propose a candidate derived from `current`.
    ///
    /// # Errors
    ///
    /// `InvalidIntensity` when `intensity` is not finite and positive.
    fn propose(
        &self,
        current: &ParameterSet,
        bounds: &BoundsRegistry,
        rng: &mut dyn RandomSource,
        intensity: f64,
    ) -> Result<ParameterSet, OptimizationError> {
        perturb(
            current,
            bounds,
            rng,
            self.variance(),
            intensity,
            self.perturbed_fields(),
        )
    }
}

/// Multiply each listed field by `1 + U(-0.5, 0.5) * variance * intensity`
/// and clamp it. The signal weights are then re-linked: the perturbed weight
/// wins and its partner becomes the complement. When both are listed the
/// sentiment weight wins.
pub fn perturb(
    current: &ParameterSet,
    bounds: &BoundsRegistry,
    rng: &mut dyn RandomSource,
    variance: f64,
    intensity: f64,
    fields: &[Parameter],
) -> Result<ParameterSet, OptimizationError> {
    if !intensity.is_finite() || intensity <= 0.0 {
        return Err(OptimizationError::InvalidIntensity(intensity));
    }

    let step = variance * intensity;
    let mut candidate = *current;
    for &parameter in fields {
        let factor = 1.0 + rng.uniform(-0.5, 0.5) * step;
        let value = bounds.clamp(parameter, current.get(parameter) * factor);
        candidate.set(parameter, value);
    }

    if fields.contains(&Parameter::SentimentWeight) {
        rebalance_signal_weights(&mut candidate, bounds, Parameter::SentimentWeight);
    } else if fields.contains(&Parameter::TechnicalWeight) {
        rebalance_signal_weights(&mut candidate, bounds, Parameter::TechnicalWeight);
    }

    Ok(candidate)
}

/// Set the partner of `anchor` in the signal-weight pair to `1 - anchor`.
/// Any other `anchor` leaves the set unchanged.
pub fn rebalance_signal_weights(
    params: &mut ParameterSet,
    bounds: &BoundsRegistry,
    anchor: Parameter,
) {
    let partner = match anchor {
        Parameter::SentimentWeight => Parameter::TechnicalWeight,
        Parameter::TechnicalWeight => Parameter::SentimentWeight,
        _ => return,
    };
    let value = bounds.clamp(partner, 1.0 - params.get(anchor));
    params.set(partner, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::optimization::SequenceRandom;

    #[test]
    fn test_midpoint_draw_leaves_set_unchanged() {
        let current = ParameterSet::default();
        let candidate = perturb(
            &current,
            &BoundsRegistry::standard(),
            &mut SequenceRandom::midpoint(),
            0.05,
            1.0,
            &Parameter::ALL,
        )
        .unwrap();

        for parameter in Parameter::ALL {
            assert!(
                (candidate.get(parameter) - current.get(parameter)).abs() < 1e-12,
                "{} moved",
                parameter
            );
        }
    }

    #[test]
    fn test_lowest_draw_scales_down_by_half_variance() {
        let current = ParameterSet::default();
        let candidate = perturb(
            &current,
            &BoundsRegistry::standard(),
            &mut SequenceRandom::new(vec![0.0]),
            0.10,
            1.0,
            &[Parameter::BurnThreshold],
        )
        .unwrap();

        // 1000 * (1 - 0.5 * 0.10)
        assert!((candidate.burn_threshold - 950.0).abs() < 1e-9);
        assert_eq!(candidate.with(Parameter::BurnThreshold, 1000.0), current);
    }

    #[test]
    fn test_intensity_scales_step() {
        let current = ParameterSet::default();
        let candidate = perturb(
            &current,
            &BoundsRegistry::standard(),
            &mut SequenceRandom::new(vec![1.0]),
            0.05,
            2.0,
            &[Parameter::MinLiquidity],
        )
        .unwrap();

        // 10 * (1 + 0.5 * 0.05 * 2)
        assert!((candidate.min_liquidity - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_perturbation_is_clamped() {
        let current = ParameterSet::default().with(Parameter::CommissionRate, 0.025);
        let candidate = perturb(
            &current,
            &BoundsRegistry::standard(),
            &mut SequenceRandom::new(vec![1.0]),
            0.5,
            1.0,
            &[Parameter::CommissionRate],
        )
        .unwrap();

        assert_eq!(candidate.commission_rate, 0.025);
    }

    #[test]
    fn test_weights_rebalanced_after_perturbation() {
        let candidate = perturb(
            &ParameterSet::default(),
            &BoundsRegistry::standard(),
            &mut SequenceRandom::new(vec![0.9, 0.1]),
            0.08,
            1.0,
            &[Parameter::SentimentWeight, Parameter::TechnicalWeight],
        )
        .unwrap();

        assert!((candidate.sentiment_weight + candidate.technical_weight - 1.0).abs() < 1e-12);
        assert!(candidate.sentiment_weight > 0.30);
    }

    #[test]
    fn test_technical_only_perturbation_moves_sentiment() {
        let candidate = perturb(
            &ParameterSet::default(),
            &BoundsRegistry::standard(),
            &mut SequenceRandom::new(vec![1.0]),
            0.10,
            1.0,
            &[Parameter::TechnicalWeight],
        )
        .unwrap();

        // 0.70 * 1.05, with the sentiment weight following
        assert!((candidate.technical_weight - 0.735).abs() < 1e-12);
        assert!((candidate.sentiment_weight - 0.265).abs() < 1e-12);
        assert!(candidate.check_invariants().is_ok());
    }

    #[test]
    fn test_rebalance_ignores_unlinked_anchor() {
        let mut params = ParameterSet::default();
        rebalance_signal_weights(&mut params, &BoundsRegistry::standard(), Parameter::StopLoss);
        assert_eq!(params, ParameterSet::default());
    }

    #[test]
    fn test_invalid_intensity_rejected() {
        for intensity in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = perturb(
                &ParameterSet::default(),
                &BoundsRegistry::standard(),
                &mut SequenceRandom::midpoint(),
                0.05,
                intensity,
                &Parameter::ALL,
            );
            assert!(matches!(result, Err(OptimizationError::InvalidIntensity(_))));
        }
    }
}
