//! Strategy tuning parameters.
//!
//! `ParameterSet` is a plain value type: every mutation produces a new set and
//! the optimizer decides whether to commit it. Fields are addressed through the
//! closed `Parameter` enum so a typo in a field name is a compile error, not a
//! runtime lookup miss.
//!
//! # Invariants
//!
//! - Every field lies inside its registered bound (see `BoundsRegistry`)
//! - `oscillator_oversold < oscillator_overbought`
//! - `sentiment_weight + technical_weight == 1` within `WEIGHT_TOLERANCE`
//! - `treasury_allocation + burn_allocation <= 1`; the remainder is the
//!   derived buyback allocation and is never stored

use super::bounds::BoundsRegistry;
use crate::domain::errors::{InvariantViolation, ParameterError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Floating tolerance used for the weight-sum and allocation invariants
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Functional grouping of the tuning parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterGroup {
    Entry,
    Reentry,
    Risk,
    Allocation,
}

/// Every tunable field of a `ParameterSet`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    MinLiquidity,
    MaxEntrySize,
    ReactionTimeMs,
    EntryConfidence,
    MomentumThreshold,
    VolumeSpikeThreshold,
    OscillatorOversold,
    OscillatorOverbought,
    MaxPositionSize,
    StopLoss,
    TakeProfit,
    MaxDailyLoss,
    CommissionRate,
    TreasuryAllocation,
    BurnAllocation,
    BurnThreshold,
    AiMinConfidence,
    SentimentWeight,
    TechnicalWeight,
}

impl Parameter {
    /// All parameters in declaration order (also the validation order)
    pub const ALL: [Parameter; 19] = [
        Parameter::MinLiquidity,
        Parameter::MaxEntrySize,
        Parameter::ReactionTimeMs,
        Parameter::EntryConfidence,
        Parameter::MomentumThreshold,
        Parameter::VolumeSpikeThreshold,
        Parameter::OscillatorOversold,
        Parameter::OscillatorOverbought,
        Parameter::MaxPositionSize,
        Parameter::StopLoss,
        Parameter::TakeProfit,
        Parameter::MaxDailyLoss,
        Parameter::CommissionRate,
        Parameter::TreasuryAllocation,
        Parameter::BurnAllocation,
        Parameter::BurnThreshold,
        Parameter::AiMinConfidence,
        Parameter::SentimentWeight,
        Parameter::TechnicalWeight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Parameter::MinLiquidity => "min_liquidity",
            Parameter::MaxEntrySize => "max_entry_size",
            Parameter::ReactionTimeMs => "reaction_time_ms",
            Parameter::EntryConfidence => "entry_confidence",
            Parameter::MomentumThreshold => "momentum_threshold",
            Parameter::VolumeSpikeThreshold => "volume_spike_threshold",
            Parameter::OscillatorOversold => "oscillator_oversold",
            Parameter::OscillatorOverbought => "oscillator_overbought",
            Parameter::MaxPositionSize => "max_position_size",
            Parameter::StopLoss => "stop_loss",
            Parameter::TakeProfit => "take_profit",
            Parameter::MaxDailyLoss => "max_daily_loss",
            Parameter::CommissionRate => "commission_rate",
            Parameter::TreasuryAllocation => "treasury_allocation",
            Parameter::BurnAllocation => "burn_allocation",
            Parameter::BurnThreshold => "burn_threshold",
            Parameter::AiMinConfidence => "ai_min_confidence",
            Parameter::SentimentWeight => "sentiment_weight",
            Parameter::TechnicalWeight => "technical_weight",
        }
    }

    pub fn group(self) -> ParameterGroup {
        match self {
            Parameter::MinLiquidity
            | Parameter::MaxEntrySize
            | Parameter::ReactionTimeMs
            | Parameter::EntryConfidence => ParameterGroup::Entry,
            Parameter::MomentumThreshold
            | Parameter::VolumeSpikeThreshold
            | Parameter::OscillatorOversold
            | Parameter::OscillatorOverbought => ParameterGroup::Reentry,
            Parameter::MaxPositionSize
            | Parameter::StopLoss
            | Parameter::TakeProfit
            | Parameter::MaxDailyLoss => ParameterGroup::Risk,
            Parameter::CommissionRate
            | Parameter::TreasuryAllocation
            | Parameter::BurnAllocation
            | Parameter::BurnThreshold
            | Parameter::AiMinConfidence
            | Parameter::SentimentWeight
            | Parameter::TechnicalWeight => ParameterGroup::Allocation,
        }
    }

    /// Whole-number fields (milliseconds, oscillator levels) are rounded on clamp
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            Parameter::ReactionTimeMs
                | Parameter::OscillatorOversold
                | Parameter::OscillatorOverbought
        )
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parameter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Parameter::ALL
            .into_iter()
            .find(|p| p.name() == normalized)
            .ok_or_else(|| anyhow::anyhow!("Unknown parameter: {}", s))
    }
}

/// Bounded configuration of the trading strategy's tuning values
///
/// Missing fields deserialize to their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    // Entry signal
    /// Minimum pool liquidity before an entry is considered
    pub min_liquidity: f64,
    /// Largest single entry
    pub max_entry_size: f64,
    /// Reaction-time budget in milliseconds
    pub reaction_time_ms: f64,
    /// Confidence needed to open an entry
    pub entry_confidence: f64,

    // Re-entry / momentum
    pub momentum_threshold: f64,
    pub volume_spike_threshold: f64,
    pub oscillator_oversold: f64,
    pub oscillator_overbought: f64,

    // Risk
    pub max_position_size: f64,
    /// Stop-loss as a fraction of entry price
    pub stop_loss: f64,
    /// Take-profit as a fraction of entry price
    pub take_profit: f64,
    /// Maximum daily loss as a fraction of equity
    pub max_daily_loss: f64,

    // Allocation / signal weighting
    pub commission_rate: f64,
    pub treasury_allocation: f64,
    pub burn_allocation: f64,
    pub burn_threshold: f64,
    pub ai_min_confidence: f64,
    pub sentiment_weight: f64,
    pub technical_weight: f64,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            min_liquidity: 10.0,
            max_entry_size: 1.0,
            reaction_time_ms: 2000.0,
            entry_confidence: 0.80,
            momentum_threshold: 0.15,
            volume_spike_threshold: 3.0,
            oscillator_oversold: 30.0,
            oscillator_overbought: 70.0,
            max_position_size: 5.0,
            stop_loss: 0.15,
            take_profit: 0.25,
            max_daily_loss: 0.05,
            commission_rate: 0.015,
            treasury_allocation: 0.70,
            burn_allocation: 0.20,
            burn_threshold: 1000.0,
            ai_min_confidence: 0.70,
            sentiment_weight: 0.30,
            technical_weight: 0.70,
        }
    }
}

/// Outcome of a single manual field edit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterEdit {
    pub parameter: Parameter,
    pub requested: f64,
    pub applied: f64,
    /// Requested value lay outside the bound. Rounding alone does not count.
    pub clamped: bool,
}

impl ParameterEdit {
    /// True when the requested value had to be pulled back into bounds
    pub fn was_clamped(&self) -> bool {
        self.clamped
    }
}

impl ParameterSet {
    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::MinLiquidity => self.min_liquidity,
            Parameter::MaxEntrySize => self.max_entry_size,
            Parameter::ReactionTimeMs => self.reaction_time_ms,
            Parameter::EntryConfidence => self.entry_confidence,
            Parameter::MomentumThreshold => self.momentum_threshold,
            Parameter::VolumeSpikeThreshold => self.volume_spike_threshold,
            Parameter::OscillatorOversold => self.oscillator_oversold,
            Parameter::OscillatorOverbought => self.oscillator_overbought,
            Parameter::MaxPositionSize => self.max_position_size,
            Parameter::StopLoss => self.stop_loss,
            Parameter::TakeProfit => self.take_profit,
            Parameter::MaxDailyLoss => self.max_daily_loss,
            Parameter::CommissionRate => self.commission_rate,
            Parameter::TreasuryAllocation => self.treasury_allocation,
            Parameter::BurnAllocation => self.burn_allocation,
            Parameter::BurnThreshold => self.burn_threshold,
            Parameter::AiMinConfidence => self.ai_min_confidence,
            Parameter::SentimentWeight => self.sentiment_weight,
            Parameter::TechnicalWeight => self.technical_weight,
        }
    }

    fn slot_mut(&mut self, parameter: Parameter) -> &mut f64 {
        match parameter {
            Parameter::MinLiquidity => &mut self.min_liquidity,
            Parameter::MaxEntrySize => &mut self.max_entry_size,
            Parameter::ReactionTimeMs => &mut self.reaction_time_ms,
            Parameter::EntryConfidence => &mut self.entry_confidence,
            Parameter::MomentumThreshold => &mut self.momentum_threshold,
            Parameter::VolumeSpikeThreshold => &mut self.volume_spike_threshold,
            Parameter::OscillatorOversold => &mut self.oscillator_oversold,
            Parameter::OscillatorOverbought => &mut self.oscillator_overbought,
            Parameter::MaxPositionSize => &mut self.max_position_size,
            Parameter::StopLoss => &mut self.stop_loss,
            Parameter::TakeProfit => &mut self.take_profit,
            Parameter::MaxDailyLoss => &mut self.max_daily_loss,
            Parameter::CommissionRate => &mut self.commission_rate,
            Parameter::TreasuryAllocation => &mut self.treasury_allocation,
            Parameter::BurnAllocation => &mut self.burn_allocation,
            Parameter::BurnThreshold => &mut self.burn_threshold,
            Parameter::AiMinConfidence => &mut self.ai_min_confidence,
            Parameter::SentimentWeight => &mut self.sentiment_weight,
            Parameter::TechnicalWeight => &mut self.technical_weight,
        }
    }

    /// Raw setter; no clamping or validation
    pub fn set(&mut self, parameter: Parameter, value: f64) {
        *self.slot_mut(parameter) = value;
    }

    /// Copy of this set with one field replaced
    pub fn with(mut self, parameter: Parameter, value: f64) -> Self {
        self.set(parameter, value);
        self
    }

    /// Share of revenue left for buybacks once treasury and burn are funded
    pub fn buyback_allocation(&self) -> f64 {
        1.0 - self.treasury_allocation - self.burn_allocation
    }

    /// Validate bounds (declaration order) and then cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self, bounds: &BoundsRegistry) -> Result<(), ParameterError> {
        for parameter in Parameter::ALL {
            let value = self.get(parameter);
            let bound = bounds.bounds_of(parameter);
            if !bound.contains(value) {
                return Err(ParameterError::OutOfBounds {
                    parameter,
                    value,
                    min: bound.min,
                    max: bound.max,
                });
            }
        }

        self.check_invariants()?;
        Ok(())
    }

    /// Cross-field invariants only
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.oscillator_oversold >= self.oscillator_overbought {
            return Err(InvariantViolation::OscillatorOrdering {
                oversold: self.oscillator_oversold,
                overbought: self.oscillator_overbought,
            });
        }

        if (self.sentiment_weight + self.technical_weight - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(InvariantViolation::SignalWeightSum {
                sentiment: self.sentiment_weight,
                technical: self.technical_weight,
            });
        }

        if self.buyback_allocation() < -WEIGHT_TOLERANCE {
            return Err(InvariantViolation::AllocationOverflow {
                treasury: self.treasury_allocation,
                burn: self.burn_allocation,
            });
        }

        Ok(())
    }

    /// Apply a manual edit: clamp into bounds, then re-validate.
    ///
    /// Linked groups are never renormalized; an edit that would break a
    /// cross-field invariant is rejected and `self` is left as it was.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` for a non-finite value, `Invariant` when the clamped
    /// value breaks a linked group.
    pub fn apply_manual_edit(
        &self,
        bounds: &BoundsRegistry,
        parameter: Parameter,
        value: f64,
    ) -> Result<(ParameterSet, ParameterEdit), ParameterError> {
        let (candidate, mut edits) = self.apply_manual_edits(bounds, &[(parameter, value)])?;
        let edit = edits.remove(0);
        Ok((candidate, edit))
    }

    /// Apply several edits as one all-or-nothing transaction.
    ///
    /// Needed for linked pairs such as the signal weights, which cannot be
    /// changed one field at a time without passing through an invalid state.
    pub fn apply_manual_edits(
        &self,
        bounds: &BoundsRegistry,
        edits: &[(Parameter, f64)],
    ) -> Result<(ParameterSet, Vec<ParameterEdit>), ParameterError> {
        let mut candidate = *self;
        let mut applied = Vec::with_capacity(edits.len());

        for &(parameter, requested) in edits {
            if !requested.is_finite() {
                let bound = bounds.bounds_of(parameter);
                return Err(ParameterError::OutOfBounds {
                    parameter,
                    value: requested,
                    min: bound.min,
                    max: bound.max,
                });
            }

            let value = bounds.clamp(parameter, requested);
            candidate.set(parameter, value);
            applied.push(ParameterEdit {
                parameter,
                requested,
                applied: value,
                clamped: !bounds.contains(parameter, requested),
            });
        }

        candidate.validate(bounds)?;
        Ok((candidate, applied))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> BoundsRegistry {
        BoundsRegistry::standard()
    }

    #[test]
    fn test_default_set_is_valid() {
        let set = ParameterSet::default();
        assert!(set.validate(&bounds()).is_ok());
        assert!((set.buyback_allocation() - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_getters_and_setters_cover_every_field() {
        let mut set = ParameterSet::default();
        for (i, parameter) in Parameter::ALL.into_iter().enumerate() {
            set.set(parameter, i as f64 + 0.5);
        }
        for (i, parameter) in Parameter::ALL.into_iter().enumerate() {
            assert_eq!(set.get(parameter), i as f64 + 0.5, "{}", parameter);
        }
    }

    #[test]
    fn test_parameter_from_str() {
        assert_eq!(
            "commission_rate".parse::<Parameter>().unwrap(),
            Parameter::CommissionRate
        );
        assert_eq!(
            " Burn_Allocation ".parse::<Parameter>().unwrap(),
            Parameter::BurnAllocation
        );
        assert!("commission".parse::<Parameter>().is_err());
    }

    #[test]
    fn test_groups() {
        assert_eq!(Parameter::ReactionTimeMs.group(), ParameterGroup::Entry);
        assert_eq!(Parameter::OscillatorOverbought.group(), ParameterGroup::Reentry);
        assert_eq!(Parameter::MaxDailyLoss.group(), ParameterGroup::Risk);
        assert_eq!(Parameter::TechnicalWeight.group(), ParameterGroup::Allocation);
    }

    #[test]
    fn test_bound_violation_reported_before_invariants() {
        // Both out of bounds and breaking the weight sum
        let set = ParameterSet::default().with(Parameter::SentimentWeight, 0.9);

        let err = set.validate(&bounds()).unwrap_err();
        assert!(matches!(
            err,
            ParameterError::OutOfBounds {
                parameter: Parameter::SentimentWeight,
                ..
            }
        ));
    }

    #[test]
    fn test_weight_sum_violation() {
        let set = ParameterSet::default().with(Parameter::SentimentWeight, 0.4);
        assert_eq!(
            set.validate(&bounds()),
            Err(ParameterError::Invariant(InvariantViolation::SignalWeightSum {
                sentiment: 0.4,
                technical: 0.7,
            }))
        );
    }

    #[test]
    fn test_allocation_overflow_violation() {
        let set = ParameterSet::default()
            .with(Parameter::TreasuryAllocation, 0.8)
            .with(Parameter::BurnAllocation, 0.25);

        let err = set.validate(&bounds()).unwrap_err();
        assert!(matches!(
            err,
            ParameterError::Invariant(InvariantViolation::AllocationOverflow { .. })
        ));
    }

    #[test]
    fn test_allocation_exactly_one_is_valid() {
        let set = ParameterSet::default()
            .with(Parameter::TreasuryAllocation, 0.75)
            .with(Parameter::BurnAllocation, 0.25);

        assert!(set.validate(&bounds()).is_ok());
        assert!(set.buyback_allocation().abs() < 1e-12);
    }

    #[test]
    fn test_oscillator_ordering_checked() {
        let set = ParameterSet::default()
            .with(Parameter::OscillatorOversold, 70.0)
            .with(Parameter::OscillatorOverbought, 60.0);

        assert_eq!(
            set.check_invariants(),
            Err(InvariantViolation::OscillatorOrdering {
                oversold: 70.0,
                overbought: 60.0,
            })
        );
    }

    #[test]
    fn test_manual_edit_clamps_to_max() {
        let set = ParameterSet::default();
        let (edited, edit) = set
            .apply_manual_edit(&bounds(), Parameter::CommissionRate, 0.05)
            .unwrap();

        assert_eq!(edited.commission_rate, 0.025);
        assert!(edit.was_clamped());
        assert_eq!(edit.requested, 0.05);
        assert!(edited.validate(&bounds()).is_ok());
        // Everything else untouched
        assert_eq!(edited.with(Parameter::CommissionRate, 0.015), set);
    }

    #[test]
    fn test_manual_edit_within_bounds_not_clamped() {
        let (edited, edit) = ParameterSet::default()
            .apply_manual_edit(&bounds(), Parameter::StopLoss, 0.12)
            .unwrap();

        assert_eq!(edited.stop_loss, 0.12);
        assert!(!edit.was_clamped());
    }

    #[test]
    fn test_manual_edit_rounds_integral_fields() {
        let (edited, edit) = ParameterSet::default()
            .apply_manual_edit(&bounds(), Parameter::ReactionTimeMs, 1234.6)
            .unwrap();
        assert_eq!(edited.reaction_time_ms, 1235.0);
        assert_eq!(edit.applied, 1235.0);
        // Rounded inside the bound, not clamped
        assert!(!edit.was_clamped());

        let (_, edit) = ParameterSet::default()
            .apply_manual_edit(&bounds(), Parameter::ReactionTimeMs, 6200.4)
            .unwrap();
        assert_eq!(edit.applied, 5000.0);
        assert!(edit.was_clamped());
    }

    #[test]
    fn test_manual_edit_rejects_linked_group_break() {
        let set = ParameterSet::default();
        let result = set.apply_manual_edit(&bounds(), Parameter::SentimentWeight, 0.35);

        assert!(matches!(
            result,
            Err(ParameterError::Invariant(InvariantViolation::SignalWeightSum { .. }))
        ));
        // Value retained
        assert_eq!(set.sentiment_weight, 0.30);
    }

    #[test]
    fn test_manual_edit_rejects_allocation_overflow_after_clamp() {
        let set = ParameterSet::default().with(Parameter::TreasuryAllocation, 0.78);
        let result = set.apply_manual_edit(&bounds(), Parameter::BurnAllocation, 0.5);

        // Clamped to 0.30 but 0.78 + 0.30 > 1
        assert!(matches!(
            result,
            Err(ParameterError::Invariant(InvariantViolation::AllocationOverflow { .. }))
        ));
    }

    #[test]
    fn test_manual_edit_rejects_non_finite() {
        let result =
            ParameterSet::default().apply_manual_edit(&bounds(), Parameter::StopLoss, f64::NAN);
        assert!(matches!(
            result,
            Err(ParameterError::OutOfBounds {
                parameter: Parameter::StopLoss,
                ..
            })
        ));
    }

    #[test]
    fn test_batch_edit_moves_linked_weights_together() {
        let (edited, edits) = ParameterSet::default()
            .apply_manual_edits(
                &bounds(),
                &[(Parameter::SentimentWeight, 0.4), (Parameter::TechnicalWeight, 0.6)],
            )
            .unwrap();

        assert_eq!(edited.sentiment_weight, 0.4);
        assert_eq!(edited.technical_weight, 0.6);
        assert_eq!(edits.len(), 2);
    }

    #[test]
    fn test_parameter_set_serde_roundtrip() {
        let set = ParameterSet::default().with(Parameter::BurnThreshold, 1500.0);
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains("\"burn_threshold\":1500.0"));

        let back: ParameterSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
