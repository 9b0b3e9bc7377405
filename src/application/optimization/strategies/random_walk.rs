use super::traits::OptimizationStrategy;
use crate::domain::optimization::Parameter;

/// Moderate exploration around the current set.
///
/// Each trial is one step of a random walk; the optimizer keeps whatever the
/// walk lands on.
#[derive(Debug, Clone)]
pub struct RandomWalkStrategy {
    variance: f64,
    fields: Vec<Parameter>,
}

impl RandomWalkStrategy {
    pub const DEFAULT_VARIANCE: f64 = 0.05;

    pub fn new() -> Self {
        Self {
            variance: Self::DEFAULT_VARIANCE,
            fields: Parameter::ALL.to_vec(),
        }
    }

    /// Restrict the walk to a subset of fields
    pub fn restricted_to(mut self, fields: &[Parameter]) -> Self {
        self.fields = fields.to_vec();
        self
    }
}

impl Default for RandomWalkStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizationStrategy for RandomWalkStrategy {
    fn name(&self) -> &str {
        "RandomWalk"
    }

    fn variance(&self) -> f64 {
        self.variance
    }

    fn perturbed_fields(&self) -> &[Parameter] {
        &self.fields
    }
}
