use super::traits::OptimizationStrategy;
use crate::domain::optimization::Parameter;

/// Small, conservative steps for refining a set that already scores well
#[derive(Debug, Clone)]
pub struct GradientGuidedStrategy {
    step_variance: f64,
    fields: Vec<Parameter>,
}

impl GradientGuidedStrategy {
    pub const DEFAULT_VARIANCE: f64 = 0.03;

    pub fn new() -> Self {
        Self {
            step_variance: Self::DEFAULT_VARIANCE,
            fields: Parameter::ALL.to_vec(),
        }
    }

    pub fn restricted_to(mut self, fields: &[Parameter]) -> Self {
        self.fields = fields.to_vec();
        self
    }
}

impl Default for GradientGuidedStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizationStrategy for GradientGuidedStrategy {
    fn name(&self) -> &str {
        "GradientGuided"
    }

    fn variance(&self) -> f64 {
        self.step_variance
    }

    fn perturbed_fields(&self) -> &[Parameter] {
        &self.fields
    }
}
