use super::traits::OptimizationStrategy;
use crate::domain::optimization::Parameter;

/// Aggressive mutation step, the widest search of the built-in strategies
#[derive(Debug, Clone)]
pub struct GeneticStrategy {
    mutation_variance: f64,
    genes: Vec<Parameter>,
}

impl GeneticStrategy {
    pub const DEFAULT_VARIANCE: f64 = 0.08;

    pub fn new() -> Self {
        Self {
            mutation_variance: Self::DEFAULT_VARIANCE,
            genes: Parameter::ALL.to_vec(),
        }
    }

    pub fn restricted_to(mut self, genes: &[Parameter]) -> Self {
        self.genes = genes.to_vec();
        self
    }
}

impl Default for GeneticStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl OptimizationStrategy for GeneticStrategy {
    fn name(&self) -> &str {
        "Genetic"
    }

    fn variance(&self) -> f64 {
        self.mutation_variance
    }

    fn perturbed_fields(&self) -> &[Parameter] {
        &self.genes
    }
}
