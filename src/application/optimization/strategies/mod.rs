mod genetic;
mod gradient_guided;
mod random_walk;
mod traits;

pub use genetic::GeneticStrategy;
pub use gradient_guided::GradientGuidedStrategy;
pub use random_walk::RandomWalkStrategy;
pub use traits::{OptimizationStrategy, perturb, rebalance_signal_weights};

use crate::domain::optimization::StrategyKind;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps strategy names to implementations.
///
/// The optimizer only talks to `dyn OptimizationStrategy`, so swapping in a
/// different backend for a kind is a `register` call.
#[derive(Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<StrategyKind, Arc<dyn OptimizationStrategy>>,
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// The three built-in strategies
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for kind in StrategyKind::ALL {
            registry.register(kind, Self::create(kind));
        }
        registry
    }

    pub fn create(kind: StrategyKind) -> Arc<dyn OptimizationStrategy> {
        match kind {
            StrategyKind::RandomWalk => Arc::new(RandomWalkStrategy::new()),
            StrategyKind::Genetic => Arc::new(GeneticStrategy::new()),
            StrategyKind::GradientGuided => Arc::new(GradientGuidedStrategy::new()),
        }
    }

    /// Replaces any strategy already registered for `kind`
    pub fn register(&mut self, kind: StrategyKind, strategy: Arc<dyn OptimizationStrategy>) {
        self.strategies.insert(kind, strategy);
    }

    pub fn get(&self, kind: StrategyKind) -> Option<Arc<dyn OptimizationStrategy>> {
        self.strategies.get(&kind).cloned()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_variances() {
        let registry = StrategyRegistry::standard();
        assert_eq!(registry.len(), 3);

        let expected = [
            (StrategyKind::RandomWalk, 0.05),
            (StrategyKind::Genetic, 0.08),
            (StrategyKind::GradientGuided, 0.03),
        ];
        for (kind, variance) in expected {
            let strategy = registry.get(kind).unwrap();
            assert_eq!(strategy.name(), kind.name());
            assert_eq!(strategy.variance(), variance);
        }
    }

    #[test]
    fn test_register_overrides_kind() {
        let mut registry = StrategyRegistry::standard();
        registry.register(
            StrategyKind::Genetic,
            Arc::new(RandomWalkStrategy::new()),
        );
        assert_eq!(registry.get(StrategyKind::Genetic).unwrap().name(), "RandomWalk");
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_empty_registry() {
        let registry = StrategyRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry.get(StrategyKind::RandomWalk).is_none());
    }
}
