// Trial runner, candidate strategies and run reporting
pub mod optimizer;
pub mod reporting;
pub mod strategies;

pub use optimizer::{CancellationToken, OptimizerBuilder, OptimizerSettings, ParameterOptimizer};
pub use reporting::{OptimizeReporter, RunReport};
pub use strategies::{OptimizationStrategy, StrategyRegistry};
