pub mod backup;
pub mod bounds;
pub mod optimization_history;
pub mod parameters;
pub mod random;
pub mod scoring;
pub mod strategy_kind;

pub use backup::BackupManager;
pub use bounds::{Bound, BoundsRegistry};
pub use optimization_history::{OptimizationHistory, OptimizationResult, TrialStatus};
pub use parameters::{Parameter, ParameterEdit, ParameterGroup, ParameterSet};
pub use random::{RandomSource, SeededRandom, SequenceRandom};
pub use scoring::{CompositeScoreEvaluator, ScoreBreakdown, ScoreEvaluator, ScoreWeights};
pub use strategy_kind::StrategyKind;
