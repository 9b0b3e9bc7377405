use crate::domain::optimization::parameters::Parameter;
use thiserror::Error;

/// Cross-field constraints that every committed parameter set must satisfy
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("Oscillator ordering broken: oversold {oversold} must be below overbought {overbought}")]
    OscillatorOrdering { oversold: f64, overbought: f64 },

    #[error("Signal weights must sum to 1: sentiment {sentiment:.4} + technical {technical:.4}")]
    SignalWeightSum { sentiment: f64, technical: f64 },

    #[error("Allocation overflow: treasury {treasury:.4} + burn {burn:.4} exceeds 1")]
    AllocationOverflow { treasury: f64, burn: f64 },
}

/// Errors raised while validating or editing a parameter set
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("{parameter} = {value} is outside [{min}, {max}]")]
    OutOfBounds {
        parameter: Parameter,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

/// Errors raised while generating or scoring a candidate during a trial
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizationError {
    #[error("Candidate rejected: {0}")]
    InvalidCandidate(#[from] ParameterError),

    #[error("Parameter {parameter} is not a finite number")]
    NonFiniteParameter { parameter: Parameter },

    #[error("Evaluator produced a non-finite score")]
    NonFiniteScore,

    #[error("Search intensity must be finite and positive, got {0}")]
    InvalidIntensity(f64),

    #[error("Trial cancelled before scoring")]
    Cancelled,

    #[error("Strategy backend failed: {0}")]
    Strategy(String),
}

/// Errors surfaced by the optimizer's public API
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error("An optimization trial is already running; retry later")]
    TrialInProgress,

    #[error("Unknown optimization strategy: {0}")]
    UnknownStrategy(String),

    #[error("Optimization failed: {0}")]
    OptimizationFailure(#[from] OptimizationError),

    #[error("No backup available to restore")]
    NoBackup,
}

/// Startup configuration problems; fatal for the process
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("No bound registered for {0}")]
    MissingBound(Parameter),

    #[error("Invalid bound for {parameter}: [{min}, {max}]")]
    InvalidBound {
        parameter: Parameter,
        min: f64,
        max: f64,
    },

    #[error("Invalid score weight: {field} = {value}. Must be finite and non-negative")]
    InvalidWeight { field: String, value: f64 },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
