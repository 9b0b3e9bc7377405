// Optimization domain: parameters, bounds, scoring, history
pub mod optimization;

// Notifications for outer layers
pub mod events;

// Domain-specific error types
pub mod errors;
