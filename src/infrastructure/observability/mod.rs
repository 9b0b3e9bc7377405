//! Pull-free observability for the optimizer
//!
//! Metrics live in a private Prometheus registry and are rendered to text on
//! demand; nothing here opens a socket.

pub mod metrics;

pub use metrics::{MetricsListener, OptimizerMetrics};
