//! Prometheus metrics definitions for the optimizer
//!
//! All metrics use the `paramtune_` prefix and are read-only.

use crate::domain::events::{EventListener, OptimizerEvent};
use crate::domain::optimization::OptimizationResult;
use prometheus::{
    CounterVec, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
    core::{AtomicF64, GenericGauge},
};
use std::sync::Arc;

/// Prometheus metrics for the optimizer
#[derive(Clone)]
pub struct OptimizerMetrics {
    registry: Arc<Registry>,
    /// Finished trials by strategy and status
    pub trials_total: CounterVec,
    /// Score of the committed parameter set
    pub current_score: GenericGauge<AtomicF64>,
    pub target_score: GenericGauge<AtomicF64>,
    /// Manual edits by outcome (applied, clamped)
    pub manual_edits_total: CounterVec,
    /// Wall-clock trial duration in seconds
    pub trial_duration_seconds: HistogramVec,
    pub backups_total: CounterVec,
}

impl OptimizerMetrics {
    /// Create a new metrics instance with all gauges and counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let trials_total = CounterVec::new(
            Opts::new("paramtune_trials_total", "Finished trials by strategy and status"),
            &["strategy", "status"],
        )?;
        registry.register(Box::new(trials_total.clone()))?;

        let current_score = Gauge::with_opts(Opts::new(
            "paramtune_current_score",
            "Score of the committed parameter set (0-100)",
        ))?;
        registry.register(Box::new(current_score.clone()))?;

        let target_score = Gauge::with_opts(Opts::new(
            "paramtune_target_score",
            "Configured target score (0-100)",
        ))?;
        registry.register(Box::new(target_score.clone()))?;

        let manual_edits_total = CounterVec::new(
            Opts::new("paramtune_manual_edits_total", "Manual parameter edits by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(manual_edits_total.clone()))?;

        let trial_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "paramtune_trial_duration_seconds",
                "Trial duration in seconds",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["strategy"],
        )?;
        registry.register(Box::new(trial_duration_seconds.clone()))?;

        let backups_total = CounterVec::new(
            Opts::new("paramtune_backups_total", "Backup operations by kind"),
            &["operation"],
        )?;
        registry.register(Box::new(backups_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            trials_total,
            current_score,
            target_score,
            manual_edits_total,
            trial_duration_seconds,
            backups_total,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    /// Count a finished trial and observe its duration
    pub fn record_trial(&self, trial: &OptimizationResult) {
        let status = trial.status.to_string();
        self.trials_total
            .with_label_values(&[trial.strategy.as_str(), status.as_str()])
            .inc();

        if let Some(finished_at) = trial.finished_at {
            let elapsed = (finished_at - trial.timestamp)
                .to_std()
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0);
            self.trial_duration_seconds
                .with_label_values(&[trial.strategy.as_str()])
                .observe(elapsed);
        }
    }

    pub fn inc_manual_edits(&self, outcome: &str) {
        self.manual_edits_total.with_label_values(&[outcome]).inc();
    }

    pub fn inc_backups(&self, operation: &str) {
        self.backups_total.with_label_values(&[operation]).inc();
    }
}

/// Keeps `OptimizerMetrics` in sync with optimizer events.
///
/// Scores are not part of edit or restore events, so callers refresh
/// `current_score` from the optimizer when they need it exact after those.
pub struct MetricsListener {
    metrics: OptimizerMetrics,
}

impl MetricsListener {
    pub fn new(metrics: OptimizerMetrics) -> Self {
        Self { metrics }
    }
}

impl EventListener for MetricsListener {
    fn on_event(&self, event: &OptimizerEvent) {
        match event {
            OptimizerEvent::TrialStarted { trial } => {
                self.metrics.current_score.set(trial.previous_score);
            }
            OptimizerEvent::TrialCompleted { trial } => {
                self.metrics.record_trial(trial);
                self.metrics.current_score.set(trial.score);
            }
            OptimizerEvent::TrialFailed { trial } => {
                self.metrics.record_trial(trial);
            }
            OptimizerEvent::ParametersEdited { edits } => {
                for edit in edits {
                    let outcome = if edit.was_clamped() { "clamped" } else { "applied" };
                    self.metrics.inc_manual_edits(outcome);
                }
            }
            OptimizerEvent::BackupCreated { .. } => self.metrics.inc_backups("backup"),
            OptimizerEvent::BackupRestored { .. } => self.metrics.inc_backups("restore"),
        }
    }
}
