use crate::domain::optimization::{OptimizationResult, ParameterEdit, ParameterSet};
use serde::Serialize;
use tracing::{info, warn};

/// Notifications published by the optimizer for outer layers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptimizerEvent {
    ParametersEdited { edits: Vec<ParameterEdit> },
    TrialStarted { trial: OptimizationResult },
    TrialCompleted { trial: OptimizationResult },
    TrialFailed { trial: OptimizationResult },
    BackupCreated { parameters: ParameterSet },
    BackupRestored { parameters: ParameterSet },
}

/// Receives optimizer events; called synchronously on the publishing thread
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: &OptimizerEvent);
}

/// Writes every event to the log
pub struct LoggingListener;

impl EventListener for LoggingListener {
    fn on_event(&self, event: &OptimizerEvent) {
        match event {
            OptimizerEvent::ParametersEdited { edits } => {
                for edit in edits {
                    info!(
                        "Event: {} set to {} (requested {})",
                        edit.parameter, edit.applied, edit.requested
                    );
                }
            }
            OptimizerEvent::TrialStarted { trial } => {
                info!("Event: {} trial {} started", trial.strategy, trial.id);
            }
            OptimizerEvent::TrialCompleted { trial } => info!("Event: {}", trial),
            OptimizerEvent::TrialFailed { trial } => warn!("Event: {}", trial),
            OptimizerEvent::BackupCreated { .. } => info!("Event: parameter backup created"),
            OptimizerEvent::BackupRestored { .. } => {
                info!("Event: parameters restored from backup")
            }
        }
    }
}
