use super::parameters::ParameterSet;
use crate::domain::errors::OptimizationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use uuid::Uuid;

/// Default number of trials retained
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialStatus {
    Running,
    Completed,
    Failed,
}

impl fmt::Display for TrialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrialStatus::Running => write!(f, "running"),
            TrialStatus::Completed => write!(f, "completed"),
            TrialStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Percentage change from `old` to `new`; 0 when there is no baseline
pub fn improvement_pct(old: f64, new: f64) -> f64 {
    if old > 0.0 {
        (new / old - 1.0) * 100.0
    } else {
        0.0
    }
}

/// Record of one optimization trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub strategy: String,
    /// Score in effect when the trial started
    pub previous_score: f64,
    /// Score in effect after the trial
    pub score: f64,
    pub improvement_pct: f64,
    /// Parameters in effect after the trial (the pre-trial snapshot while running or on failure)
    pub parameters: ParameterSet,
    pub status: TrialStatus,
    pub error: Option<String>,
}

impl OptimizationResult {
    /// Pending record created when a trial is admitted
    pub fn running(
        strategy: impl Into<String>,
        snapshot: ParameterSet,
        previous_score: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            finished_at: None,
            strategy: strategy.into(),
            previous_score,
            score: previous_score,
            improvement_pct: 0.0,
            parameters: snapshot,
            status: TrialStatus::Running,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != TrialStatus::Running
    }

    /// Running -> Completed. Terminal records are returned unchanged.
    pub fn complete(mut self, parameters: ParameterSet, score: f64) -> Self {
        if self.is_terminal() {
            return self;
        }
        self.parameters = parameters;
        self.score = score;
        self.improvement_pct = improvement_pct(self.previous_score, score);
        self.status = TrialStatus::Completed;
        self.finished_at = Some(Utc::now());
        self
    }

    /// Running -> Failed. Parameters and score stay at their pre-trial values.
    pub fn fail(mut self, error: &OptimizationError) -> Self {
        if self.is_terminal() {
            return self;
        }
        self.status = TrialStatus::Failed;
        self.error = Some(error.to_string());
        self.finished_at = Some(Utc::now());
        self
    }
}

impl fmt::Display for OptimizationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            TrialStatus::Failed => write!(
                f,
                "{} trial failed: {}",
                self.strategy,
                self.error.as_deref().unwrap_or("unknown error")
            ),
            _ => write!(
                f,
                "{} trial {}: score {:.2}/100 ({:+.1}%)",
                self.strategy, self.status, self.score, self.improvement_pct
            ),
        }
    }
}

/// Capped, newest-first log of trial outcomes
#[derive(Debug, Clone)]
pub struct OptimizationHistory {
    entries: VecDeque<OptimizationResult>,
    capacity: usize,
}

impl OptimizationHistory {
    /// A capacity of 0 is raised to 1
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepend a result, evicting the oldest entry once full
    pub fn record(&mut self, result: OptimizationResult) {
        self.entries.push_front(result);
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> Vec<OptimizationResult> {
        self.entries.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&OptimizationResult> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptimizationResult> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for OptimizationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
