use super::parameters::ParameterSet;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy)]
struct Snapshot {
    parameters: ParameterSet,
    score: f64,
    taken_at: DateTime<Utc>,
}

/// Single-slot snapshot of a parameter set and the score it held.
///
/// Each `backup` replaces the previous snapshot; `restore` is repeatable.
#[derive(Debug, Clone, Default)]
pub struct BackupManager {
    slot: Option<Snapshot>,
}

impl BackupManager {
    pub fn new() -> Self {
        Self { slot: None }
    }

    pub fn backup(&mut self, parameters: &ParameterSet, score: f64) {
        self.slot = Some(Snapshot {
            parameters: *parameters,
            score,
            taken_at: Utc::now(),
        });
    }

    /// The last snapshot, or `None` if `backup` was never called
    pub fn restore(&self) -> Option<ParameterSet> {
        self.slot.map(|s| s.parameters)
    }

    /// Score recorded alongside the snapshot
    pub fn score(&self) -> Option<f64> {
        self.slot.map(|s| s.score)
    }

    pub fn has_backup(&self) -> bool {
        self.slot.is_some()
    }

    pub fn backed_up_at(&self) -> Option<DateTime<Utc>> {
        self.slot.map(|s| s.taken_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::optimization::parameters::Parameter;

    #[test]
    fn test_restore_without_backup() {
        let manager = BackupManager::new();
        assert!(manager.restore().is_none());
        assert!(manager.score().is_none());
        assert!(!manager.has_backup());
        assert!(manager.backed_up_at().is_none());
    }

    #[test]
    fn test_backup_replaces_previous() {
        let mut manager = BackupManager::new();
        let first = ParameterSet::default();
        let second = first.with(Parameter::StopLoss, 0.2);

        manager.backup(&first, 80.0);
        manager.backup(&second, 82.5);

        assert_eq!(manager.restore(), Some(second));
        assert_eq!(manager.score(), Some(82.5));
    }

    #[test]
    fn test_restore_is_repeatable() {
        let mut manager = BackupManager::new();
        manager.backup(&ParameterSet::default(), 87.5);

        assert_eq!(manager.restore(), Some(ParameterSet::default()));
        assert_eq!(manager.restore(), Some(ParameterSet::default()));
        assert!(manager.has_backup());
        assert!(manager.backed_up_at().is_some());
    }
}
