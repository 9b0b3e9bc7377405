use crate::application::optimization::strategies::{OptimizationStrategy, StrategyRegistry};
use crate::domain::errors::{ControllerError, OptimizationError};
use crate::domain::events::{EventListener, OptimizerEvent};
use crate::domain::optimization::optimization_history::DEFAULT_HISTORY_CAPACITY;
use crate::domain::optimization::scoring::{MAX_SCORE, MIN_SCORE};
use crate::domain::optimization::{
    BackupManager, BoundsRegistry, CompositeScoreEvaluator, OptimizationHistory,
    OptimizationResult, Parameter, ParameterEdit, ParameterSet, RandomSource, ScoreEvaluator,
    SeededRandom, StrategyKind,
};
use crate::infrastructure::event_bus::EventBus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runtime knobs for a `ParameterOptimizer`
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerSettings {
    /// Score assumed for the starting parameter set
    pub initial_score: f64,
    pub target_score: f64,
    pub history_capacity: usize,
    /// Multiplier applied to every strategy's variance
    pub intensity: f64,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            initial_score: 87.5,
            target_score: 95.0,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            intensity: 1.0,
        }
    }
}

/// Shared flag used to abandon a trial before its candidate is scored
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy)]
struct CommittedState {
    parameters: ParameterSet,
    current_score: f64,
}

/// Held while a trial, edit or restore owns the right to mutate the set
struct MutationGuard<'a> {
    slot: &'a AtomicBool,
}

impl<'a> MutationGuard<'a> {
    fn try_acquire(slot: &'a AtomicBool) -> Option<Self> {
        slot.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { slot })
    }
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        self.slot.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Builder for `ParameterOptimizer`
pub struct OptimizerBuilder {
    settings: OptimizerSettings,
    bounds: BoundsRegistry,
    evaluator: Arc<dyn ScoreEvaluator>,
    strategies: StrategyRegistry,
    parameters: ParameterSet,
    rng: Option<Box<dyn RandomSource>>,
    events: EventBus,
}

impl OptimizerBuilder {
    fn new() -> Self {
        Self {
            settings: OptimizerSettings::default(),
            bounds: BoundsRegistry::standard(),
            evaluator: Arc::new(CompositeScoreEvaluator::default()),
            strategies: StrategyRegistry::standard(),
            parameters: ParameterSet::default(),
            rng: None,
            events: EventBus::new(),
        }
    }

    pub fn settings(mut self, settings: OptimizerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn bounds(mut self, bounds: BoundsRegistry) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn evaluator(mut self, evaluator: Arc<dyn ScoreEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn strategies(mut self, strategies: StrategyRegistry) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn parameters(mut self, parameters: ParameterSet) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn random_source(mut self, rng: Box<dyn RandomSource>) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Shorthand for a `SeededRandom` with the given seed
    pub fn seed(self, seed: u64) -> Self {
        self.random_source(Box::new(SeededRandom::new(seed)))
    }

    pub fn event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    /// # Errors
    ///
    /// `ControllerError::Parameter` when the starting set violates the bounds
    /// or an invariant.
    pub fn build(self) -> Result<ParameterOptimizer, ControllerError> {
        self.parameters.validate(&self.bounds)?;
        Ok(self.assemble())
    }

    fn assemble(self) -> ParameterOptimizer {
        let rng = self
            .rng
            .unwrap_or_else(|| Box::new(SeededRandom::from_entropy()));

        info!(
            "ParameterOptimizer: initialized (score {:.2}, target {:.2}, evaluator {}, {} strategies)",
            self.settings.initial_score,
            self.settings.target_score,
            self.evaluator.name(),
            self.strategies.len()
        );

        ParameterOptimizer {
            state: RwLock::new(CommittedState {
                parameters: self.parameters,
                current_score: self.settings.initial_score,
            }),
            target_score: RwLock::new(self.settings.target_score),
            mutation_slot: AtomicBool::new(false),
            active_trial: Mutex::new(None),
            history: Mutex::new(OptimizationHistory::new(self.settings.history_capacity)),
            best_result: Mutex::new(None),
            backup: Mutex::new(BackupManager::new()),
            rng: Mutex::new(rng),
            intensity: self.settings.intensity,
            bounds: self.bounds,
            evaluator: self.evaluator,
            strategies: self.strategies,
            events: self.events,
        }
    }
}

/// Owns the live parameter set and runs optimization trials against it.
///
/// Trials, manual edits and restores share a single mutation slot: while one
/// of them holds it, the others are rejected with `TrialInProgress` instead of
/// queueing. Readers never wait on a running strategy.
pub struct ParameterOptimizer {
    bounds: BoundsRegistry,
    evaluator: Arc<dyn ScoreEvaluator>,
    strategies: StrategyRegistry,
    state: RwLock<CommittedState>,
    target_score: RwLock<f64>,
    mutation_slot: AtomicBool,
    active_trial: Mutex<Option<OptimizationResult>>,
    history: Mutex<OptimizationHistory>,
    best_result: Mutex<Option<OptimizationResult>>,
    backup: Mutex<BackupManager>,
    rng: Mutex<Box<dyn RandomSource>>,
    intensity: f64,
    events: EventBus,
}

impl ParameterOptimizer {
    pub fn builder() -> OptimizerBuilder {
        OptimizerBuilder::new()
    }

    /// Default bounds, evaluator and strategies with the given seed
    pub fn seeded(seed: u64) -> Self {
        // The default set always satisfies the standard bounds
        OptimizerBuilder::new().seed(seed).assemble()
    }

    // ===== Reads =====

    pub fn parameters(&self) -> ParameterSet {
        read(&self.state).parameters
    }

    pub fn current_score(&self) -> f64 {
        read(&self.state).current_score
    }

    pub fn target_score(&self) -> f64 {
        *read(&self.target_score)
    }

    pub fn target_reached(&self) -> bool {
        self.current_score() >= self.target_score()
    }

    /// Derived as `1 - treasury - burn`
    pub fn buyback_allocation(&self) -> f64 {
        self.parameters().buyback_allocation()
    }

    /// Finished trials, newest first
    pub fn history(&self) -> Vec<OptimizationResult> {
        lock(&self.history).entries()
    }

    /// Pending record of the trial currently running, if any
    pub fn active_trial(&self) -> Option<OptimizationResult> {
        lock(&self.active_trial).clone()
    }

    /// Highest-scoring completed trial seen by this optimizer
    pub fn best_result(&self) -> Option<OptimizationResult> {
        lock(&self.best_result).clone()
    }

    pub fn bounds(&self) -> &BoundsRegistry {
        &self.bounds
    }

    pub fn is_busy(&self) -> bool {
        self.mutation_slot.load(Ordering::Acquire)
    }

    pub fn set_target_score(&self, target: f64) {
        if !target.is_finite() {
            warn!("ParameterOptimizer: ignoring non-finite target score {}", target);
            return;
        }
        let target = target.clamp(MIN_SCORE, MAX_SCORE);
        *write(&self.target_score) = target;
        info!("ParameterOptimizer: target score set to {:.2}", target);
    }

    pub fn subscribe(&self, listener: Arc<dyn EventListener>) {
        self.events.subscribe(listener);
    }

    // ===== Manual edits =====

    /// Clamp `value` into the field's bounds and commit it.
    ///
    /// # Errors
    ///
    /// `TrialInProgress` while another mutation holds the slot, `Parameter`
    /// when the value is non-finite or the edit would break an invariant. The
    /// committed set is unchanged on error.
    pub fn set_parameter(
        &self,
        parameter: Parameter,
        value: f64,
    ) -> Result<ParameterEdit, ControllerError> {
        let mut edits = self.set_parameters(&[(parameter, value)])?;
        Ok(edits.remove(0))
    }

    /// Apply several edits atomically; none are committed if any fails
    pub fn set_parameters(
        &self,
        edits: &[(Parameter, f64)],
    ) -> Result<Vec<ParameterEdit>, ControllerError> {
        let guard = self.acquire_slot()?;

        let current = self.parameters();
        let (updated, applied) = match current.apply_manual_edits(&self.bounds, edits) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("ParameterOptimizer: manual edit rejected: {}", e);
                return Err(e.into());
            }
        };

        write(&self.state).parameters = updated;

        for edit in applied.iter().filter(|e| e.was_clamped()) {
            let bound = self.bounds.bounds_of(edit.parameter);
            warn!(
                "ParameterOptimizer: {} = {} outside [{}, {}], clamped to {}",
                edit.parameter, edit.requested, bound.min, bound.max, edit.applied
            );
        }
        info!("ParameterOptimizer: applied {} manual edit(s)", applied.len());

        // Listeners may issue follow-up mutations
        drop(guard);
        self.events.publish(OptimizerEvent::ParametersEdited {
            edits: applied.clone(),
        });
        Ok(applied)
    }

    // ===== Backup =====

    /// Snapshot the committed set and score, replacing any earlier snapshot
    pub fn backup(&self) -> ParameterSet {
        let snapshot = *read(&self.state);
        lock(&self.backup).backup(&snapshot.parameters, snapshot.current_score);
        info!(
            "ParameterOptimizer: backup created (score {:.2})",
            snapshot.current_score
        );

        self.events.publish(OptimizerEvent::BackupCreated {
            parameters: snapshot.parameters,
        });
        snapshot.parameters
    }

    /// Make the last snapshot current again. The snapshot is kept.
    ///
    /// # Errors
    ///
    /// `NoBackup` when `backup` was never called, `TrialInProgress` while
    /// another mutation holds the slot.
    pub fn restore(&self) -> Result<ParameterSet, ControllerError> {
        let guard = self.acquire_slot()?;

        let (parameters, score) = {
            let backup = lock(&self.backup);
            match (backup.restore(), backup.score()) {
                (Some(parameters), Some(score)) => (parameters, score),
                _ => {
                    warn!("ParameterOptimizer: restore requested without a backup");
                    return Err(ControllerError::NoBackup);
                }
            }
        };

        {
            let mut state = write(&self.state);
            state.parameters = parameters;
            state.current_score = score;
        }
        info!(
            "ParameterOptimizer: parameters restored from backup (score {:.2})",
            score
        );

        drop(guard);
        self.events.publish(OptimizerEvent::BackupRestored { parameters });
        Ok(parameters)
    }

    // ===== Trials =====

    /// Run one trial of the strategy named `name`.
    ///
    /// # Errors
    ///
    /// `UnknownStrategy` for an unrecognised name, `TrialInProgress` while
    /// another mutation holds the slot, `OptimizationFailure` when the trial
    /// failed (the failure is still recorded in history).
    pub fn run_optimization(&self, name: &str) -> Result<OptimizationResult, ControllerError> {
        let kind: StrategyKind = name
            .parse()
            .map_err(|_| ControllerError::UnknownStrategy(name.to_string()))?;
        self.run_strategy(kind)
    }

    pub fn run_strategy(&self, kind: StrategyKind) -> Result<OptimizationResult, ControllerError> {
        self.run_with_cancellation(kind, &CancellationToken::new())
    }

    pub fn run_with_cancellation(
        &self,
        kind: StrategyKind,
        cancel: &CancellationToken,
    ) -> Result<OptimizationResult, ControllerError> {
        let strategy = self
            .strategies
            .get(kind)
            .ok_or_else(|| ControllerError::UnknownStrategy(kind.name().to_string()))?;
        self.run_trial(strategy.as_ref(), cancel)
    }

    fn run_trial(
        &self,
        strategy: &dyn OptimizationStrategy,
        cancel: &CancellationToken,
    ) -> Result<OptimizationResult, ControllerError> {
        let guard = self.acquire_slot()?;
        let started = Instant::now();

        let snapshot = *read(&self.state);
        let pending = OptimizationResult::running(
            strategy.name(),
            snapshot.parameters,
            snapshot.current_score,
        );
        *lock(&self.active_trial) = Some(pending.clone());
        info!(
            "ParameterOptimizer: {} trial {} started (score {:.2})",
            pending.strategy, pending.id, pending.previous_score
        );
        self.events.publish(OptimizerEvent::TrialStarted {
            trial: pending.clone(),
        });

        let outcome = self.evaluate_candidate(strategy, &snapshot.parameters, cancel);

        match outcome {
            Ok((candidate, score)) => {
                let result = pending.complete(candidate, score);
                {
                    let mut state = write(&self.state);
                    state.parameters = candidate;
                    state.current_score = score;
                    lock(&self.history).record(result.clone());
                }
                self.track_best(&result);
                *lock(&self.active_trial) = None;

                info!(
                    "ParameterOptimizer: {} (took {:?})",
                    result,
                    started.elapsed()
                );
                if self.target_reached() {
                    info!(
                        "ParameterOptimizer: target score {:.2} reached",
                        self.target_score()
                    );
                }

                // Listeners may issue follow-up mutations
                drop(guard);
                self.events.publish(OptimizerEvent::TrialCompleted {
                    trial: result.clone(),
                });
                Ok(result)
            }
            Err(error) => {
                let result = pending.fail(&error);
                lock(&self.history).record(result.clone());
                *lock(&self.active_trial) = None;

                warn!("ParameterOptimizer: {}", result);
                drop(guard);
                self.events.publish(OptimizerEvent::TrialFailed { trial: result });
                Err(ControllerError::OptimizationFailure(error))
            }
        }
    }

    /// Propose, validate and score a candidate without touching committed state
    fn evaluate_candidate(
        &self,
        strategy: &dyn OptimizationStrategy,
        current: &ParameterSet,
        cancel: &CancellationToken,
    ) -> Result<(ParameterSet, f64), OptimizationError> {
        let mut rng = lock(&self.rng);

        let candidate = strategy.propose(current, &self.bounds, rng.as_mut(), self.intensity)?;
        candidate.validate(&self.bounds)?;

        if cancel.is_cancelled() {
            return Err(OptimizationError::Cancelled);
        }

        let score = self.evaluator.score(&candidate, rng.as_mut())?;
        debug!(
            "ParameterOptimizer: {} candidate scored {:.4}",
            strategy.name(),
            score
        );
        Ok((candidate, score))
    }

    fn track_best(&self, result: &OptimizationResult) {
        let mut best = lock(&self.best_result);
        let improved = best.as_ref().is_none_or(|b| result.score > b.score);
        if improved {
            *best = Some(result.clone());
        }
    }

    fn acquire_slot(&self) -> Result<MutationGuard<'_>, ControllerError> {
        MutationGuard::try_acquire(&self.mutation_slot).ok_or_else(|| {
            debug!("ParameterOptimizer: mutation rejected, slot busy");
            ControllerError::TrialInProgress
        })
    }
}
