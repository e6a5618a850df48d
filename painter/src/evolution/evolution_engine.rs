use std::{
    future::Future,
    pin::Pin,
    rc::Rc,
    task::{Context, Poll},
};

use common::subject_observer::{remove_observer, Observer, SharedObservers, Subject};
use log::{debug, info, trace, warn};
use rand::Rng;

use super::{
    run_generation, EventType, EvolutionConfig, EvolutionError, EvolutionHandle,
    EvolutionResult, EvolutionStatus, GenerationOutcome, RunReport, Snapshot,
};
use crate::{
    mutation::{CircleMutation, Mutation},
    raster::RasterBuffer,
};

/// Drives generations of the (1+λ) strategy until stopped.
///
/// Every generation ends with an unconditional yield to the executor, which is
/// also the only point where a stop request is observed.
#[derive(Default)]
pub struct EvolutionEngine {
    observers: SharedObservers<Self, EventType>,
    config: EvolutionConfig,
    mutation: Option<Box<dyn Mutation>>,
    handle: EvolutionHandle,
    last_outcome: Option<GenerationOutcome>,
    snapshot: Option<Snapshot>,
}

impl Subject<EventType> for EvolutionEngine {
    fn register_observer(&mut self, observer: Rc<dyn Observer<Self, EventType>>) {
        self.observers.push(observer);
    }

    fn unregister_observer(&mut self, observer: Rc<dyn Observer<Self, EventType>>) {
        remove_observer(&mut self.observers, &observer);
    }

    fn notify_observers(&self, event: EventType) {
        for obs in &self.observers {
            obs.update(self, event.clone());
        }
    }
}

impl EvolutionEngine {
    pub fn new(config: EvolutionConfig) -> Result<Self, EvolutionError> {
        let mut engine = Self::default();
        engine.configure(config)?;
        Ok(engine)
    }

    /// Engine whose runs are controlled through an existing handle.
    pub fn with_handle(handle: EvolutionHandle) -> Self {
        EvolutionEngine {
            handle,
            ..Default::default()
        }
    }

    /// Replaces the circle mutation built from the configuration.
    pub fn with_mutation(mut self, mutation: Box<dyn Mutation>) -> Self {
        self.mutation = Some(mutation);
        self
    }

    pub fn configure(&mut self, config: EvolutionConfig) -> Result<(), EvolutionError> {
        if self.handle.is_running() {
            return Err(EvolutionError::AlreadyRunning);
        }
        config.check()?;
        debug!("Evolution configured: {config:?}");
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn handle(&self) -> EvolutionHandle {
        self.handle.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    pub fn generation(&self) -> u64 {
        self.handle.generation()
    }

    pub fn fitness(&self) -> f64 {
        self.handle.fitness()
    }

    pub fn stop(&self) -> bool {
        self.handle.stop()
    }

    pub fn last_outcome(&self) -> Option<GenerationOutcome> {
        self.last_outcome
    }

    /// Latest emitted snapshot of the run.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Evolves `candidate` toward `target` until the run is stopped or
    /// `is_complete(generation, fitness)` holds after a generation.
    ///
    /// A stop requested while a generation is computed lets that generation
    /// finish on `candidate`, but it is neither counted nor reported.
    pub async fn start<F, R>(
        &mut self,
        target: &RasterBuffer,
        candidate: &mut RasterBuffer,
        is_complete: F,
        rng: &mut R,
    ) -> EvolutionResult
    where
        F: Fn(u64, f64) -> bool,
        R: Rng,
    {
        let config = self.config.clone();
        config.check()?;
        target.ensure_same_shape(candidate)?;
        let run_id = self.handle.begin().map_err(|e| {
            warn!("Evolution not started: {e}");
            e
        })?;
        let _guard = RunGuard {
            handle: self.handle.clone(),
            run_id,
        };

        let default_mutation = CircleMutation::from(&config.mutation);
        let mutation: &dyn Mutation = match &self.mutation {
            Some(mutation) => mutation.as_ref(),
            None => &default_mutation,
        };

        self.last_outcome = None;
        self.snapshot = None;
        info!(
            "Evolution started on {:?} (population: {}, metric: {}, snapshot every {} generations)",
            target.dimensions(),
            config.population_size,
            config.metric,
            config.snapshot_frequency
        );
        self.notify_observers(EventType::StatusChanged(EvolutionStatus::Running));

        let mut report = RunReport {
            generations: 0,
            fitness: f64::INFINITY,
        };
        let mut failure = None;
        while self.handle.is_current(run_id) {
            let outcome = match run_generation(
                target,
                candidate,
                config.population_size,
                config.metric,
                mutation,
                rng,
            ) {
                Ok(outcome) => outcome,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            };
            let Some(generation) = self.handle.record_generation(run_id, outcome.fitness) else {
                debug!("Evolution stopped during a generation, discarding it");
                break;
            };
            if outcome.improved() {
                debug!("Generation {generation}: fitness {}", outcome.fitness);
            } else {
                trace!("Generation {generation}: no improvement");
            }
            report = RunReport {
                generations: generation,
                fitness: outcome.fitness,
            };
            self.last_outcome = Some(outcome);
            self.notify_observers(EventType::GenerationCompleted);

            if generation % config.snapshot_frequency == 0 && self.handle.is_current(run_id) {
                self.snapshot = Some(Snapshot {
                    generation,
                    fitness: outcome.fitness,
                    candidate: candidate.to_snapshot(),
                });
                self.notify_observers(EventType::SnapshotTaken);
            }

            if is_complete(generation, outcome.fitness) {
                break;
            }
            yield_now().await;
        }

        self.handle.finish(run_id);
        self.notify_observers(EventType::StatusChanged(EvolutionStatus::Idle));
        match failure {
            Some(e) => {
                warn!("Evolution failed after {} generations: {e}", report.generations);
                Err(e)
            }
            None => {
                info!(
                    "Evolution stopped after {} generations (fitness: {})",
                    report.generations, report.fitness
                );
                Ok(report)
            }
        }
    }
}

/// Ends the run if the driving future is dropped before finishing.
struct RunGuard {
    handle: EvolutionHandle,
    run_id: u64,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if self.handle.finish(self.run_id) {
            debug!("Evolution abandoned, run {} stopped", self.run_id);
        }
    }
}

/// Pending on the first poll, ready on the second.
struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

fn yield_now() -> YieldNow {
    YieldNow { yielded: false }
}
