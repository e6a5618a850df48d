use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{EvolutionError, EvolutionStatus};

#[derive(Debug, Clone, Copy, PartialEq)]
struct RunState {
    status: EvolutionStatus,
    run_id: u64,
    generation: u64,
    fitness: f64,
}

impl Default for RunState {
    fn default() -> Self {
        RunState {
            status: EvolutionStatus::Idle,
            run_id: 0,
            generation: 0,
            fitness: f64::INFINITY,
        }
    }
}

/// Shared lifecycle state of a run.
///
/// Clones observe and control the same run, from any thread. Only one run can
/// be active per handle; a stopped run is recognized by its id changing or
/// the status leaving `Running`.
#[derive(Clone, Debug, Default)]
pub struct EvolutionHandle {
    state: Arc<Mutex<RunState>>,
}

impl EvolutionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> EvolutionStatus {
        self.lock().status
    }

    pub fn is_running(&self) -> bool {
        self.status() == EvolutionStatus::Running
    }

    /// Generations completed by the active run, 0 when idle.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Best fitness of the latest run, infinite before its first generation.
    pub fn fitness(&self) -> f64 {
        self.lock().fitness
    }

    /// Requests the active run to end at its next generation boundary.
    ///
    /// Moves to `Idle` and resets the generation counter right away. Returns
    /// `false`, doing nothing, when already idle.
    pub fn stop(&self) -> bool {
        let mut state = self.lock();
        if state.status != EvolutionStatus::Running {
            return false;
        }
        state.status = EvolutionStatus::Idle;
        state.generation = 0;
        true
    }

    pub(crate) fn begin(&self) -> Result<u64, EvolutionError> {
        let mut state = self.lock();
        if state.status == EvolutionStatus::Running {
            return Err(EvolutionError::AlreadyRunning);
        }
        let run_id = state.run_id.wrapping_add(1);
        *state = RunState {
            status: EvolutionStatus::Running,
            run_id,
            generation: 0,
            fitness: f64::INFINITY,
        };
        Ok(run_id)
    }

    pub(crate) fn is_current(&self, run_id: u64) -> bool {
        let state = self.lock();
        state.status == EvolutionStatus::Running && state.run_id == run_id
    }

    /// Counts a completed generation, `None` if the run was stopped meanwhile.
    pub(crate) fn record_generation(&self, run_id: u64, fitness: f64) -> Option<u64> {
        let mut state = self.lock();
        if state.status != EvolutionStatus::Running || state.run_id != run_id {
            return None;
        }
        state.generation += 1;
        state.fitness = fitness;
        Some(state.generation)
    }

    /// Ends `run_id` if it is still the active run.
    pub(crate) fn finish(&self, run_id: u64) -> bool {
        let mut state = self.lock();
        if state.status != EvolutionStatus::Running || state.run_id != run_id {
            return false;
        }
        state.status = EvolutionStatus::Idle;
        state.generation = 0;
        true
    }

    fn lock(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
