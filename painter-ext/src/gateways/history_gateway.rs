use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use common::subject_observer::Observer;
use log::trace;
use painter::{
    evolution::{EventType, EvolutionEngine, EvolutionStatus},
    RasterSnapshot,
};

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub generation: u64,
    pub fitness: f64,
    pub candidate: RasterSnapshot,
}

/// Bounded scrollback of snapshots, oldest first.
///
/// Clones share the same entries, so a log can be read from another thread
/// while a run fills it.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    capacity: usize,
    entries: Arc<Mutex<VecDeque<HistoryEntry>>>,
}

impl HistoryLog {
    pub fn new(capacity: usize) -> Self {
        HistoryLog {
            capacity,
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends `entry`, dropping the oldest ones beyond capacity.
    pub fn push(&self, entry: HistoryEntry) {
        let mut entries = self.lock();
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<HistoryEntry> {
        self.lock().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<HistoryEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Records every snapshot of a run into a [`HistoryLog`], starting afresh
/// with each run.
pub struct HistoryGateway {
    history: HistoryLog,
}

impl HistoryGateway {
    pub fn new(history: HistoryLog) -> Self {
        HistoryGateway { history }
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }
}

impl Observer<EvolutionEngine, EventType> for HistoryGateway {
    fn update(&self, source: &EvolutionEngine, event: EventType) {
        match event {
            EventType::StatusChanged(EvolutionStatus::Running) => self.history.clear(),
            EventType::SnapshotTaken => {
                if let Some(snapshot) = source.snapshot() {
                    trace!("History entry for generation {}", snapshot.generation);
                    self.history.push(HistoryEntry {
                        generation: snapshot.generation,
                        fitness: snapshot.fitness,
                        candidate: snapshot.candidate.clone(),
                    });
                }
            }
            _ => {}
        }
    }
}
