use common::subject_observer::Observer;
use dipstick::{Gauge, Input, InputScope, Log, LogScope};
use painter::evolution::{EventType, EvolutionEngine};

use super::{FITNESS_METRIC, GENERATION_METRIC};

/// Writes run progress as metrics through the `log` facade.
pub struct LogGateway {
    generation: Gauge,
    fitness: Gauge,
}

impl LogGateway {
    pub fn new(level: log::Level) -> Self {
        let scope: LogScope = Log::to_log().level(level).metrics();
        LogGateway {
            generation: scope.gauge(GENERATION_METRIC),
            fitness: scope.gauge(FITNESS_METRIC),
        }
    }
}

impl Default for LogGateway {
    fn default() -> Self {
        Self::new(log::Level::Debug)
    }
}

impl Observer<EvolutionEngine, EventType> for LogGateway {
    fn update(&self, source: &EvolutionEngine, event: EventType) {
        if event == EventType::SnapshotTaken {
            if let Some(snapshot) = source.snapshot() {
                self.generation.value(snapshot.generation);
                self.fitness.value(snapshot.fitness);
            }
        }
    }
}
