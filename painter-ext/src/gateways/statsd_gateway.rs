use std::{fmt::Debug, io::Error, net::ToSocketAddrs};

use common::subject_observer::Observer;
use dipstick::{Input, Statsd};
use log::trace;
use painter::evolution::{EventType, EvolutionEngine};

use super::{FITNESS, GENERATION, PAINTER_PROXY};

/// Publishes run progress to a StatsD server.
pub struct StatsdGateway {
    factor: f64,
}

impl StatsdGateway {
    /// `factor` scales the fitness before sending, StatsD gauges being
    /// coarse for the small averages of near-converged runs.
    pub fn new<A>(address: A, factor: f64) -> Result<Self, Error>
    where
        A: ToSocketAddrs + Debug + Clone,
    {
        let statsd_scope = Statsd::send_to(address)?.metrics();
        PAINTER_PROXY.target(statsd_scope);

        Ok(StatsdGateway { factor })
    }

    fn scaled(&self, fitness: f64) -> Option<f64> {
        fitness.is_finite().then(|| fitness * self.factor)
    }
}

impl Observer<EvolutionEngine, EventType> for StatsdGateway {
    fn update(&self, source: &EvolutionEngine, event: EventType) {
        if event == EventType::GenerationCompleted {
            let generation = source.generation();
            GENERATION.value(generation);
            if let Some(fitness) = self.scaled(source.fitness()) {
                trace!("Sending metrics for generation {generation}: fitness={fitness}");
                FITNESS.value(fitness);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StatsdGateway;

    #[test]
    fn test_statsd_gateway_requires_resolvable_address() {
        for (address, resolvable) in [("", false), ("no-port", false), ("127.0.0.1:8125", true)] {
            let result = StatsdGateway::new(address, 1.0);
            assert_eq!(
                resolvable,
                result.is_ok(),
                "Unexpected outcome for address {address:?}"
            );
        }

        let gateway = StatsdGateway::new(("127.0.0.1", 8125), 250.0).unwrap();
        assert_eq!(250.0, gateway.factor);
    }

    #[test]
    fn test_scaled() {
        let gateway = StatsdGateway::new("127.0.0.1:8125", 10.0).unwrap();

        assert_eq!(Some(25.0), gateway.scaled(2.5));
        assert_eq!(
            None,
            gateway.scaled(f64::INFINITY),
            "Should not send a fitness before the first generation"
        );
    }
}
