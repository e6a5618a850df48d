use std::{env, error::Error, rc::Rc};

use common::subject_observer::Subject;
use futures::executor::block_on;
use log::info;
use painter::{
    evolution::{EvolutionConfig, EvolutionEngine},
    FitnessMetric, RasterBuffer,
};
use painter_ext::gateways::{HistoryGateway, HistoryLog, LogGateway};
use rand::thread_rng;
use simple_logger::SimpleLogger;

const SIZE: u32 = 64;

/// Paints a black disk with random circles.
///
/// Usage: `disk [generations] [metric]`
fn main() -> Result<(), Box<dyn Error>> {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;

    let generations = env::args()
        .nth(1)
        .map(|arg| arg.parse::<u64>())
        .transpose()?
        .unwrap_or(2000);
    let metric = env::args().nth(2).unwrap_or("perceptual".to_string());

    let mut target = RasterBuffer::new(SIZE, SIZE)?;
    target.fill_circle(SIZE as i64 / 2, SIZE as i64 / 2, SIZE / 3, [0, 0, 0, 255]);
    let mut candidate = RasterBuffer::new(SIZE, SIZE)?;

    let config = EvolutionConfig::new(50, &metric, 250)?;
    let metric: FitnessMetric = config.metric;
    let mut engine = EvolutionEngine::new(config)?;
    let history = HistoryLog::new(16);
    let log_gateway = Rc::new(LogGateway::new(log::Level::Info));
    engine.register_observer(log_gateway.clone());
    engine.register_observer(Rc::new(HistoryGateway::new(history.clone())));

    let report = block_on(engine.start(
        &target,
        &mut candidate,
        |generation, _| generation >= generations,
        &mut thread_rng(),
    ))?;
    engine.unregister_observer(log_gateway);

    info!(
        "{} generations, fitness {} ({} check: {})",
        report.generations,
        report.fitness,
        metric,
        metric.evaluate(&target, &candidate)?
    );
    for entry in history.entries() {
        info!("generation {:>6}: {:.3}", entry.generation, entry.fitness);
    }
    Ok(())
}
