use std::{cell::RefCell, rc::Rc, thread};

use common::subject_observer::{Observer, Subject};
use futures::{
    channel::oneshot::{self, Sender},
    executor::block_on,
};
use log::{debug, info, warn};
use painter::{
    evolution::{
        EventType, EvolutionConfig, EvolutionEngine, EvolutionError, EvolutionHandle,
        EvolutionStatus,
    },
    RasterBuffer, RasterError, RasterSnapshot,
};
use painter_ext::gateways::{HistoryEntry, HistoryGateway, HistoryLog, StatsdGateway};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{config::app::AppConfig, AppError};

const TARGET_COLOR: [u8; 4] = [0, 0, 0, 255];

/// Everything needed to start a run.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub config: EvolutionConfig,
    pub target: RasterBuffer,
    /// Generation after which the run ends on its own.
    pub generations: Option<u64>,
    pub seed: Option<u64>,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct RunStatus {
    pub running: bool,
    pub generation: u64,
    /// Best fitness of the latest run, absent before its first generation.
    pub fitness: Option<f64>,
}

/// RGBA image, row-major, 4 bytes per pixel.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    pub fn into_buffer(self) -> Result<RasterBuffer, RasterError> {
        RasterBuffer::from_rgba(self.width, self.height, self.pixels)
    }
}

impl From<&RasterSnapshot> for ImageData {
    fn from(snapshot: &RasterSnapshot) -> Self {
        ImageData {
            width: snapshot.width(),
            height: snapshot.height(),
            pixels: snapshot.pixels().to_vec(),
        }
    }
}

/// A snapshot of the run with the candidate image at that generation.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct HistoryItem {
    pub generation: u64,
    pub fitness: f64,
    pub candidate: ImageData,
}

impl From<&HistoryEntry> for HistoryItem {
    fn from(entry: &HistoryEntry) -> Self {
        HistoryItem {
            generation: entry.generation,
            fitness: entry.fitness,
            candidate: ImageData::from(&entry.candidate),
        }
    }
}

#[derive(Debug, Clone)]
struct StatsdSettings {
    host: String,
    port: u16,
    factor: f64,
}

/// Owns the single run of the service.
///
/// Runs execute on their own thread; the handle and the history are shared
/// with it so requests can follow and stop the run.
pub struct RunManager {
    handle: EvolutionHandle,
    history: HistoryLog,
    defaults: EvolutionConfig,
    target_size: (u32, u32),
    statsd: Option<StatsdSettings>,
}

impl RunManager {
    pub fn new(config: &AppConfig) -> Self {
        RunManager {
            handle: EvolutionHandle::new(),
            history: HistoryLog::new(config.history_capacity),
            defaults: config.evolution.clone(),
            target_size: (config.target_width, config.target_height),
            statsd: config.statsd_enabled.then(|| StatsdSettings {
                host: config.statsd_host.clone(),
                port: config.statsd_port,
                factor: config.statsd_factor,
            }),
        }
    }

    /// Run parameters used when a request leaves them out.
    pub fn defaults(&self) -> &EvolutionConfig {
        &self.defaults
    }

    /// Filled disk centered on a transparent background.
    pub fn default_target(&self) -> Result<RasterBuffer, AppError> {
        let (width, height) = self.target_size;
        let mut target = RasterBuffer::new(width, height).map_err(EvolutionError::from)?;
        target.fill_circle(
            i64::from(width / 2),
            i64::from(height / 2),
            width.min(height) / 3,
            TARGET_COLOR,
        );
        Ok(target)
    }

    /// Starts `plan` on a new thread and waits until the run is active.
    pub async fn start(&self, plan: RunPlan) -> Result<RunStatus, AppError> {
        if self.handle.is_running() {
            return Err(EvolutionError::AlreadyRunning.into());
        }
        let (sender, receiver) = oneshot::channel();
        let handle = self.handle.clone();
        let history = self.history.clone();
        let statsd = self.statsd.clone();
        thread::Builder::new()
            .name("painter-run".to_string())
            .spawn(move || execute(handle, history, statsd, plan, sender))?;

        receiver.await??;
        Ok(self.status())
    }

    pub fn stop(&self) -> RunStatus {
        if self.handle.stop() {
            info!("Stop requested");
        }
        self.status()
    }

    pub fn status(&self) -> RunStatus {
        let fitness = self.handle.fitness();
        RunStatus {
            running: self.handle.is_running(),
            generation: self.handle.generation(),
            fitness: fitness.is_finite().then_some(fitness),
        }
    }

    pub fn history(&self) -> Vec<HistoryItem> {
        self.history.entries().iter().map(HistoryItem::from).collect()
    }

    /// Most recent snapshot, kept across the end of its run.
    pub fn latest(&self) -> Option<HistoryItem> {
        self.history.latest().as_ref().map(HistoryItem::from)
    }
}

/// Reports the outcome of the start through a oneshot channel, once.
struct StartNotifier {
    sender: RefCell<Option<Sender<Result<(), EvolutionError>>>>,
}

impl StartNotifier {
    fn new(sender: Sender<Result<(), EvolutionError>>) -> Self {
        StartNotifier {
            sender: RefCell::new(Some(sender)),
        }
    }

    fn notify(&self, result: Result<(), EvolutionError>) {
        if let Some(sender) = self.sender.borrow_mut().take() {
            if sender.send(result).is_err() {
                debug!("Start requester is gone");
            }
        }
    }
}

impl Observer<EvolutionEngine, EventType> for StartNotifier {
    fn update(&self, _: &EvolutionEngine, event: EventType) {
        if event == EventType::StatusChanged(EvolutionStatus::Running) {
            self.notify(Ok(()));
        }
    }
}

fn execute(
    handle: EvolutionHandle,
    history: HistoryLog,
    statsd: Option<StatsdSettings>,
    plan: RunPlan,
    sender: Sender<Result<(), EvolutionError>>,
) {
    let notifier = Rc::new(StartNotifier::new(sender));
    let mut engine = EvolutionEngine::with_handle(handle);
    if let Err(e) = engine.configure(plan.config) {
        notifier.notify(Err(e));
        return;
    }
    let (width, height) = plan.target.dimensions();
    let mut candidate = match RasterBuffer::new(width, height) {
        Ok(candidate) => candidate,
        Err(e) => {
            notifier.notify(Err(e.into()));
            return;
        }
    };

    engine.register_observer(notifier.clone());
    engine.register_observer(Rc::new(HistoryGateway::new(history)));
    if let Some(settings) = statsd {
        match StatsdGateway::new((settings.host.clone(), settings.port), settings.factor) {
            Ok(gateway) => engine.register_observer(Rc::new(gateway)),
            Err(e) => warn!("StatsD gateway disabled for this run: {e}"),
        }
    }

    let mut rng = match plan.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let generations = plan.generations;
    let result = block_on(engine.start(
        &plan.target,
        &mut candidate,
        |generation, _| generations.is_some_and(|limit| generation >= limit),
        &mut rng,
    ));

    match &result {
        Ok(report) => info!(
            "Run ended after {} generations (fitness: {})",
            report.generations, report.fitness
        ),
        Err(e) => warn!("Run failed: {e}"),
    }
    notifier.notify(result.map(|_| ()));
}
