use actix_web::{
    get, post,
    web::{Data, Json, ServiceConfig},
    HttpResponse,
};
use log::debug;
use painter::{
    evolution::{EvolutionConfig, EvolutionError},
    FitnessMetric,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::ErrorResponse,
    runs::{HistoryItem, ImageData, RunManager, RunPlan, RunStatus},
    AppError,
};

pub fn configure() -> impl FnOnce(&mut ServiceConfig) {
    |config: &mut ServiceConfig| {
        config
            .service(run)
            .service(stop)
            .service(status)
            .service(history)
            .service(candidate);
    }
}

/// Run parameters; absent ones take the configured defaults.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, Default)]
#[serde(default)]
pub struct Parameters {
    population_size: Option<usize>,
    /// `perceptual` or `alpha`.
    metric: Option<String>,
    snapshot_frequency: Option<u64>,
    /// Ends the run after this many generations.
    generations: Option<u64>,
    seed: Option<u64>,
    /// Defaults to a filled disk.
    target: Option<ImageData>,
}

impl Parameters {
    fn into_plan(self, manager: &RunManager) -> Result<RunPlan, AppError> {
        let defaults = manager.defaults();
        let metric = match self.metric {
            Some(metric) => metric.parse::<FitnessMetric>().map_err(|_| {
                EvolutionError::InvalidConfig(format!("unknown fitness metric '{metric}'"))
            })?,
            None => defaults.metric,
        };
        let config = EvolutionConfig {
            population_size: self.population_size.unwrap_or(defaults.population_size),
            metric,
            snapshot_frequency: self.snapshot_frequency.unwrap_or(defaults.snapshot_frequency),
            mutation: defaults.mutation,
        };
        config.check()?;
        if self.generations == Some(0) {
            return Err(
                EvolutionError::InvalidConfig("generations must be positive".to_string()).into(),
            );
        }
        let target = match self.target {
            Some(image) => image.into_buffer().map_err(EvolutionError::from)?,
            None => manager.default_target()?,
        };

        Ok(RunPlan {
            config,
            target,
            generations: self.generations,
            seed: self.seed,
        })
    }
}

#[utoipa::path(
    context_path = "/v1",
    request_body = Parameters,
    responses(
        (status = 202, description = "Run started", body = RunStatus),
        (status = 400, description = "Invalid parameters or target", body = ErrorResponse),
        (status = 409, description = "A run is already active", body = ErrorResponse)
    ),
    tag = "run"
)]
#[post("/run")]
pub async fn run(
    manager: Data<RunManager>,
    parameters: Json<Parameters>,
) -> Result<HttpResponse, AppError> {
    let parameters = parameters.into_inner();
    debug!("Starting evolution with parameters: {:?}", parameters);

    let plan = parameters.into_plan(&manager)?;
    debug!("Running evolution with configuration: {:?}", plan.config);
    let run_status = manager.start(plan).await?;
    Ok(HttpResponse::Accepted().json(run_status))
}

#[utoipa::path(
    context_path = "/v1",
    responses(
        (status = 200, description = "Run stopped, or nothing to stop", body = RunStatus)
    ),
    tag = "run"
)]
#[post("/stop")]
pub async fn stop(manager: Data<RunManager>) -> Json<RunStatus> {
    Json(manager.stop())
}

#[utoipa::path(
    context_path = "/v1",
    responses(
        (status = 200, description = "Progress of the current run", body = RunStatus)
    ),
    tag = "run"
)]
#[get("/status")]
pub async fn status(manager: Data<RunManager>) -> Json<RunStatus> {
    Json(manager.status())
}

#[utoipa::path(
    context_path = "/v1",
    responses(
        (status = 200, description = "Snapshots of the latest run, oldest first", body = [HistoryItem])
    ),
    tag = "run"
)]
#[get("/history")]
pub async fn history(manager: Data<RunManager>) -> Json<Vec<HistoryItem>> {
    Json(manager.history())
}

#[utoipa::path(
    context_path = "/v1",
    responses(
        (status = 200, description = "Latest snapshot with its candidate image", body = HistoryItem),
        (status = 404, description = "No snapshot taken yet", body = ErrorResponse)
    ),
    tag = "run"
)]
#[get("/candidate")]
pub async fn candidate(manager: Data<RunManager>) -> Result<Json<HistoryItem>, AppError> {
    manager.latest().map(Json).ok_or(AppError::NoSnapshot)
}
