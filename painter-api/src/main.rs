mod api;
mod config;
mod error;
mod runs;

use actix_web::{
    web::{scope, Data},
    App, HttpServer,
};
use log::info;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

use crate::{api::ApiDoc, config::app::AppConfig, runs::RunManager};

pub use error::AppError;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    crate::config::log::init()?;

    let app_config = AppConfig::new()?;
    let manager = Data::new(RunManager::new(&app_config));
    let openapi = ApiDoc::openapi();

    info!(
        "Painter service listening on {}:{}",
        app_config.service_host, app_config.service_port
    );
    HttpServer::new(move || {
        App::new()
            .app_data(manager.clone())
            .service(scope("/v1").configure(api::v1::configure()))
            .service(
                RapiDoc::with_openapi("/api-docs/openapi.json", openapi.clone()).path("/rapidoc"),
            )
    })
    .bind((app_config.service_host.clone(), app_config.service_port))?
    .run()
    .await?;

    Ok(())
}
