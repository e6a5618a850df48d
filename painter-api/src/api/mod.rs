use utoipa::OpenApi;

use crate::{
    error::ErrorResponse,
    runs::{HistoryItem, ImageData, RunStatus},
};

pub mod v1;

#[derive(OpenApi)]
#[openapi(
    paths(
        v1::run,
        v1::stop,
        v1::status,
        v1::history,
        v1::candidate,
    ),
    components(schemas(
        v1::Parameters,
        ImageData,
        RunStatus,
        HistoryItem,
        ErrorResponse
    )),
    tags(
            (name = "run", description = "Run management endpoints.")
        ),
    )]
pub(super) struct ApiDoc;
