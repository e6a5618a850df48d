use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use futures::channel::oneshot::Canceled;
use painter::evolution::EvolutionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Evolution(#[from] EvolutionError),
    #[error("Run ended before reporting its start")]
    RunLost(#[from] Canceled),
    #[error("No snapshot taken yet")]
    NoSnapshot,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Evolution(EvolutionError::AlreadyRunning) => StatusCode::CONFLICT,
            AppError::Evolution(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NoSnapshot => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            message: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, ResponseError};
    use painter::{evolution::EvolutionError, RasterError};

    use super::AppError;

    #[test]
    fn test_status_code() {
        assert_eq!(
            StatusCode::CONFLICT,
            AppError::from(EvolutionError::AlreadyRunning).status_code()
        );
        assert_eq!(
            StatusCode::BAD_REQUEST,
            AppError::from(EvolutionError::InvalidConfig("metric".to_string())).status_code()
        );
        assert_eq!(
            StatusCode::BAD_REQUEST,
            AppError::from(EvolutionError::from(RasterError::InvalidDimensions(0, 1)))
                .status_code(),
            "Should blame the caller for a malformed target"
        );
        assert_eq!(StatusCode::NOT_FOUND, AppError::NoSnapshot.status_code());
        assert_eq!(
            StatusCode::INTERNAL_SERVER_ERROR,
            AppError::from(std::io::Error::other("spawn")).status_code()
        );
    }
}
