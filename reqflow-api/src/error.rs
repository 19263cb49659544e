use actix_web::{HttpResponse, ResponseError};
use reqflow_workbench::{StoreError, WorkbenchError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Requirement not found: {0}")]
    RequirementNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("AI service error: {0}")]
    UpstreamAi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<WorkbenchError> for AppError {
    fn from(err: WorkbenchError) -> Self {
        match err {
            WorkbenchError::Busy | WorkbenchError::Locked => AppError::Conflict(err.to_string()),
            WorkbenchError::EmptyPrompt
            | WorkbenchError::EmptyResponse
            | WorkbenchError::NotConfirmed => AppError::InvalidRequest(err.to_string()),
            WorkbenchError::Store(StoreError::NotFound(id)) => AppError::RequirementNotFound(id),
            WorkbenchError::Store(store_err) => AppError::Internal(store_err.to_string()),
            WorkbenchError::Prompt(prompt_err) => AppError::UpstreamAi(prompt_err.to_string()),
            WorkbenchError::NotLoaded => AppError::Internal(err.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::RequirementNotFound(id),
            other => AppError::Internal(other.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_response = ErrorResponse {
            error: self.error_type(),
            message: self.to_string(),
        };

        match self {
            AppError::RequirementNotFound(_) => HttpResponse::NotFound().json(error_response),
            AppError::InvalidRequest(_) => HttpResponse::BadRequest().json(error_response),
            AppError::Conflict(_) => HttpResponse::Conflict().json(error_response),
            AppError::UpstreamAi(_) => HttpResponse::BadGateway().json(error_response),
            AppError::Database(_)
            | AppError::Config(_)
            | AppError::Io(_)
            | AppError::Internal(_) => HttpResponse::InternalServerError().json(error_response),
        }
    }
}

impl AppError {
    fn error_type(&self) -> String {
        match self {
            AppError::Database(_) => "database_error".to_string(),
            AppError::Config(_) => "config_error".to_string(),
            AppError::Io(_) => "io_error".to_string(),
            AppError::RequirementNotFound(_) => "requirement_not_found".to_string(),
            AppError::InvalidRequest(_) => "invalid_request".to_string(),
            AppError::Conflict(_) => "conflict".to_string(),
            AppError::UpstreamAi(_) => "upstream_ai_error".to_string(),
            AppError::Internal(_) => "internal_error".to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
