use crate::error::AppError;
use crate::models::ServerStatus;
use actix_web::{get, web, HttpResponse};
use reqflow_workbench::{ChangeNotifier, PromptService, RequirementStore};
use std::sync::Arc;
use std::time::SystemTime;

pub struct AppState {
    pub store: Arc<dyn RequirementStore>,
    pub prompts: Arc<dyn PromptService>,
    pub notifier: Arc<dyn ChangeNotifier>,
    pub start_time: SystemTime,
}

#[get("/health")]
pub async fn health_check(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let uptime = data
        .start_time
        .elapsed()
        .map_err(|e| AppError::Internal(format!("Failed to calculate uptime: {e}")))?
        .as_secs();

    let status = ServerStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime,
    };

    Ok(HttpResponse::Ok().json(status))
}
