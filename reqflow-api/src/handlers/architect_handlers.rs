use crate::error::AppError;
use crate::handlers::AppState;
use actix_web::{post, web, HttpResponse};
use reqflow_workbench::ArchitectWorkbench;
use shared_types::{AnswerResponse, ApproveDesignRequest, ArchitectLoadResponse, AskQuestionRequest};
use std::sync::Arc;

fn workbench(data: &AppState, record_id: &str) -> ArchitectWorkbench {
    ArchitectWorkbench::new(
        record_id,
        Arc::clone(&data.store),
        Arc::clone(&data.prompts),
        Arc::clone(&data.notifier),
    )
}

/// Mount the architect workbench. May generate a draft solution as a side
/// effect, which is why this is a POST.
#[post("/requirements/{id}/architect/load")]
pub async fn load_architect(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let record_id = path.into_inner();
    let wb = workbench(&data, &record_id);

    let outcome = wb.load().await.map_err(AppError::from)?;
    let requirement = wb
        .record()
        .ok_or_else(|| AppError::Internal("Requirement missing after load".to_string()))?;

    Ok(HttpResponse::Ok().json(ArchitectLoadResponse {
        locked: wb.is_locked(),
        response: wb.response(),
        requirement,
        outcome,
    }))
}

#[post("/requirements/{id}/architect/ask")]
pub async fn ask_clarifying_question(
    data: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<AskQuestionRequest>,
) -> Result<HttpResponse, AppError> {
    let record_id = path.into_inner();
    let wb = workbench(&data, &record_id);

    wb.load_record().await.map_err(AppError::from)?;
    let answer = wb
        .ask_clarifying_question(&request.question)
        .await
        .map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(AnswerResponse { answer }))
}

#[post("/requirements/{id}/architect/approve")]
pub async fn approve_design(
    data: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<ApproveDesignRequest>,
) -> Result<HttpResponse, AppError> {
    let record_id = path.into_inner();
    let request = request.into_inner();
    let wb = workbench(&data, &record_id);

    wb.load_record().await.map_err(AppError::from)?;
    wb.set_prompt(request.prompt);
    wb.set_response(request.response);

    let updated = wb.approve(request.confirm).await.map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(updated))
}
