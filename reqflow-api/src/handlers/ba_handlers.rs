use crate::error::AppError;
use crate::handlers::AppState;
use actix_web::{get, post, web, HttpResponse};
use reqflow_workbench::BaWorkbench;
use shared_types::{AnswerResponse, ApproveBaContentRequest, AskAiRequest, BaLoadResponse};
use std::sync::Arc;

fn workbench(data: &AppState, record_id: &str) -> BaWorkbench {
    BaWorkbench::new(
        record_id,
        Arc::clone(&data.store),
        Arc::clone(&data.prompts),
        Arc::clone(&data.notifier),
    )
}

/// Mount the BA workbench. Pure read: the persisted prompt/response pair is
/// mirrored back without any generation.
#[get("/requirements/{id}/ba")]
pub async fn load_ba(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let record_id = path.into_inner();
    let wb = workbench(&data, &record_id);

    let requirement = wb.load().await.map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(BaLoadResponse {
        prompt: wb.prompt(),
        response: wb.response(),
        requirement,
    }))
}

#[post("/requirements/{id}/ba/ask")]
pub async fn ask_ai(
    data: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<AskAiRequest>,
) -> Result<HttpResponse, AppError> {
    let record_id = path.into_inner();
    let wb = workbench(&data, &record_id);

    wb.load().await.map_err(AppError::from)?;
    let answer = wb.ask_ai(&request.prompt).await.map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(AnswerResponse { answer }))
}

#[post("/requirements/{id}/ba/approve")]
pub async fn approve_ba_content(
    data: web::Data<AppState>,
    path: web::Path<String>,
    request: web::Json<ApproveBaContentRequest>,
) -> Result<HttpResponse, AppError> {
    let record_id = path.into_inner();
    let request = request.into_inner();
    let wb = workbench(&data, &record_id);

    wb.load().await.map_err(AppError::from)?;
    wb.set_prompt(request.prompt);
    wb.set_response(request.response);

    let updated = wb.approve().await.map_err(AppError::from)?;

    Ok(HttpResponse::Ok().json(updated))
}
