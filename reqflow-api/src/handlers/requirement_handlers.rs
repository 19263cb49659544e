use crate::error::AppError;
use crate::handlers::AppState;
use actix_web::{get, post, web, HttpResponse};
use shared_types::{CreateRequirementRequest, RequirementListResponse};

#[post("/requirements")]
pub async fn create_requirement(
    data: web::Data<AppState>,
    request: web::Json<CreateRequirementRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();

    if request.description.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Description cannot be empty".to_string(),
        ));
    }

    let requirement = data.store.create_requirement(request).await?;
    tracing::info!(requirement_id = %requirement.id, "Requirement created");

    Ok(HttpResponse::Created().json(requirement))
}

#[get("/requirements")]
pub async fn list_requirements(data: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let requirements = data.store.list_requirements().await?;
    Ok(HttpResponse::Ok().json(RequirementListResponse { requirements }))
}

#[get("/requirements/{id}")]
pub async fn get_requirement(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let record_id = path.into_inner();
    let requirement = data.store.get_requirement(&record_id).await?;
    Ok(HttpResponse::Ok().json(requirement))
}
