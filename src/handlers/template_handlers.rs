use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::models::api::TemplatesResponse;
use crate::state::AppState;

/// GET /api/templates - every usable template with its layouts
pub async fn list(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let templates = state.catalog.list().await?;
    Ok(HttpResponse::Ok().json(TemplatesResponse { templates }))
}
