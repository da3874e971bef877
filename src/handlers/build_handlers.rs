use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::models::BuildRequest;
use crate::state::AppState;

/// POST /api/build - assemble a presentation and return its download URL
pub async fn build(
    state: web::Data<AppState>,
    body: web::Json<BuildRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let result = state.builder.build(&req).await?;
    Ok(HttpResponse::Ok().json(result))
}
