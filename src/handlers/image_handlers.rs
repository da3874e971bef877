use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::models::api::{ImageSearchRequest, ImageSearchResponse};
use crate::state::AppState;

/// POST /api/search/images - image candidates for a query
pub async fn search(
    state: web::Data<AppState>,
    body: web::Json<ImageSearchRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let query = req.query.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest("query is required".to_string()));
    }

    let images = state.images.search_images(query, req.num_results).await;
    let image_url = images.first().map(|i| i.url.clone()).unwrap_or_default();

    Ok(HttpResponse::Ok().json(ImageSearchResponse { image_url, images }))
}
