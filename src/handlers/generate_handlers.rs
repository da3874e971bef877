use actix_web::{web, HttpResponse};

use crate::errors::{AppError, BuildError};
use crate::models::api::{
    OneShotRequest, OneShotResponse, OutlineRequest, OutlineResponse, SlideRequest, SlideResponse,
};
use crate::services::slide_content::outline_of;
use crate::state::AppState;

fn require_topic(topic: &str) -> Result<(), AppError> {
    if topic.trim().is_empty() {
        return Err(AppError::BadRequest("topic is required".to_string()));
    }
    Ok(())
}

/// POST /api/generate/outline - ordered slide plans for a lesson
pub async fn outline(
    state: web::Data<AppState>,
    body: web::Json<OutlineRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    require_topic(&req.topic)?;

    let layouts = state.catalog.layouts(&req.template_filename).await?;
    let slides = state
        .outline
        .generate(&req.topic, &req.grade, req.duration, &layouts)
        .await?;

    Ok(HttpResponse::Ok().json(OutlineResponse { slides }))
}

/// POST /api/generate/slide - content for one planned slide
pub async fn slide(
    state: web::Data<AppState>,
    body: web::Json<SlideRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".to_string()));
    }

    let layouts = state.catalog.layouts(&req.template_filename).await?;
    let layout = layouts
        .iter()
        .find(|l| l.id == req.layout_id)
        .ok_or(BuildError::UnknownLayout { layout_id: req.layout_id })?;

    let content = state
        .slides
        .generate(&req.title, &req.purpose, &req.grade, layout)
        .await?;

    Ok(HttpResponse::Ok().json(SlideResponse { content }))
}

/// POST /api/generate/one-shot - outline and content in a single call
pub async fn one_shot(
    state: web::Data<AppState>,
    body: web::Json<OneShotRequest>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    require_topic(&req.topic)?;

    let layouts = state.catalog.layouts(&req.template_filename).await?;
    let slides = state
        .slides
        .generate_full_presentation(&req.topic, &req.grade, req.duration, &layouts)
        .await?;
    let outline = outline_of(&slides);

    Ok(HttpResponse::Ok().json(OneShotResponse { slides, outline }))
}
