pub mod build_handlers;
pub mod generate_handlers;
pub mod image_handlers;
pub mod template_handlers;

use std::path::Path;

use actix_web::{
    web, Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};

use crate::errors::AppError;

/// Rejects POST/PUT/DELETE requests without `Content-Type: application/json`.
/// GET requests pass through.
async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let method = req.method().clone();

    if method == actix_web::http::Method::POST
        || method == actix_web::http::Method::PUT
        || method == actix_web::http::Method::DELETE
    {
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let body = serde_json::json!({
                "error": "Content-Type must be application/json"
            });
            let response = HttpResponse::BadRequest().json(body);
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Default service: JSON 404 for unknown routes.
pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound)
}

/// Configure the JSON API and health routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(8 * 1024 * 1024)
            .error_handler(|err, _req| AppError::BadRequest(format!("Invalid request body: {err}")).into()),
    );
    cfg.route("/health", web::get().to(health));
    cfg.service(
        web::scope("/api")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("/templates", web::get().to(template_handlers::list))
            .route("/generate/outline", web::post().to(generate_handlers::outline))
            .route("/generate/slide", web::post().to(generate_handlers::slide))
            .route("/generate/one-shot", web::post().to(generate_handlers::one_shot))
            .route("/search/images", web::post().to(image_handlers::search))
            .route("/build", web::post().to(build_handlers::build)),
    );
}

/// Serves built presentations under `/media`.
pub fn media_files(media_dir: &Path) -> actix_files::Files {
    actix_files::Files::new("/media", media_dir)
}
