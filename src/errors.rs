use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

use crate::models::api::ErrorResponse;
use crate::pptx::PptxError;

/// Failures of the generative-text service.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("{0} is not configured")]
    ConfigurationMissing(&'static str),

    #[error("service call failed: {0}")]
    ServiceCall(String),

    #[error("unexpected response: {0}")]
    Parse(String),
}

/// Failures while producing a presentation file.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid template name '{0}'")]
    InvalidTemplateName(String),

    #[error("template '{0}' not found")]
    TemplateNotFound(String),

    #[error("layout {layout_id} does not exist in this template")]
    UnknownLayout { layout_id: usize },

    #[error("template error: {0}")]
    Template(#[from] PptxError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Image download or decode failure. Always recovered from.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image request failed: {0}")]
    Request(String),

    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

#[derive(Debug)]
pub enum AppError {
    Generation(GenerationError),
    Build(BuildError),
    BadRequest(String),
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Generation(e) => write!(f, "Generation error: {e}"),
            AppError::Build(e) => write!(f, "Build error: {e}"),
            AppError::BadRequest(msg) => write!(f, "{msg}"),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Generation(GenerationError::ConfigurationMissing(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Generation(_) => StatusCode::BAD_GATEWAY,
            AppError::Build(BuildError::InvalidTemplateName(_) | BuildError::UnknownLayout { .. }) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Build(BuildError::TemplateNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Build(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{self}");
        }
        HttpResponse::build(status).json(ErrorResponse { error: self.to_string() })
    }
}

impl From<GenerationError> for AppError {
    fn from(e: GenerationError) -> Self {
        AppError::Generation(e)
    }
}

impl From<BuildError> for AppError {
    fn from(e: BuildError) -> Self {
        AppError::Build(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases = [
            (AppError::from(GenerationError::ConfigurationMissing("GEMINI_API_KEY")), 503),
            (AppError::from(GenerationError::ServiceCall("timeout".into())), 502),
            (AppError::from(GenerationError::Parse("not json".into())), 502),
            (AppError::from(BuildError::UnknownLayout { layout_id: 9 }), 400),
            (AppError::from(BuildError::InvalidTemplateName("../x".into())), 400),
            (AppError::from(BuildError::TemplateNotFound("x.pptx".into())), 404),
            (AppError::BadRequest("topic is required".into()), 400),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{err}");
        }
    }
}
