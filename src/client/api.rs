use std::path::Path;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::api::{
    ErrorResponse, ImageSearchRequest, ImageSearchResponse, OneShotRequest, OneShotResponse, OutlineRequest,
    OutlineResponse, SlideRequest, SlideResponse, TemplatesResponse,
};
use crate::models::{BuildRequest, BuildResult, ContentMap, GeneratedSlide, SlidePlan, TemplatePlan};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    Decode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// Operations the lesson server exposes to a client session.
#[async_trait]
pub trait LessonApi: Send + Sync {
    async fn list_templates(&self) -> Result<Vec<TemplatePlan>, ApiError>;

    async fn generate_outline(&self, req: &OutlineRequest) -> Result<Vec<SlidePlan>, ApiError>;

    async fn generate_slide(&self, req: &SlideRequest) -> Result<ContentMap, ApiError>;

    async fn generate_one_shot(&self, req: &OneShotRequest) -> Result<Vec<GeneratedSlide>, ApiError>;

    async fn search_images(&self, req: &ImageSearchRequest) -> Result<ImageSearchResponse, ApiError>;

    async fn build(&self, req: &BuildRequest) -> Result<BuildResult, ApiError>;
}

pub struct HttpLessonApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLessonApi {
    pub fn new(base_url: &str, timeout: StdDuration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URL for a server path such as `/media/lesson.pptx`.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or_else(|_| if body.is_empty() { status.to_string() } else { body });
        Err(ApiError::Status { status: status.as_u16(), message })
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::read(response).await
    }

    /// Stores a built deck at `dest`, returning the byte count.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64, ApiError> {
        let response = self.client.get(self.url(url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), message: status.to_string() });
        }
        let bytes = response.bytes().await?;
        tokio::fs::write(dest, &bytes).await?;
        Ok(bytes.len() as u64)
    }
}

#[async_trait]
impl LessonApi for HttpLessonApi {
    async fn list_templates(&self) -> Result<Vec<TemplatePlan>, ApiError> {
        let response = self.client.get(self.url("/api/templates")).send().await?;
        let body: TemplatesResponse = Self::read(response).await?;
        Ok(body.templates)
    }

    async fn generate_outline(&self, req: &OutlineRequest) -> Result<Vec<SlidePlan>, ApiError> {
        let body: OutlineResponse = self.post("/api/generate/outline", req).await?;
        Ok(body.slides)
    }

    async fn generate_slide(&self, req: &SlideRequest) -> Result<ContentMap, ApiError> {
        let body: SlideResponse = self.post("/api/generate/slide", req).await?;
        Ok(body.content)
    }

    async fn generate_one_shot(&self, req: &OneShotRequest) -> Result<Vec<GeneratedSlide>, ApiError> {
        let body: OneShotResponse = self.post("/api/generate/one-shot", req).await?;
        Ok(body.slides)
    }

    async fn search_images(&self, req: &ImageSearchRequest) -> Result<ImageSearchResponse, ApiError> {
        self.post("/api/search/images", req).await
    }

    async fn build(&self, req: &BuildRequest) -> Result<BuildResult, ApiError> {
        self.post("/api/build", req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_join_base_url() {
        let api = HttpLessonApi::new("http://localhost:8000/", StdDuration::from_secs(5)).unwrap();
        assert_eq!(api.url("/media/a.pptx"), "http://localhost:8000/media/a.pptx");
        assert_eq!(api.url("https://cdn.example/a.pptx"), "https://cdn.example/a.pptx");
    }
}
