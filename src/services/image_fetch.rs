use std::io::Cursor;

use async_trait::async_trait;
use image::ImageFormat;

use crate::errors::ImageError;
use crate::pptx::PngImage;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Raw bytes of a downloaded image.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, ImageError>;
}

pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(timeout: std::time::Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Failed to build image HTTP client: {e}");
                reqwest::Client::new()
            });
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, ImageError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Request(format!("HTTP {} for {url}", status.as_u16())));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ImageError::Request(e.to_string()))?;

        Ok(FetchedImage { bytes: bytes.to_vec(), content_type })
    }
}

/// Decode any supported format and re-encode as PNG at the same size.
pub fn to_png(bytes: &[u8]) -> Result<PngImage, ImageError> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = (img.width(), img.height());
    let mut data = Vec::new();
    img.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)?;
    Ok(PngImage { data, width, height })
}
