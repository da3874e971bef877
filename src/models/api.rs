use serde::{Deserialize, Serialize};

use super::content::{ContentMap, DEFAULT_TEMPLATE, GeneratedSlide, TemplatePlan};
use super::lesson::{Duration, SlidePlan};

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

fn default_num_results() -> usize {
    3
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TemplatesResponse {
    pub templates: Vec<TemplatePlan>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OutlineRequest {
    pub topic: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub duration: Duration,
    #[serde(default = "default_template")]
    pub template_filename: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OutlineResponse {
    pub slides: Vec<SlidePlan>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SlideRequest {
    pub title: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub grade: String,
    pub layout_id: usize,
    #[serde(default = "default_template")]
    pub template_filename: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SlideResponse {
    pub content: ContentMap,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OneShotRequest {
    pub topic: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub duration: Duration,
    #[serde(default = "default_template")]
    pub template_filename: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OneShotResponse {
    pub slides: Vec<GeneratedSlide>,
    pub outline: Vec<SlidePlan>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImageSearchRequest {
    pub query: String,
    #[serde(default = "default_num_results")]
    pub num_results: usize,
}

/// One image search hit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ImageResult {
    pub url: String,
    pub title: String,
    pub thumbnail: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImageSearchResponse {
    pub image_url: String,
    pub images: Vec<ImageResult>,
}

/// API error response.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ErrorResponse {
    pub error: String,
}
