//! Shared test infrastructure.
//!
//! - `setup_dirs()` - temp template and media directories, default template seeded
//! - `ScriptedGenerator` - returns canned JSON instead of calling Gemini
//! - `PngFetcher` / `FailingFetcher` - image downloads without the network
//! - `CountingSearch` - image search that records each query

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tempfile::TempDir;

use lessondeck::errors::{GenerationError, ImageError};
use lessondeck::models::api::ImageResult;
use lessondeck::services::image_fetch::FetchedImage;
use lessondeck::services::{ImageFetcher, ImageSearch, TemplateCatalog, TextGenerator};
use lessondeck::state::AppState;

// ============================================================================
// DIRECTORIES
// ============================================================================

pub struct TestDirs {
    /// Keeps the directories alive.
    pub root: TempDir,
    pub templates: PathBuf,
    pub media: PathBuf,
}

/// Temp templates/media directories with the built-in template written.
pub fn setup_dirs() -> TestDirs {
    let root = TempDir::new().expect("Failed to create temp dir");
    let templates = root.path().join("templates");
    let media = root.path().join("media");
    std::fs::create_dir_all(&media).expect("Failed to create media dir");
    TemplateCatalog::new(&templates)
        .ensure_default_template()
        .expect("Failed to write default template");
    TestDirs { root, templates, media }
}

pub fn media_files(dirs: &TestDirs) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(&dirs.media)
        .expect("Failed to read media dir")
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .collect();
    names.sort();
    names
}

// ============================================================================
// FAKES
// ============================================================================

/// Hands out queued responses in order and records every prompt.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<Value, GenerationError>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
            prompts: Mutex::default(),
        })
    }

    pub fn failing(error: GenerationError) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(VecDeque::from([Err(error)])),
            prompts: Mutex::default(),
        })
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate_json(&self, prompt: &str) -> Result<Value, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::ServiceCall("no scripted response left".into())))
    }
}

/// Encoded test image of the given format.
pub fn image_bytes(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(width, height, image::Rgb([200, 80, 20])));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).expect("Failed to encode test image");
    out.into_inner()
}

/// Serves the same small JPEG for every URL and counts requests.
#[derive(Default)]
pub struct PngFetcher {
    pub calls: AtomicUsize,
}

impl PngFetcher {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for PngFetcher {
    async fn fetch(&self, _url: &str) -> Result<FetchedImage, ImageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(FetchedImage {
            bytes: image_bytes(40, 30, image::ImageFormat::Jpeg),
            content_type: Some("image/jpeg".into()),
        })
    }
}

pub struct FailingFetcher;

#[async_trait]
impl ImageFetcher for FailingFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, ImageError> {
        Err(ImageError::Request(format!("{url} unreachable")))
    }
}

/// Answers every query with one hit whose URL names the query.
#[derive(Default)]
pub struct CountingSearch {
    pub queries: Mutex<Vec<String>>,
}

impl CountingSearch {
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageSearch for CountingSearch {
    async fn search(&self, query: &str, _num: usize) -> Result<Vec<ImageResult>, ImageError> {
        self.queries.lock().unwrap().push(query.to_string());
        let url = format!("https://img.test/{}.jpg", query.replace(' ', "_"));
        Ok(vec![ImageResult { url: url.clone(), title: query.to_string(), thumbnail: url, width: 40, height: 30 }])
    }
}

// ============================================================================
// APP STATE
// ============================================================================

/// App state over `dirs` with no image search configured.
pub fn test_state(dirs: &TestDirs, generator: Arc<dyn TextGenerator>, fetcher: Arc<dyn ImageFetcher>) -> AppState {
    AppState::new(&dirs.templates, &dirs.media, generator, None, fetcher)
}
