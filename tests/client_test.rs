//! Client session runner against an in-memory API.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use lessondeck::client::{ApiError, ClientState, LessonApi, LessonForm, RunError, Step, run_session};
use lessondeck::models::api::{ImageSearchRequest, ImageSearchResponse, OneShotRequest, OutlineRequest, SlideRequest};
use lessondeck::models::{
    BuildRequest, BuildResult, ContentMap, GeneratedSlide, PlaceholderValue, SlidePlan, TemplatePlan,
};

#[derive(Default)]
struct FakeApi {
    calls: Mutex<Vec<String>>,
    builds: Mutex<Vec<BuildRequest>>,
    fail_templates: bool,
    /// Slide title whose generation fails.
    failing_slide: Option<String>,
    /// Cancelled while this slide is being generated.
    cancel_on_slide: Option<(String, CancellationToken)>,
    slow_outline: bool,
    outline_finished: AtomicBool,
}

impl FakeApi {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn plan(n: u32, title: &str) -> SlidePlan {
    SlidePlan { slide_number: n, title: title.into(), purpose: String::new(), layout_id: 1, content_plan: String::new() }
}

#[async_trait]
impl LessonApi for FakeApi {
    async fn list_templates(&self) -> Result<Vec<TemplatePlan>, ApiError> {
        self.record("templates");
        if self.fail_templates {
            return Err(ApiError::Transport("connection refused".into()));
        }
        Ok(vec![])
    }

    async fn generate_outline(&self, req: &OutlineRequest) -> Result<Vec<SlidePlan>, ApiError> {
        self.record(format!("outline:{}", req.topic));
        if self.slow_outline {
            tokio::time::sleep(StdDuration::from_millis(100)).await;
        }
        self.outline_finished.store(true, Ordering::SeqCst);
        Ok(vec![plan(1, "Intro"), plan(2, "Magma"), plan(3, "Summary")])
    }

    async fn generate_slide(&self, req: &SlideRequest) -> Result<ContentMap, ApiError> {
        self.record(format!("slide:{}", req.title));
        if let Some((title, token)) = &self.cancel_on_slide {
            if *title == req.title {
                token.cancel();
            }
        }
        if self.failing_slide.as_deref() == Some(req.title.as_str()) {
            return Err(ApiError::Status { status: 502, message: "bad gateway".into() });
        }
        let mut content = ContentMap::new();
        content.insert("0".into(), PlaceholderValue::Text(req.title.clone()));
        Ok(content)
    }

    async fn generate_one_shot(&self, req: &OneShotRequest) -> Result<Vec<GeneratedSlide>, ApiError> {
        self.record(format!("one-shot:{}", req.topic));
        Ok(vec![GeneratedSlide { slide_number: 1, title: "All".into(), layout_id: 0, content: ContentMap::new() }])
    }

    async fn search_images(&self, _req: &ImageSearchRequest) -> Result<ImageSearchResponse, ApiError> {
        Ok(ImageSearchResponse { image_url: String::new(), images: vec![] })
    }

    async fn build(&self, req: &BuildRequest) -> Result<BuildResult, ApiError> {
        self.record("build");
        self.builds.lock().unwrap().push(req.clone());
        Ok(BuildResult { download_url: "/media/lesson.pptx".into() })
    }
}

fn form(topic: &str) -> LessonForm {
    LessonForm { topic: topic.into(), grade: "5th Grade".into(), ..LessonForm::default() }
}

#[tokio::test]
async fn session_runs_requests_in_order_and_skips_failed_slides() {
    let api = FakeApi { failing_slide: Some("Magma".into()), ..FakeApi::default() };
    let mut seen: Vec<Option<u8>> = Vec::new();

    let state = run_session(&api, form("Volcanoes"), &CancellationToken::new(), |s: &ClientState| {
        seen.push(s.progress_percent())
    })
    .await
    .unwrap();

    assert_eq!(
        api.calls(),
        ["templates", "outline:Volcanoes", "slide:Intro", "slide:Magma", "slide:Summary", "build"]
    );
    assert_eq!(state.step, Step::Done);
    assert_eq!(state.download_url.as_deref(), Some("/media/lesson.pptx"));
    assert_eq!(state.skipped.len(), 1);

    let builds = api.builds.lock().unwrap();
    assert_eq!(builds[0].slides.len(), 3);
    assert!(builds[0].slides[1].content.is_empty());

    // Progress never goes backwards once known.
    let known: Vec<u8> = seen.into_iter().flatten().collect();
    assert!(known.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(known.last(), Some(&100));
}

#[tokio::test]
async fn one_shot_session_builds_after_one_call() {
    let api = FakeApi::default();
    let mut f = form("Volcanoes");
    f.one_shot = true;
    let state = run_session(&api, f, &CancellationToken::new(), |_: &ClientState| {}).await.unwrap();
    assert_eq!(api.calls(), ["templates", "one-shot:Volcanoes", "build"]);
    assert_eq!(state.step, Step::Done);
}

#[tokio::test]
async fn cancellation_stops_before_the_next_request() {
    let token = CancellationToken::new();
    let api = FakeApi { cancel_on_slide: Some(("Magma".into(), token.clone())), ..FakeApi::default() };

    let err = run_session(&api, form("Volcanoes"), &token, |_: &ClientState| {}).await.unwrap_err();
    assert!(matches!(err, RunError::Cancelled));
    assert_eq!(api.calls().last().map(String::as_str), Some("slide:Magma"));
    assert!(!api.calls().contains(&"build".to_string()));
}

#[tokio::test]
async fn request_in_flight_completes_before_cancellation_applies() {
    let token = CancellationToken::new();
    let api = FakeApi { slow_outline: true, ..FakeApi::default() };

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(StdDuration::from_millis(20)).await;
        canceller.cancel();
    });

    let err = run_session(&api, form("Volcanoes"), &token, |_: &ClientState| {}).await.unwrap_err();
    assert!(matches!(err, RunError::Cancelled));
    assert_eq!(api.calls(), ["templates", "outline:Volcanoes"]);
    assert!(api.outline_finished.load(Ordering::SeqCst));
}

#[tokio::test]
async fn empty_topic_and_template_failure_are_alerts() {
    let api = FakeApi::default();
    let err = run_session(&api, form(""), &CancellationToken::new(), |_: &ClientState| {}).await.unwrap_err();
    assert!(matches!(err, RunError::Alert(_)));

    let api = FakeApi { fail_templates: true, ..FakeApi::default() };
    let err = run_session(&api, form("Volcanoes"), &CancellationToken::new(), |_: &ClientState| {}).await.unwrap_err();
    assert!(matches!(err, RunError::Alert(m) if m.contains("connection refused")));
    assert_eq!(api.calls(), ["templates"]);
}
