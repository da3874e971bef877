//! Presentation builder tests against the built-in template.

mod common;

use std::sync::Arc;

use common::*;
use lessondeck::errors::BuildError;
use lessondeck::models::{
    BuildRequest, ChartData, ChartSeries, ContentMap, DEFAULT_TEMPLATE, ImageRef, PlaceholderValue, SlideContent,
    TableData,
};
use lessondeck::pptx::Package;
use lessondeck::pptx::content_types::CONTENT_TYPES_PART;
use lessondeck::pptx::inspect::{SlideSummary, inspect_slides};
use lessondeck::services::builder::IMAGE_ERROR_TEXT;
use lessondeck::services::{ImageFetcher, ImageResolver, ImageSearch, PresentationBuilder, TemplateCatalog};

// --- Helpers ---

fn builder(dirs: &TestDirs, fetcher: Arc<dyn ImageFetcher>) -> PresentationBuilder {
    PresentationBuilder::new(TemplateCatalog::new(&dirs.templates), ImageResolver::default(), fetcher, &dirs.media)
}

fn built_package(dirs: &TestDirs, download_url: &str) -> Package {
    let filename = download_url.strip_prefix("/media/").expect("download URL under /media");
    Package::open(&dirs.media.join(filename)).expect("built file opens")
}

fn slide(layout_id: usize, entries: &[(&str, PlaceholderValue)]) -> SlideContent {
    let content: ContentMap = entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
    SlideContent { layout_id, content }
}

fn text(s: &str) -> PlaceholderValue {
    PlaceholderValue::Text(s.into())
}

fn image_query(q: &str) -> PlaceholderValue {
    PlaceholderValue::Image(ImageRef { query: Some(q.into()), url: None })
}

fn request(slides: Vec<SlideContent>) -> BuildRequest {
    BuildRequest { template_filename: DEFAULT_TEMPLATE.into(), slides }
}

/// Slides of the file behind a download URL.
fn built_slides(dirs: &TestDirs, download_url: &str) -> Vec<SlideSummary> {
    inspect_slides(&built_package(dirs, download_url)).expect("built slides parse")
}

// --- Tests ---

#[tokio::test]
async fn slides_are_appended_in_request_order() {
    let dirs = setup_dirs();
    let result = builder(&dirs, Arc::new(PngFetcher::default()))
        .build(&request(vec![
            slide(0, &[("0", text("Volcanoes")), ("1", text("5th Grade"))]),
            slide(1, &[("0", text("What is a volcano?")), ("1", text("- Magma\n- Lava"))]),
            slide(3, &[("0", text("Summary"))]),
        ]))
        .await
        .unwrap();

    assert!(result.download_url.starts_with("/media/lesson_"));
    assert!(result.download_url.ends_with(".pptx"));

    let slides = built_slides(&dirs, &result.download_url);
    assert_eq!(slides.len(), 3);
    assert_eq!(slides[0].paragraphs, ["Volcanoes", "5th Grade"]);
    assert_eq!(slides[1].paragraphs, ["What is a volcano?", "- Magma", "- Lava"]);
    assert_eq!(slides[2].paragraphs, ["Summary"]);
    assert!(slides[2].layout_part.as_deref().is_some_and(|p| p.ends_with("slideLayout4.xml")));
}

#[tokio::test]
async fn unknown_layout_fails_without_writing() {
    let dirs = setup_dirs();
    let err = builder(&dirs, Arc::new(PngFetcher::default()))
        .build(&request(vec![slide(1, &[("0", text("ok"))]), slide(42, &[])]))
        .await
        .unwrap_err();

    assert!(matches!(err, BuildError::UnknownLayout { layout_id: 42 }));
    assert!(media_files(&dirs).is_empty());
}

#[tokio::test]
async fn empty_request_writes_an_empty_deck() {
    let dirs = setup_dirs();
    let result = builder(&dirs, Arc::new(PngFetcher::default())).build(&request(vec![])).await.unwrap();
    assert!(built_slides(&dirs, &result.download_url).is_empty());
}

#[tokio::test]
async fn image_queries_resolve_to_placeholders_and_download_once() {
    let dirs = setup_dirs();
    let fetcher = Arc::new(PngFetcher::default());
    let result = builder(&dirs, fetcher.clone())
        .build(&request(vec![
            slide(4, &[("0", text("Eruption")), ("1", image_query("volcano eruption"))]),
            slide(4, &[("0", text("Again")), ("1", image_query("Volcano Eruption "))]),
        ]))
        .await
        .unwrap();

    assert_eq!(fetcher.calls(), 1);
    let slides = built_slides(&dirs, &result.download_url);
    assert_eq!(slides.iter().map(|s| s.pictures).collect::<Vec<_>>(), [1, 1]);
}

#[tokio::test]
async fn failed_download_leaves_error_text() {
    let dirs = setup_dirs();
    let result = builder(&dirs, Arc::new(FailingFetcher))
        .build(&request(vec![slide(4, &[("0", text("Eruption")), ("1", image_query("volcano"))])]))
        .await
        .unwrap();

    let slides = built_slides(&dirs, &result.download_url);
    assert_eq!(slides[0].pictures, 0);
    assert!(slides[0].paragraphs.iter().any(|p| p == IMAGE_ERROR_TEXT));
}

#[tokio::test]
async fn tables_land_in_content_slots() {
    let dirs = setup_dirs();
    let table = PlaceholderValue::Table(TableData {
        headers: vec!["Type".into(), "Example".into()],
        rows: vec![vec!["Shield".into(), "Mauna Loa".into()]],
    });
    let result = builder(&dirs, Arc::new(PngFetcher::default()))
        .build(&request(vec![slide(1, &[("0", text("Kinds")), ("1", table)])]))
        .await
        .unwrap();

    let slides = built_slides(&dirs, &result.download_url);
    assert_eq!(slides[0].tables, 1);
    assert!(slides[0].paragraphs.contains(&"Mauna Loa".to_string()));
}

#[tokio::test]
async fn invalid_template_name_is_rejected() {
    let dirs = setup_dirs();
    let mut req = request(vec![]);
    req.template_filename = "../etc/passwd".into();
    let err = builder(&dirs, Arc::new(PngFetcher::default())).build(&req).await.unwrap_err();
    assert!(matches!(err, BuildError::InvalidTemplateName(_)));
}

#[tokio::test]
async fn charts_are_written_as_chart_parts() {
    let dirs = setup_dirs();
    let chart = PlaceholderValue::Chart(ChartData {
        chart_type: "pie".into(),
        categories: vec!["Shield".into(), "Cinder".into(), "Composite".into()],
        series: vec![ChartSeries { name: "Share".into(), values: vec![20.0, 30.0, 50.0] }],
    });
    let result = builder(&dirs, Arc::new(PngFetcher::default()))
        .build(&request(vec![slide(1, &[("0", text("Volcano types")), ("1", chart)])]))
        .await
        .unwrap();

    let pkg = built_package(&dirs, &result.download_url);
    let chart_xml = pkg.xml("ppt/charts/chart1.xml").expect("chart part exists");
    assert!(chart_xml.contains("<c:pieChart>"));
    assert!(chart_xml.contains("<c:v>Composite</c:v>"));
    assert!(pkg.xml(CONTENT_TYPES_PART).unwrap().contains("/ppt/charts/chart1.xml"));

    let slides = inspect_slides(&pkg).unwrap();
    assert_eq!((slides[0].charts, slides[0].tables), (1, 0));
    let rels = pkg.xml("ppt/slides/_rels/slide1.xml.rels").unwrap();
    assert!(rels.contains("../charts/chart1.xml"));
}

#[tokio::test]
async fn template_slides_are_kept() {
    let dirs = setup_dirs();
    let titled = |t: &str| slide(3, &[("0", text(t))]);

    // A deck with three slides becomes the template for the next build.
    let first = builder(&dirs, Arc::new(PngFetcher::default()))
        .build(&request(vec![titled("A"), titled("B"), titled("C")]))
        .await
        .unwrap();
    let filename = first.download_url.strip_prefix("/media/").unwrap();
    std::fs::copy(dirs.media.join(filename), dirs.templates.join("three_slides.pptx")).unwrap();

    let mut req = request(vec![titled("D"), titled("E")]);
    req.template_filename = "three_slides.pptx".into();
    let second = builder(&dirs, Arc::new(PngFetcher::default())).build(&req).await.unwrap();

    let titles: Vec<String> = built_slides(&dirs, &second.download_url)
        .into_iter()
        .map(|s| s.paragraphs.concat())
        .collect();
    assert_eq!(titles, ["A", "B", "C", "D", "E"]);
}

#[tokio::test]
async fn repeated_queries_are_searched_once() {
    let dirs = setup_dirs();
    let search = Arc::new(CountingSearch::default());
    let fetcher = Arc::new(PngFetcher::default());
    let images = ImageResolver::new(Some(search.clone() as Arc<dyn ImageSearch>));
    let builder = PresentationBuilder::new(TemplateCatalog::new(&dirs.templates), images, fetcher.clone(), &dirs.media);

    builder
        .build(&request(vec![
            slide(4, &[("0", text("Lava")), ("1", image_query("lava"))]),
            slide(4, &[("0", text("Ash")), ("1", image_query("ash"))]),
            slide(4, &[("0", text("Lava again")), ("1", image_query("lava"))]),
        ]))
        .await
        .unwrap();

    assert_eq!(search.queries(), ["lava", "ash"]);
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_builds_write_separate_files() {
    let dirs = setup_dirs();
    let builder = builder(&dirs, Arc::new(PngFetcher::default()));
    let one = request(vec![slide(3, &[("0", text("One"))])]);
    let two = request(vec![slide(3, &[("0", text("Two"))]), slide(3, &[("0", text("Three"))])]);

    let (a, b) = tokio::join!(builder.build(&one), builder.build(&two));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.download_url, b.download_url);
    assert_eq!(built_slides(&dirs, &a.download_url).len(), 1);
    assert_eq!(built_slides(&dirs, &b.download_url).len(), 2);
}
