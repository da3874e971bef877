//! Outline and slide content generation with a scripted model.

mod common;

use std::sync::Arc;

use serde_json::json;

use common::*;
use lessondeck::errors::GenerationError;
use lessondeck::models::{DEFAULT_TEMPLATE, Duration, PlaceholderValue};
use lessondeck::pptx::LayoutInfo;
use lessondeck::services::{ImageResolver, ImageSearch, OutlineGenerator, SlideContentGenerator, TemplateCatalog};

async fn layouts(dirs: &TestDirs) -> Vec<LayoutInfo> {
    TemplateCatalog::new(&dirs.templates).layouts(DEFAULT_TEMPLATE).await.unwrap()
}

fn volcano_outline() -> serde_json::Value {
    json!({ "slides": [
        { "slide_number": 1, "title": "Volcanoes", "purpose": "Introduce the topic", "layout_id": 0 },
        { "slide_number": 2, "title": "What is a volcano?", "purpose": "Define", "layout_id": 1 },
        { "slide_number": 3, "title": "Inside the Earth", "purpose": "Core concept", "layout_id": "1" },
        { "slide_number": 4, "title": "Types of volcanoes", "purpose": "Compare", "layout_id": 2 },
        { "slide_number": 5, "title": "", "purpose": "dropped" },
        { "slide_number": 6, "title": "Famous eruptions", "purpose": "Examples", "layout_id": 4 },
        { "slide_number": 7, "title": "Build a model", "purpose": "Activity", "layout_id": 99 },
        { "slide_number": 8, "title": "Summary", "purpose": "Recap", "layout_id": 3 }
    ]})
}

#[tokio::test]
async fn volcano_outline_is_numbered_with_valid_layouts() {
    let dirs = setup_dirs();
    let layouts = layouts(&dirs).await;
    let generator = ScriptedGenerator::new(vec![volcano_outline()]);

    let plans = OutlineGenerator::new(generator.clone())
        .generate("Volcanoes", "5th Grade", Duration::Medium, &layouts)
        .await
        .unwrap();

    assert!((6..=10).contains(&plans.len()), "got {} slides", plans.len());
    let numbers: Vec<u32> = plans.iter().map(|p| p.slide_number).collect();
    assert_eq!(numbers, (1..=plans.len() as u32).collect::<Vec<_>>());
    assert!(plans.iter().all(|p| layouts.iter().any(|l| l.id == p.layout_id)));

    // Out-of-range id falls back to a layout with a body slot.
    let activity = plans.iter().find(|p| p.title == "Build a model").unwrap();
    assert_eq!(activity.layout_id, 1);

    let prompt = generator.prompts.lock().unwrap()[0].clone();
    assert!(prompt.contains("Volcanoes"));
    assert!(prompt.contains("5th Grade"));
}

#[tokio::test]
async fn service_failure_propagates_from_outline() {
    let dirs = setup_dirs();
    let generator = ScriptedGenerator::failing(GenerationError::ServiceCall("HTTP 500".into()));
    let err = OutlineGenerator::new(generator)
        .generate("Volcanoes", "", Duration::Short, &layouts(&dirs).await)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::ServiceCall(_)));
}

#[tokio::test]
async fn slide_content_is_normalized_and_images_resolved() {
    let dirs = setup_dirs();
    let layouts = layouts(&dirs).await;
    let generator = ScriptedGenerator::new(vec![json!({
        "1": { "type": "image", "query": "lava flow" },
        "2": "**Lava** is molten rock"
    })]);

    let content = SlideContentGenerator::new(generator, ImageResolver::default())
        .generate("Famous eruptions", "Examples", "5th Grade", &layouts[4])
        .await
        .unwrap();

    assert_eq!(content.get("0"), Some(&PlaceholderValue::Text("Famous eruptions".into())));
    assert_eq!(content.get("2"), Some(&PlaceholderValue::Text("Lava is molten rock".into())));
    let Some(PlaceholderValue::Image(image)) = content.get("1") else {
        panic!("expected image, got {content:?}");
    };
    assert!(image.url.as_deref().is_some_and(|u| u.starts_with("https://picsum.photos/seed/")));
}

#[tokio::test]
async fn non_object_slide_content_is_a_parse_error() {
    let dirs = setup_dirs();
    let generator = ScriptedGenerator::new(vec![json!(["not", "an", "object"])]);
    let err = SlideContentGenerator::new(generator, ImageResolver::default())
        .generate("Title", "", "", &layouts(&dirs).await[1])
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Parse(_)));
}

#[tokio::test]
async fn one_shot_returns_numbered_slides_with_content() {
    let dirs = setup_dirs();
    let layouts = layouts(&dirs).await;
    let generator = ScriptedGenerator::new(vec![json!([
        { "title": "Volcanoes", "layout_id": 0, "content": { "1": "Grade 5 Earth Science" } },
        { "title": "Key ideas", "layout_id": 1, "content": { "1": ["Magma", "Lava", "Ash"] } },
        { "title": "Wrap up", "layout_id": 3 }
    ])]);

    let slides = SlideContentGenerator::new(generator.clone(), ImageResolver::default())
        .generate_full_presentation("Volcanoes", "5th Grade", Duration::Short, &layouts)
        .await
        .unwrap();

    assert_eq!(generator.prompt_count(), 1);
    assert_eq!(slides.iter().map(|s| s.slide_number).collect::<Vec<_>>(), [1, 2, 3]);
    assert_eq!(slides[1].content.get("1"), Some(&PlaceholderValue::Text("Magma\nLava\nAsh".into())));
    assert_eq!(slides[2].content.get("0"), Some(&PlaceholderValue::Text("Wrap up".into())));
}

#[tokio::test]
async fn one_shot_searches_each_image_query_once() {
    let dirs = setup_dirs();
    let layouts = layouts(&dirs).await;
    let generator = ScriptedGenerator::new(vec![json!([
        { "title": "Lava", "layout_id": 4, "content": { "1": { "type": "image", "query": "lava flow" } } },
        { "title": "More lava", "layout_id": 4, "content": { "1": { "type": "image", "query": "lava flow" } } },
        { "title": "Ash", "layout_id": 4, "content": { "1": { "type": "image", "query": "ash cloud" } } }
    ])]);
    let search = Arc::new(CountingSearch::default());
    let images = ImageResolver::new(Some(search.clone() as Arc<dyn ImageSearch>));

    let slides = SlideContentGenerator::new(generator, images)
        .generate_full_presentation("Volcanoes", "5th Grade", Duration::Short, &layouts)
        .await
        .unwrap();

    assert_eq!(search.queries(), ["lava flow", "ash cloud"]);
    let urls: Vec<Option<&str>> = slides
        .iter()
        .map(|s| match s.content.get("1") {
            Some(PlaceholderValue::Image(image)) => image.url.as_deref(),
            _ => None,
        })
        .collect();
    assert_eq!(
        urls,
        [Some("https://img.test/lava_flow.jpg"), Some("https://img.test/lava_flow.jpg"), Some("https://img.test/ash_cloud.jpg")]
    );
}
