//! Per-slide content generation and the one-shot whole-deck path.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::errors::GenerationError;
use crate::models::{
    ChartData, ChartSeries, ContentMap, Duration, GeneratedSlide, ImageRef, PlaceholderValue, SlidePlan, TableData,
};
use crate::pptx::LayoutInfo;

use super::genai::TextGenerator;
use super::image_search::ImageResolver;
use super::outline::{resolve_layout, slide_entries, text_field};
use super::prompts::{one_shot_prompt, slide_prompt};

pub struct SlideContentGenerator {
    generator: Arc<dyn TextGenerator>,
    images: ImageResolver,
}

impl SlideContentGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, images: ImageResolver) -> Self {
        Self { generator, images }
    }

    /// Content for one slide of `layout`, with image queries resolved.
    pub async fn generate(
        &self,
        title: &str,
        purpose: &str,
        grade: &str,
        layout: &LayoutInfo,
    ) -> Result<ContentMap, GenerationError> {
        let prompt = slide_prompt(title.trim(), purpose.trim(), grade.trim(), &layout.placeholders);
        let response = self.generator.generate_json(&prompt).await?;
        let mut content = normalize_content(&response)?;
        ensure_title(&mut content, layout, title);
        self.images.resolve_content([&mut content]).await;
        Ok(content)
    }

    /// Outline and content for a whole lesson in a single request.
    pub async fn generate_full_presentation(
        &self,
        topic: &str,
        grade: &str,
        duration: Duration,
        layouts: &[LayoutInfo],
    ) -> Result<Vec<GeneratedSlide>, GenerationError> {
        let prompt = one_shot_prompt(topic.trim(), grade.trim(), duration, layouts);
        let response = self.generator.generate_json(&prompt).await?;
        let mut slides = parse_full_presentation(&response, layouts)?;
        self.images.resolve_content(slides.iter_mut().map(|s| &mut s.content)).await;
        log::info!("One-shot deck for '{}' has {} slides", topic.trim(), slides.len());
        Ok(slides)
    }
}

/// Plan view of one-shot slides, for clients that show an outline.
pub fn outline_of(slides: &[GeneratedSlide]) -> Vec<SlidePlan> {
    slides
        .iter()
        .map(|s| SlidePlan {
            slide_number: s.slide_number,
            title: s.title.clone(),
            purpose: String::new(),
            layout_id: s.layout_id,
            content_plan: String::new(),
        })
        .collect()
}

pub fn parse_full_presentation(value: &Value, layouts: &[LayoutInfo]) -> Result<Vec<GeneratedSlide>, GenerationError> {
    let mut slides = Vec::new();
    for entry in slide_entries(value)? {
        let title = text_field(entry, "title");
        if title.is_empty() {
            log::warn!("Dropping generated slide without a title");
            continue;
        }
        let slide_number = slides.len() as u32 + 1;
        let layout_id = resolve_layout(entry.get("layout_id"), layouts, slide_number as usize)?;
        let mut content = match entry.get("content") {
            Some(v @ Value::Object(_)) => normalize_content(v)?,
            _ => {
                log::warn!("Slide {slide_number} has no content object");
                ContentMap::new()
            }
        };
        if let Some(layout) = layouts.iter().find(|l| l.id == layout_id) {
            ensure_title(&mut content, layout, &title);
        }
        slides.push(GeneratedSlide { slide_number, title, layout_id, content });
    }

    if slides.is_empty() {
        return Err(GenerationError::Parse("response contained no slides".to_string()));
    }
    Ok(slides)
}

/// Put the slide title into the layout's title placeholder when the
/// response left it out.
fn ensure_title(content: &mut ContentMap, layout: &LayoutInfo, title: &str) {
    let title = title.trim();
    if title.is_empty() {
        return;
    }
    if let Some(slot) = layout.placeholders.iter().find(|p| p.is_title) {
        content
            .entry(slot.index.to_string())
            .or_insert_with(|| PlaceholderValue::Text(title.to_string()));
    }
}

/// Map a response object to placeholder values, dropping what cannot be used.
pub fn normalize_content(value: &Value) -> Result<ContentMap, GenerationError> {
    let Value::Object(map) = value else {
        return Err(GenerationError::Parse("slide content must be a JSON object".to_string()));
    };
    let mut content = ContentMap::new();
    for (key, raw) in map {
        match normalize_value(raw) {
            Some(v) => {
                content.insert(key.trim().to_string(), v);
            }
            None => log::warn!("Dropping unusable value for placeholder {key}"),
        }
    }
    Ok(content)
}

pub fn normalize_value(value: &Value) -> Option<PlaceholderValue> {
    match value {
        Value::String(s) => non_empty(clean_text(s)).map(PlaceholderValue::Text),
        Value::Number(n) => Some(PlaceholderValue::Text(n.to_string())),
        Value::Array(items) => {
            let lines: Option<Vec<String>> = items.iter().map(scalar_text).collect();
            non_empty(clean_text(&lines?.join("\n"))).map(PlaceholderValue::Text)
        }
        Value::Object(map) => typed_value(map),
        _ => None,
    }
}

fn typed_value(map: &Map<String, Value>) -> Option<PlaceholderValue> {
    let kind = map.get("type").and_then(Value::as_str).map(str::to_lowercase);
    match kind.as_deref() {
        Some("image") | None if map.contains_key("query") || map.contains_key("url") => {
            let field = |k: &str| {
                map.get(k)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            };
            let image = ImageRef { query: field("query").or_else(|| field("search_query")), url: field("url") };
            (image.query.is_some() || image.url.is_some()).then_some(PlaceholderValue::Image(image))
        }
        Some("image") => {
            let query = map.get("search_query").and_then(Value::as_str).map(str::trim)?;
            (!query.is_empty())
                .then(|| PlaceholderValue::Image(ImageRef { query: Some(query.to_string()), url: None }))
        }
        Some("table") => {
            let headers = string_list(map.get("headers")).unwrap_or_default();
            let rows: Vec<Vec<String>> = map
                .get("rows")
                .and_then(Value::as_array)
                .map(|rows| rows.iter().filter_map(|r| string_list(Some(r))).collect())
                .unwrap_or_default();
            (!headers.is_empty() || !rows.is_empty()).then_some(PlaceholderValue::Table(TableData { headers, rows }))
        }
        Some("chart") => {
            let series: Vec<ChartSeries> = map
                .get("series")
                .and_then(Value::as_array)
                .map(|list| {
                    list.iter()
                        .filter_map(|s| {
                            let name = s.get("name").and_then(scalar_text).unwrap_or_default();
                            let values = s
                                .get("values")
                                .and_then(Value::as_array)?
                                .iter()
                                .filter_map(|v| match v {
                                    Value::Number(n) => n.as_f64(),
                                    Value::String(s) => s.trim().parse().ok(),
                                    _ => None,
                                })
                                .collect();
                            Some(ChartSeries { name, values })
                        })
                        .collect()
                })
                .unwrap_or_default();
            let chart = ChartData {
                chart_type: map.get("chart_type").and_then(Value::as_str).unwrap_or("bar").to_string(),
                categories: string_list(map.get("categories")).unwrap_or_default(),
                series,
            };
            (!chart.categories.is_empty() || !chart.series.is_empty()).then_some(PlaceholderValue::Chart(chart))
        }
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    value?
        .as_array()
        .map(|items| items.iter().map(|v| scalar_text(v).unwrap_or_default()).collect())
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

const BULLETS: &[&str] = &["* ", "- ", "• ", "· ", "– ", "▪ ", "●"];

/// Strip markdown emphasis and leading bullet markers, line by line.
pub fn clean_text(text: &str) -> String {
    let lines: Vec<String> = text
        .replace("**", "")
        .lines()
        .map(|line| {
            let mut line = line.trim();
            while let Some(rest) = BULLETS.iter().find_map(|b| line.strip_prefix(b)) {
                line = rest.trim_start();
            }
            line.to_string()
        })
        .collect();

    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    lines[start..end].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cleans_bullets_and_bold() {
        assert_eq!(clean_text("\n* **Magma** rises\n- cools\n\n"), "Magma rises\ncools");
        assert_eq!(clean_text("• one\n2. two"), "one\n2. two");
    }

    #[test]
    fn normalises_mixed_values() {
        let content = normalize_content(&json!({
            "0": "Volcanoes",
            "1": ["Hot", "Cold", 3],
            "2": {"type": "image", "query": "lava"},
            "3": {"type": "table", "headers": ["a"], "rows": [["1", 2]]},
            "4": {"type": "chart", "categories": ["x"], "series": [{"name": "s", "values": [1, "2.5"]}]},
            "5": 42,
            "6": null,
            "7": {"unknown": true}
        }))
        .unwrap();

        assert_eq!(content["1"], PlaceholderValue::Text("Hot\nCold\n3".into()));
        assert_eq!(content["2"], PlaceholderValue::Image(ImageRef { query: Some("lava".into()), url: None }));
        assert!(matches!(&content["3"], PlaceholderValue::Table(t) if t.rows == [vec!["1".to_string(), "2".into()]]));
        assert!(matches!(&content["4"], PlaceholderValue::Chart(c) if c.series[0].values == [1.0, 2.5]));
        assert_eq!(content["5"], PlaceholderValue::Text("42".into()));
        assert!(!content.contains_key("6"));
        assert!(!content.contains_key("7"));
    }

    #[test]
    fn non_object_content_is_rejected() {
        assert!(matches!(normalize_content(&json!(["a"])), Err(GenerationError::Parse(_))));
    }
}
