use std::sync::Arc;

use serde_json::Value;

use crate::errors::GenerationError;
use crate::models::{Duration, SlidePlan};
use crate::pptx::LayoutInfo;

use super::genai::TextGenerator;
use super::prompts::outline_prompt;

pub struct OutlineGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl OutlineGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn generate(
        &self,
        topic: &str,
        grade: &str,
        duration: Duration,
        layouts: &[LayoutInfo],
    ) -> Result<Vec<SlidePlan>, GenerationError> {
        let prompt = outline_prompt(topic.trim(), grade.trim(), duration, layouts);
        let response = self.generator.generate_json(&prompt).await?;
        let plans = parse_outline(&response, layouts)?;
        log::info!("Outline for '{}' has {} slides", topic.trim(), plans.len());
        Ok(plans)
    }
}

/// The slide entries of a response: a bare array, or an object holding one
/// under `slides` or `outline`.
pub(crate) fn slide_entries<'a>(value: &'a Value) -> Result<&'a [Value], GenerationError> {
    let list = match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => map
            .get("slides")
            .or_else(|| map.get("outline"))
            .and_then(Value::as_array),
        _ => None,
    };
    list.map(Vec::as_slice)
        .ok_or_else(|| GenerationError::Parse("expected a list of slides".to_string()))
}

/// First layout with a content placeholder, then one with any body text
/// slot, else the first layout. `None` for a template without layouts.
pub(crate) fn fallback_layout(layouts: &[LayoutInfo]) -> Option<usize> {
    layouts
        .iter()
        .find(|l| l.placeholders.iter().any(|p| p.kind.is_generic()))
        .or_else(|| layouts.iter().find(|l| l.has_body_slot()))
        .or_else(|| layouts.first())
        .map(|l| l.id)
}

/// A `layout_id` from a response, checked against the template.
pub(crate) fn resolve_layout(
    raw: Option<&Value>,
    layouts: &[LayoutInfo],
    slide: usize,
) -> Result<usize, GenerationError> {
    let requested = raw.and_then(|v| match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    });
    match requested {
        Some(id) if layouts.iter().any(|l| l.id as u64 == id) => Ok(id as usize),
        other => {
            let fallback = fallback_layout(layouts)
                .ok_or_else(|| GenerationError::Parse("template has no slide layouts".to_string()))?;
            log::warn!("Slide {slide}: layout {other:?} is not in the template, using {fallback}");
            Ok(fallback)
        }
    }
}

pub(crate) fn text_field(entry: &Value, key: &str) -> String {
    match entry.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

pub fn parse_outline(value: &Value, layouts: &[LayoutInfo]) -> Result<Vec<SlidePlan>, GenerationError> {
    let mut plans = Vec::new();
    for entry in slide_entries(value)? {
        let title = text_field(entry, "title");
        if title.is_empty() {
            log::warn!("Dropping outline entry without a title");
            continue;
        }
        let slide_number = plans.len() as u32 + 1;
        plans.push(SlidePlan {
            slide_number,
            layout_id: resolve_layout(entry.get("layout_id"), layouts, slide_number as usize)?,
            title,
            purpose: text_field(entry, "purpose"),
            content_plan: text_field(entry, "content_plan"),
        });
    }

    if plans.is_empty() {
        return Err(GenerationError::Parse("outline contained no slides".to_string()));
    }
    Ok(plans)
}
