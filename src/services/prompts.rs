//! Prompt text for the generative-text service.

use serde::Serialize;

use crate::models::Duration;
use crate::pptx::{LayoutInfo, PlaceholderInfo};

/// `ID n: name (Slots: a, b)` per layout, one per line.
pub fn layout_list(layouts: &[LayoutInfo]) -> String {
    layouts
        .iter()
        .map(|l| {
            let slots: Vec<&str> = l.placeholders.iter().map(|p| p.name.as_str()).collect();
            format!("ID {}: {} (Slots: {})", l.id, l.name, slots.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn outline_prompt(topic: &str, grade: &str, duration: Duration, layouts: &[LayoutInfo]) -> String {
    format!(
        r#"Act as an expert curriculum planner. Create a {minutes}-minute lesson plan on "{topic}" for Grade {grade}.

Available Slide Layouts (ID: Name - Slots):
{layouts}

Output a JSON array of objects. Each object represents a slide and must have:
- "slide_number": int
- "layout_id": int (must be one of the available IDs)
- "title": str (the main topic of this slide)
- "purpose": str (brief explanation of why this slide is here)
- "content_plan": str (brief notes on what content goes here)

Ensure the lesson has a logical flow: Introduction -> Core Concepts -> Activity/Interaction -> Summary/Assessment.
Produce exactly {slides} slides.
Output purely JSON, no markdown formatting."#,
        minutes = duration.minutes(),
        topic = topic,
        grade = grade,
        layouts = layout_list(layouts),
        slides = duration.target_slides(),
    )
}

#[derive(Serialize)]
struct SlotSchema<'a> {
    index: u32,
    name: &'a str,
    kind: &'a str,
    accepts_image: bool,
}

fn slot_schema(placeholders: &[PlaceholderInfo]) -> String {
    let slots: Vec<SlotSchema<'_>> = placeholders
        .iter()
        .map(|p| SlotSchema {
            index: p.index,
            name: &p.name,
            kind: if p.is_title { "title" } else if p.is_image && !p.kind.is_generic() { "image" } else { "text" },
            accepts_image: p.is_image,
        })
        .collect();
    serde_json::to_string_pretty(&slots).unwrap_or_else(|_| "[]".to_string())
}

pub fn slide_prompt(title: &str, purpose: &str, grade: &str, placeholders: &[PlaceholderInfo]) -> String {
    let wants_image = placeholders.iter().any(|p| p.is_image);
    let image_rule = if wants_image {
        r#"4. Where a visual aids understanding and the slot accepts an image, give {"type": "image", "query": "KEYWORD SEARCH TERMS"} instead of text.
   The query must be 2-4 simple keywords, e.g. "photosynthesis diagram" or "DNA double helix".
   Prefer at least one image per slide."#
    } else {
        "4. This layout has no image slots; provide text only."
    };

    format!(
        r#"Write the content for a presentation slide.
Topic: {title}
Purpose: {purpose}
Target Audience: Grade {grade}

Placeholders Schema:
{schema}

Instructions:
1. Return a JSON object whose keys are the placeholder indices (as strings).
2. Content must be educational, engaging and appropriate for the grade level.
3. Do NOT use markdown (no **bold**) and do NOT start lines with bullet characters (* or -). Separate points with newlines.
{image_rule}

Output purely JSON."#,
        schema = slot_schema(placeholders),
    )
}

pub fn one_shot_prompt(topic: &str, grade: &str, duration: Duration, layouts: &[LayoutInfo]) -> String {
    let described: Vec<String> = layouts
        .iter()
        .map(|l| {
            let slots: Vec<String> = l.placeholders.iter().map(|p| format!("{} ({})", p.index, p.name)).collect();
            format!("Layout ID {} ({}): Placeholders [{}]", l.id, l.name, slots.join(", "))
        })
        .collect();

    format!(
        r#"Act as an expert educator. Create a complete lesson presentation plan and content on "{topic}" for Grade {grade}.
Duration: {minutes} minutes.

Available Slide Layouts:
{layouts}

Instructions:
1. Select 5-8 slides for the lesson.
2. For EACH slide, choose the best Layout ID and generate full content.
3. Fill every placeholder of the chosen layout. Keys are placeholder indices as strings.
4. For images use {{"type": "image", "query": "2-4 KEYWORD SEARCH TERMS"}}.
5. Do NOT use bullet characters (* or -); use newlines.

Output JSON Format:
{{"slides": [{{"slide_number": 1, "title": "Slide Title", "layout_id": 0, "content": {{"0": "Title", "1": "Subtitle"}}}}]}}"#,
        minutes = duration.minutes(),
        layouts = described.join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::PlaceholderKind;

    fn layouts() -> Vec<LayoutInfo> {
        vec![LayoutInfo {
            id: 1,
            name: "Title and Content".into(),
            placeholders: vec![
                PlaceholderInfo {
                    index: 0,
                    name: "Title 1".into(),
                    kind: PlaceholderKind::Title,
                    is_title: true,
                    is_image: false,
                    is_table: false,
                    is_chart: false,
                },
                PlaceholderInfo {
                    index: 1,
                    name: "Content Placeholder 2".into(),
                    kind: PlaceholderKind::Object,
                    is_title: false,
                    is_image: true,
                    is_table: true,
                    is_chart: true,
                },
            ],
        }]
    }

    #[test]
    fn outline_prompt_lists_layouts_and_target() {
        let prompt = outline_prompt("Volcanoes", "5th Grade", Duration::Medium, &layouts());
        assert!(prompt.contains("45-minute lesson plan on \"Volcanoes\""));
        assert!(prompt.contains("ID 1: Title and Content (Slots: Title 1, Content Placeholder 2)"));
        assert!(prompt.contains("exactly 7 slides"));
    }

    #[test]
    fn slide_prompt_asks_for_images_only_when_possible() {
        let l = layouts();
        assert!(slide_prompt("Lava", "Why", "5", &l[0].placeholders).contains(r#""type": "image""#));
        assert!(!slide_prompt("Lava", "Why", "5", &l[0].placeholders[..1]).contains(r#""type": "image""#));
    }
}
