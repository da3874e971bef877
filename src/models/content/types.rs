use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::pptx::LayoutInfo;

pub const DEFAULT_TEMPLATE: &str = "modern_template.pptx";

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

/// An image slot value. A query without a URL is resolved at build time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableData {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    #[serde(default)]
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default = "default_chart_type")]
    pub chart_type: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub series: Vec<ChartSeries>,
}

fn default_chart_type() -> String {
    "bar".to_string()
}

impl ChartData {
    /// Tabular view: a category column followed by one column per series.
    pub fn to_table(&self) -> TableData {
        let mut headers = Vec::with_capacity(self.series.len() + 1);
        headers.push(String::new());
        headers.extend(self.series.iter().map(|s| s.name.clone()));

        let rows = self
            .categories
            .iter()
            .enumerate()
            .map(|(i, category)| {
                let mut row = vec![category.clone()];
                row.extend(
                    self.series
                        .iter()
                        .map(|s| s.values.get(i).map(|v| format_number(*v)).unwrap_or_default()),
                );
                row
            })
            .collect();

        TableData { headers, rows }
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// What goes into one placeholder. Serialized as a plain string for text or
/// an object tagged by `"type"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ValueRepr", into = "ValueRepr")]
pub enum PlaceholderValue {
    Text(String),
    Image(ImageRef),
    Table(TableData),
    Chart(ChartData),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ValueRepr {
    Text(String),
    Typed(TypedValue),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TypedValue {
    Image(ImageRef),
    Table(TableData),
    Chart(ChartData),
}

impl From<ValueRepr> for PlaceholderValue {
    fn from(repr: ValueRepr) -> Self {
        match repr {
            ValueRepr::Text(s) => PlaceholderValue::Text(s),
            ValueRepr::Typed(TypedValue::Image(i)) => PlaceholderValue::Image(i),
            ValueRepr::Typed(TypedValue::Table(t)) => PlaceholderValue::Table(t),
            ValueRepr::Typed(TypedValue::Chart(c)) => PlaceholderValue::Chart(c),
        }
    }
}

impl From<PlaceholderValue> for ValueRepr {
    fn from(value: PlaceholderValue) -> Self {
        match value {
            PlaceholderValue::Text(s) => ValueRepr::Text(s),
            PlaceholderValue::Image(i) => ValueRepr::Typed(TypedValue::Image(i)),
            PlaceholderValue::Table(t) => ValueRepr::Typed(TypedValue::Table(t)),
            PlaceholderValue::Chart(c) => ValueRepr::Typed(TypedValue::Chart(c)),
        }
    }
}

/// Placeholder key (the `idx` as a string) to value.
pub type ContentMap = BTreeMap<String, PlaceholderValue>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SlideContent {
    pub layout_id: usize,
    #[serde(default)]
    pub content: ContentMap,
}

/// A fully generated slide from the one-shot path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSlide {
    pub slide_number: u32,
    pub title: String,
    pub layout_id: usize,
    #[serde(default)]
    pub content: ContentMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRequest {
    #[serde(default = "default_template")]
    pub template_filename: String,
    #[serde(default)]
    pub slides: Vec<SlideContent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildResult {
    pub download_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePlan {
    pub filename: String,
    pub layout_count: usize,
    pub layouts: Vec<LayoutInfo>,
}
