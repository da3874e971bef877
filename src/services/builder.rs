//! Presentation builder: fills a template with generated slides and writes
//! the result into the media directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::Rng;

use crate::errors::BuildError;
use crate::models::{BuildRequest, BuildResult, ChartData, ContentMap, PlaceholderValue, SlideContent};
use crate::pptx::{ChartPlot, ChartStyle, Fill, Layout, PlaceholderKind, PlaceholderShape, PngImage, Template};

use super::catalog::TemplateCatalog;
use super::image_fetch::{ImageFetcher, to_png};
use super::image_search::ImageResolver;

pub const IMAGE_ERROR_TEXT: &str = "[Error loading image]";

pub struct PresentationBuilder {
    catalog: TemplateCatalog,
    images: ImageResolver,
    fetcher: Arc<dyn ImageFetcher>,
    media_dir: PathBuf,
}

impl PresentationBuilder {
    pub fn new(
        catalog: TemplateCatalog,
        images: ImageResolver,
        fetcher: Arc<dyn ImageFetcher>,
        media_dir: impl Into<PathBuf>,
    ) -> Self {
        Self { catalog, images, fetcher, media_dir: media_dir.into() }
    }

    pub async fn build(&self, request: &BuildRequest) -> Result<BuildResult, BuildError> {
        let template = self.catalog.load(&request.template_filename).await?;
        for slide in &request.slides {
            if template.layout(slide.layout_id).is_none() {
                return Err(BuildError::UnknownLayout { layout_id: slide.layout_id });
            }
        }

        let mut slides = request.slides.clone();
        self.images.resolve_content(slides.iter_mut().map(|s| &mut s.content)).await;
        let pictures = self.download_images(&slides).await;

        let count = slides.len();
        let bytes = tokio::task::spawn_blocking(move || assemble(&template, &slides, &pictures)).await??;
        let filename = write_output(&self.media_dir, &bytes).await?;
        log::info!("Built {filename} from {} with {count} new slides", request.template_filename);
        Ok(BuildResult { download_url: format!("/media/{filename}") })
    }

    /// Download and convert each distinct image URL once. Failures map to
    /// `None` and become error text on the slide.
    async fn download_images(&self, slides: &[SlideContent]) -> HashMap<String, Option<PngImage>> {
        let mut pictures = HashMap::new();
        for slide in slides {
            for value in slide.content.values() {
                let PlaceholderValue::Image(image) = value else { continue };
                let Some(url) = image.url.as_deref() else { continue };
                if pictures.contains_key(url) {
                    continue;
                }
                let png = match self.fetcher.fetch(url).await {
                    Ok(fetched) => match to_png(&fetched.bytes) {
                        Ok(png) => Some(png),
                        Err(e) => {
                            let served_as = fetched.content_type.as_deref().unwrap_or("no content type");
                            log::warn!("Could not decode image {url} ({served_as}): {e}");
                            None
                        }
                    },
                    Err(e) => {
                        log::warn!("Could not download image {url}: {e}");
                        None
                    }
                };
                pictures.insert(url.to_string(), png);
            }
        }
        pictures
    }
}

/// Append the slides to a copy of the template and serialize it.
pub fn assemble(
    template: &Template,
    slides: &[SlideContent],
    pictures: &HashMap<String, Option<PngImage>>,
) -> Result<Vec<u8>, BuildError> {
    let mut deck = template.deck()?;
    for slide in slides {
        let layout = template
            .layout(slide.layout_id)
            .ok_or(BuildError::UnknownLayout { layout_id: slide.layout_id })?;
        let fills = assign_content(layout, &slide.content)
            .into_iter()
            .map(|value| value.map(|v| to_fill(v, pictures)))
            .collect();
        deck.append_slide(slide.layout_id, fills)?;
    }
    Ok(deck.finish()?.to_bytes()?)
}

fn to_fill(value: &PlaceholderValue, pictures: &HashMap<String, Option<PngImage>>) -> Fill {
    match value {
        PlaceholderValue::Text(text) => Fill::Text(text.clone()),
        PlaceholderValue::Image(image) => match image.url.as_deref().and_then(|u| pictures.get(u)) {
            Some(Some(png)) => Fill::Picture(png.clone()),
            _ => Fill::Text(IMAGE_ERROR_TEXT.to_string()),
        },
        PlaceholderValue::Table(table) => Fill::Table { headers: table.headers.clone(), rows: table.rows.clone() },
        PlaceholderValue::Chart(chart) => match chart_plot(chart) {
            Some(plot) => Fill::Chart(plot),
            None => {
                let table = chart.to_table();
                Fill::Table { headers: table.headers, rows: table.rows }
            }
        },
    }
}

/// Native chart for `chart`, or `None` when no series has a value to plot.
/// Unrecognised chart types draw as clustered bars.
fn chart_plot(chart: &ChartData) -> Option<ChartPlot> {
    if chart.series.iter().all(|s| s.values.is_empty()) {
        return None;
    }
    let style = ChartStyle::from_name(&chart.chart_type).unwrap_or_else(|| {
        log::warn!("Unknown chart type '{}', using a bar chart", chart.chart_type);
        ChartStyle::DEFAULT
    });
    Some(ChartPlot {
        style,
        categories: chart.categories.clone(),
        series: chart.series.iter().map(|s| (s.name.clone(), s.values.clone())).collect(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Title,
    Image,
    Table,
    Chart,
    Text,
}

fn shape_bucket(shape: &PlaceholderShape) -> Bucket {
    let name = shape.name.to_lowercase();
    if shape.info().is_title {
        Bucket::Title
    } else if shape.kind == PlaceholderKind::Picture || name.contains("picture") {
        Bucket::Image
    } else if shape.kind == PlaceholderKind::Table || name.contains("table") {
        Bucket::Table
    } else if shape.kind == PlaceholderKind::Chart || name.contains("chart") {
        Bucket::Chart
    } else {
        Bucket::Text
    }
}

fn value_bucket(value: &PlaceholderValue) -> Bucket {
    match value {
        PlaceholderValue::Text(_) => Bucket::Text,
        PlaceholderValue::Image(_) => Bucket::Image,
        PlaceholderValue::Table(_) => Bucket::Table,
        PlaceholderValue::Chart(_) => Bucket::Chart,
    }
}

/// Whether a placeholder can show this kind of value at all.
fn accepts(shape: &PlaceholderShape, value: &PlaceholderValue) -> bool {
    let info = shape.info();
    match value {
        PlaceholderValue::Text(_) => {
            !matches!(shape.kind, PlaceholderKind::Picture | PlaceholderKind::Table | PlaceholderKind::Chart)
        }
        PlaceholderValue::Image(_) => info.is_image && !info.is_title,
        PlaceholderValue::Table(_) => info.is_table && !info.is_title,
        PlaceholderValue::Chart(_) => info.is_chart && !info.is_title,
    }
}

/// Numeric keys in numeric order, then the rest.
fn ordered_keys(content: &ContentMap) -> Vec<&String> {
    let mut keys: Vec<&String> = content.keys().collect();
    keys.sort_by(|a, b| match (a.trim().parse::<u32>(), b.trim().parse::<u32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    });
    keys
}

/// Decide which value goes into which cloneable placeholder of `layout`.
///
/// Keys that name a placeholder `idx` fill it directly. Everything else goes
/// to the first free placeholder of the same bucket; media values may also
/// take a free generic content placeholder.
pub fn assign_content<'c>(layout: &Layout, content: &'c ContentMap) -> Vec<Option<&'c PlaceholderValue>> {
    let shapes: Vec<&PlaceholderShape> = layout.cloneable_shapes().collect();
    let mut slots: Vec<Option<&PlaceholderValue>> = vec![None; shapes.len()];
    let mut unmatched = Vec::new();

    for key in ordered_keys(content) {
        let value = &content[key];
        let exact = key.trim().parse::<u32>().ok().and_then(|idx| {
            shapes
                .iter()
                .position(|s| s.index() == idx)
                .filter(|&i| slots[i].is_none() && accepts(shapes[i], value))
        });
        match exact {
            Some(i) => slots[i] = Some(value),
            None => unmatched.push((key, value)),
        }
    }

    for (key, value) in unmatched {
        let wanted = value_bucket(value);
        let free = |i: &usize| slots[*i].is_none();
        let target = (0..shapes.len())
            .filter(free)
            .find(|&i| shape_bucket(shapes[i]) == wanted)
            .or_else(|| {
                if wanted == Bucket::Text {
                    return None;
                }
                (0..shapes.len())
                    .filter(free)
                    .find(|&i| shapes[i].kind.is_generic() && accepts(shapes[i], value))
            });
        match target {
            Some(i) => slots[i] = Some(value),
            None => log::debug!("No placeholder left for content key {key} in layout {}", layout.info.id),
        }
    }

    slots
}

async fn write_output(media_dir: &Path, bytes: &[u8]) -> Result<String, BuildError> {
    tokio::fs::create_dir_all(media_dir).await?;
    let filename = format!(
        "lesson_{}_{}.pptx",
        chrono::Utc::now().format("%Y%m%d_%H%M%S"),
        hex::encode(rand::rng().random::<[u8; 4]>())
    );
    let final_path = media_dir.join(&filename);
    let tmp_path = media_dir.join(format!(".{filename}.tmp"));

    if let Err(e) = tokio::fs::write(&tmp_path, bytes).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e.into());
    }
    if let Err(e) = tokio::fs::rename(&tmp_path, &final_path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e.into());
    }
    Ok(filename)
}
