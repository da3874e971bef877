use std::path::Path;

use super::chart::{ChartPlot, chart_xml};
use super::content_types::{CONTENT_TYPES_PART, CT_CHART, CT_PNG, CT_SLIDE, ContentTypes};
use super::error::{PptxError, Result};
use super::layout::{Layout, presentation_part, read_layouts, read_rels};
use super::package::{Package, rels_path_for, relative_target};
use super::presentation::append_slide_ids;
use super::rels::{REL_CHART, REL_IMAGE, REL_SLIDE, REL_SLIDE_LAYOUT, Relationships};
use super::slide::{ShapeContent, SlideShape, slide_xml};

/// An opened template: its package and the layouts of its first master.
#[derive(Debug, Clone)]
pub struct Template {
    pub package: Package,
    pub layouts: Vec<Layout>,
}

impl Template {
    pub fn open(path: &Path) -> Result<Self> {
        Self::from_package(Package::open(path)?)
    }

    pub fn from_package(package: Package) -> Result<Self> {
        let layouts = read_layouts(&package)?;
        Ok(Self { package, layouts })
    }

    pub fn layout(&self, id: usize) -> Option<&Layout> {
        self.layouts.iter().find(|l| l.info.id == id)
    }

    /// Start appending slides to a copy of this template.
    pub fn deck(&self) -> Result<Deck<'_>> {
        let package = self.package.clone();
        let pres_part = presentation_part(&package)?;
        let pres_rels = read_rels(&package, &pres_part)?;
        let content_types = ContentTypes::parse(package.xml(CONTENT_TYPES_PART)?)?;
        Ok(Deck {
            layouts: &self.layouts,
            package,
            pres_part,
            pres_rels,
            content_types,
            new_slide_rids: Vec::new(),
        })
    }
}

/// A decoded PNG ready to embed.
#[derive(Debug, Clone)]
pub struct PngImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Content for one placeholder of a new slide.
#[derive(Debug, Clone)]
pub enum Fill {
    Text(String),
    Picture(PngImage),
    Table { headers: Vec<String>, rows: Vec<Vec<String>> },
    Chart(ChartPlot),
}

/// A template copy with slides being appended.
pub struct Deck<'t> {
    layouts: &'t [Layout],
    package: Package,
    pres_part: String,
    pres_rels: Relationships,
    content_types: ContentTypes,
    new_slide_rids: Vec<String>,
}

impl Deck<'_> {
    /// Append a slide built from `layout_id`. `fills` lines up with the
    /// layout's cloneable placeholders; missing entries stay empty.
    /// Returns the new slide part name.
    pub fn append_slide(&mut self, layout_id: usize, mut fills: Vec<Option<Fill>>) -> Result<String> {
        let layouts = self.layouts;
        let layout = layouts
            .iter()
            .find(|l| l.info.id == layout_id)
            .ok_or(PptxError::UnknownLayout(layout_id))?;

        let slide_part = self.package.next_part_name("ppt/slides/slide", ".xml");
        let mut slide_rels = Relationships::default();
        slide_rels.add(REL_SLIDE_LAYOUT, &relative_target(&slide_part, &layout.part));

        let shapes: Vec<_> = layout.cloneable_shapes().collect();
        fills.resize_with(shapes.len(), || None);

        let mut slide_shapes = Vec::with_capacity(shapes.len());
        for (placeholder, fill) in shapes.into_iter().zip(fills) {
            let content = match fill {
                None => None,
                Some(Fill::Text(text)) => Some(ShapeContent::Text(text)),
                Some(Fill::Table { headers, rows }) => Some(ShapeContent::Table { headers, rows }),
                Some(Fill::Picture(image)) => {
                    let media_part = self.package.next_part_name("ppt/media/image", ".png");
                    self.package.set_part(&media_part, image.data);
                    self.content_types.add_default("png", CT_PNG);
                    let rel_id = slide_rels.add(REL_IMAGE, &relative_target(&slide_part, &media_part));
                    Some(ShapeContent::Picture { rel_id, width: image.width, height: image.height })
                }
                Some(Fill::Chart(plot)) => {
                    let chart_part = self.package.next_part_name("ppt/charts/chart", ".xml");
                    self.package.set_part(&chart_part, chart_xml(&plot).into_bytes());
                    self.content_types.add_override(&chart_part, CT_CHART);
                    let rel_id = slide_rels.add(REL_CHART, &relative_target(&slide_part, &chart_part));
                    Some(ShapeContent::Chart { rel_id })
                }
            };
            slide_shapes.push(SlideShape { placeholder, content });
        }

        self.package.set_part(&slide_part, slide_xml(&slide_shapes).into_bytes());
        self.package.set_part(&rels_path_for(&slide_part), slide_rels.to_xml().into_bytes());
        self.content_types.add_override(&slide_part, CT_SLIDE);

        let rid = self
            .pres_rels
            .add(REL_SLIDE, &relative_target(&self.pres_part, &slide_part));
        self.new_slide_rids.push(rid);

        log::debug!("added {slide_part} from layout {} ({})", layout.info.id, layout.info.name);
        Ok(slide_part)
    }

    /// Write the presentation part, its relationships and the content types
    /// back into the package.
    pub fn finish(mut self) -> Result<Package> {
        let pres_xml = append_slide_ids(self.package.xml(&self.pres_part)?, &self.pres_part, &self.new_slide_rids)?;
        self.package.set_part(&self.pres_part, pres_xml.into_bytes());
        self.package
            .set_part(&rels_path_for(&self.pres_part), self.pres_rels.to_xml().into_bytes());
        self.package
            .set_part(CONTENT_TYPES_PART, self.content_types.to_xml().into_bytes());
        Ok(self.package)
    }
}
