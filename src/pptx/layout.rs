//! Slide layout introspection.
//!
//! Layout ids are positions in the first slide master's `p:sldLayoutIdLst`,
//! the same order PowerPoint shows in its layout gallery.

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};

use super::error::{PptxError, Result};
use super::package::{Package, rels_path_for, resolve_target};
use super::rels::{REL_OFFICE_DOCUMENT, Relationships};
use super::xml::{attr, attr_i64, prefixed_attr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderKind {
    Title,
    CenterTitle,
    Subtitle,
    Body,
    Object,
    Picture,
    Table,
    Chart,
    Date,
    Footer,
    SlideNumber,
    Other,
}

impl PlaceholderKind {
    /// Map an OOXML `ph@type` value; an absent type means `obj`.
    pub fn from_ph_type(ph_type: Option<&str>) -> Self {
        match ph_type {
            None | Some("obj") => Self::Object,
            Some("title") => Self::Title,
            Some("ctrTitle") => Self::CenterTitle,
            Some("subTitle") => Self::Subtitle,
            Some("body") => Self::Body,
            Some("pic") | Some("clipArt") => Self::Picture,
            Some("tbl") => Self::Table,
            Some("chart") => Self::Chart,
            Some("dt") => Self::Date,
            Some("ftr") => Self::Footer,
            Some("sldNum") => Self::SlideNumber,
            Some(_) => Self::Other,
        }
    }

    /// Date, footer and slide-number placeholders are not copied onto new slides.
    pub fn is_cloneable(self) -> bool {
        !matches!(self, Self::Date | Self::Footer | Self::SlideNumber)
    }

    pub fn is_generic(self) -> bool {
        matches!(self, Self::Object | Self::Body)
    }
}

/// Position and size in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Rect {
    /// Default content area of a 10in x 7.5in slide.
    pub const DEFAULT_BODY: Rect = Rect { x: 457_200, y: 1_600_200, cx: 8_229_600, cy: 4_525_963 };
}

/// A placeholder as described to clients and prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderInfo {
    pub index: u32,
    pub name: String,
    pub kind: PlaceholderKind,
    pub is_title: bool,
    pub is_image: bool,
    pub is_table: bool,
    pub is_chart: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub id: usize,
    pub name: String,
    pub placeholders: Vec<PlaceholderInfo>,
}

impl LayoutInfo {
    /// True when the layout has somewhere to put body text.
    pub fn has_body_slot(&self) -> bool {
        self.placeholders
            .iter()
            .any(|p| p.kind.is_generic() || p.kind == PlaceholderKind::Subtitle)
    }
}

/// A placeholder shape read from layout XML, carrying what a slide needs to
/// reference it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderShape {
    pub name: String,
    pub ph_type: Option<String>,
    pub idx: Option<u32>,
    pub orient: Option<String>,
    pub size: Option<String>,
    pub kind: PlaceholderKind,
    pub rect: Option<Rect>,
}

impl PlaceholderShape {
    pub fn index(&self) -> u32 {
        self.idx.unwrap_or(0)
    }

    pub fn info(&self) -> PlaceholderInfo {
        let lower = self.name.to_lowercase();
        let generic = self.kind.is_generic();
        PlaceholderInfo {
            index: self.index(),
            name: self.name.clone(),
            kind: self.kind,
            is_title: matches!(self.kind, PlaceholderKind::Title | PlaceholderKind::CenterTitle)
                || (lower.contains("title") && !lower.contains("subtitle")),
            is_image: generic || self.kind == PlaceholderKind::Picture || lower.contains("picture"),
            is_table: generic || self.kind == PlaceholderKind::Table || lower.contains("table"),
            is_chart: generic || self.kind == PlaceholderKind::Chart || lower.contains("chart"),
        }
    }
}

/// A layout with the details needed to instantiate slides from it.
#[derive(Debug, Clone)]
pub struct Layout {
    pub info: LayoutInfo,
    pub part: String,
    pub shapes: Vec<PlaceholderShape>,
}

impl Layout {
    pub fn cloneable_shapes(&self) -> impl Iterator<Item = &PlaceholderShape> {
        self.shapes.iter().filter(|s| s.kind.is_cloneable())
    }
}

pub(crate) fn read_rels(pkg: &Package, part: &str) -> Result<Relationships> {
    let rels_part = rels_path_for(part);
    if !pkg.contains(&rels_part) {
        return Ok(Relationships::default());
    }
    Relationships::parse(pkg.xml(&rels_part)?, &rels_part)
}

/// The main presentation part, normally `ppt/presentation.xml`.
pub fn presentation_part(pkg: &Package) -> Result<String> {
    let root = read_rels(pkg, "")?;
    let part = root
        .first_of_type(REL_OFFICE_DOCUMENT)
        .map(|r| resolve_target("", &r.target))
        .unwrap_or_else(|| "ppt/presentation.xml".to_string());
    if !pkg.contains(&part) {
        return Err(PptxError::MissingPart(part));
    }
    Ok(part)
}

/// Read the layouts of the first slide master, in gallery order.
pub fn read_layouts(pkg: &Package) -> Result<Vec<Layout>> {
    let pres_part = presentation_part(pkg)?;
    let pres_rels = read_rels(pkg, &pres_part)?;

    let master_rid = list_rids(pkg.xml(&pres_part)?, &pres_part, b"sldMasterId")?
        .into_iter()
        .next()
        .ok_or_else(|| PptxError::xml(&pres_part, "no slide master"))?;
    let master_rel = pres_rels
        .by_id(&master_rid)
        .ok_or_else(|| PptxError::xml(&pres_part, format!("dangling master relationship {master_rid}")))?;
    let master_part = resolve_target(&pres_part, &master_rel.target);

    let master_xml = pkg.xml(&master_part)?;
    let master_rels = read_rels(pkg, &master_part)?;
    let (_, master_shapes) = parse_shapes(master_xml, &master_part)?;

    let mut layouts = Vec::new();
    for (id, rid) in list_rids(master_xml, &master_part, b"sldLayoutId")?.into_iter().enumerate() {
        let Some(rel) = master_rels.by_id(&rid) else {
            log::warn!("{master_part}: layout relationship {rid} not found, skipping");
            continue;
        };
        let part = resolve_target(&master_part, &rel.target);
        let (name, mut shapes) = parse_shapes(pkg.xml(&part)?, &part)?;

        for shape in shapes.iter_mut().filter(|s| s.rect.is_none()) {
            shape.rect = inherited_rect(shape, &master_shapes);
        }

        let info = LayoutInfo {
            id,
            name: name.unwrap_or_else(|| format!("Layout {}", id + 1)),
            placeholders: shapes.iter().filter(|s| s.kind.is_cloneable()).map(|s| s.info()).collect(),
        };
        layouts.push(Layout { info, part, shapes });
    }

    Ok(layouts)
}

/// A layout placeholder without its own `xfrm` inherits from the master's
/// title or body placeholder.
fn inherited_rect(shape: &PlaceholderShape, master: &[PlaceholderShape]) -> Option<Rect> {
    let wanted = match shape.kind {
        PlaceholderKind::Title | PlaceholderKind::CenterTitle => PlaceholderKind::Title,
        PlaceholderKind::Date | PlaceholderKind::Footer | PlaceholderKind::SlideNumber => shape.kind,
        _ => PlaceholderKind::Body,
    };
    master.iter().find(|m| m.kind == wanted).and_then(|m| m.rect)
}

/// `r:id` values of every element with the given local name, in document order.
pub(crate) fn list_rids(xml: &str, part: &str, element: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut ids = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == element => {
                if let Some(rid) = prefixed_attr(&e, b"id") {
                    ids.push(rid);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(PptxError::xml(part, e)),
            _ => {}
        }
    }

    Ok(ids)
}

#[derive(Default)]
struct ShapeScan {
    tag: Vec<u8>,
    nesting: usize,
    name: Option<String>,
    ph: Option<(Option<String>, Option<u32>, Option<String>, Option<String>)>,
    in_xfrm: bool,
    off: Option<(i64, i64)>,
    ext: Option<(i64, i64)>,
}

impl ShapeScan {
    fn finish(self) -> Option<PlaceholderShape> {
        let (ph_type, idx, orient, size) = self.ph?;
        let rect = match (self.off, self.ext) {
            (Some((x, y)), Some((cx, cy))) => Some(Rect { x, y, cx, cy }),
            _ => None,
        };
        Some(PlaceholderShape {
            name: self.name.unwrap_or_default(),
            kind: PlaceholderKind::from_ph_type(ph_type.as_deref()),
            ph_type,
            idx,
            orient,
            size,
            rect,
        })
    }
}

/// Parse the `cSld` name and every placeholder shape of a layout or master.
pub(crate) fn parse_shapes(xml: &str, part: &str) -> Result<(Option<String>, Vec<PlaceholderShape>)> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut name = None;
    let mut shapes = Vec::new();
    let mut scan: Option<ShapeScan> = None;

    loop {
        let event = reader.read_event().map_err(|e| PptxError::xml(part, e))?;
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let local = e.local_name();
                let local = local.as_ref();

                if local == b"cSld" && name.is_none() {
                    name = attr(e, b"name").filter(|n| !n.is_empty());
                }

                if scan.is_none() {
                    if !is_empty && matches!(local, b"sp" | b"pic" | b"graphicFrame") {
                        scan = Some(ShapeScan { tag: local.to_vec(), nesting: 1, ..Default::default() });
                    }
                } else if let Some(s) = scan.as_mut() {
                    if local == s.tag.as_slice() && !is_empty {
                        s.nesting += 1;
                    }
                    match local {
                        b"cNvPr" if s.name.is_none() => s.name = attr(e, b"name"),
                        b"ph" => {
                            s.ph = Some((
                                attr(e, b"type"),
                                attr_i64(e, b"idx").and_then(|v| u32::try_from(v).ok()),
                                attr(e, b"orient"),
                                attr(e, b"sz"),
                            ))
                        }
                        b"xfrm" if !is_empty => s.in_xfrm = true,
                        b"off" if s.in_xfrm => {
                            s.off = attr_i64(e, b"x").zip(attr_i64(e, b"y"));
                        }
                        b"ext" if s.in_xfrm => {
                            s.ext = attr_i64(e, b"cx").zip(attr_i64(e, b"cy"));
                        }
                        _ => {}
                    }
                }
            }
            Event::End(ref e) => {
                let local = e.local_name();
                let local = local.as_ref();
                if let Some(s) = scan.as_mut() {
                    if local == b"xfrm" {
                        s.in_xfrm = false;
                    } else if local == s.tag.as_slice() {
                        s.nesting -= 1;
                        if s.nesting == 0 {
                            if let Some(shape) = scan.take().and_then(ShapeScan::finish) {
                                shapes.push(shape);
                            }
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok((name, shapes))
}
