//! Slide part XML generation.
//!
//! Every placeholder shape keeps its `p:ph` reference so position, size and
//! text style inherit from the layout. Pictures and tables carry an explicit
//! transform because their frames are sized to the content.

use std::fmt::Write as FmtWrite;

use super::layout::{PlaceholderShape, Rect};
use super::xml::{XML_DECL, esc};

const NS_DECLS: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);

const TABLE_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/table";
const CHART_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
const TABLE_ROW_HEIGHT: i64 = 370_840;

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeContent {
    Text(String),
    Picture { rel_id: String, width: u32, height: u32 },
    Table { headers: Vec<String>, rows: Vec<Vec<String>> },
    /// Reference to a chart part through the slide relationship `rel_id`.
    Chart { rel_id: String },
}

/// One placeholder of the new slide and what to put in it.
#[derive(Debug, Clone)]
pub struct SlideShape<'a> {
    pub placeholder: &'a PlaceholderShape,
    pub content: Option<ShapeContent>,
}

/// Font size in points for a block of text of the given length.
pub fn font_size_for(chars: usize) -> u32 {
    match chars {
        n if n > 300 => 12,
        n if n > 200 => 14,
        n if n > 100 => 18,
        _ => 24,
    }
}

pub fn slide_xml(shapes: &[SlideShape<'_>]) -> String {
    let mut xml = String::with_capacity(1024 + shapes.len() * 512);
    xml.push_str(XML_DECL);
    let _ = write!(xml, "<p:sld {NS_DECLS}>");
    xml.push_str("<p:cSld><p:spTree>");
    xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
    xml.push_str("<p:grpSpPr/>");

    for (i, shape) in shapes.iter().enumerate() {
        let id = i as u32 + 2;
        match &shape.content {
            Some(ShapeContent::Picture { rel_id, width, height }) => {
                write_picture(&mut xml, id, shape.placeholder, rel_id, *width, *height)
            }
            Some(ShapeContent::Table { headers, rows }) => {
                write_table(&mut xml, id, shape.placeholder, headers, rows)
            }
            Some(ShapeContent::Chart { rel_id }) => write_chart_frame(&mut xml, id, shape.placeholder, rel_id),
            Some(ShapeContent::Text(text)) => write_text_shape(&mut xml, id, shape.placeholder, Some(text)),
            None => write_text_shape(&mut xml, id, shape.placeholder, None),
        }
    }

    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sld>");
    xml
}

fn shape_name(ph: &PlaceholderShape, id: u32) -> String {
    if ph.name.is_empty() {
        format!("Placeholder {}", id - 1)
    } else {
        ph.name.clone()
    }
}

fn ph_element(ph: &PlaceholderShape) -> String {
    let mut el = String::from("<p:ph");
    if let Some(t) = &ph.ph_type {
        let _ = write!(el, r#" type="{}""#, esc(t));
    }
    if let Some(o) = &ph.orient {
        let _ = write!(el, r#" orient="{}""#, esc(o));
    }
    if let Some(sz) = &ph.size {
        let _ = write!(el, r#" sz="{}""#, esc(sz));
    }
    if let Some(idx) = ph.idx {
        let _ = write!(el, r#" idx="{idx}""#);
    }
    el.push_str("/>");
    el
}

fn holds_text(ph: &PlaceholderShape) -> bool {
    !matches!(ph.ph_type.as_deref(), Some("pic") | Some("clipArt") | Some("tbl") | Some("chart") | Some("media"))
}

fn write_text_shape(xml: &mut String, id: u32, ph: &PlaceholderShape, text: Option<&str>) {
    let _ = write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{}</p:nvPr></p:nvSpPr><p:spPr/>"#,
        esc(&shape_name(ph, id)),
        ph_element(ph)
    );
    match text {
        Some(text) => write_text_body(xml, text),
        None if holds_text(ph) => {
            xml.push_str(r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody>"#)
        }
        None => {}
    }
    xml.push_str("</p:sp>");
}

fn write_text_body(xml: &mut String, text: &str) {
    let text = sanitize(text);
    let sz = font_size_for(text.chars().count()) * 100;
    xml.push_str(r#"<p:txBody><a:bodyPr wrap="square"/><a:lstStyle/>"#);
    for line in text.lines() {
        if line.trim().is_empty() {
            let _ = write!(xml, r#"<a:p><a:endParaRPr lang="en-US" sz="{sz}"/></a:p>"#);
        } else {
            let _ = write!(
                xml,
                r#"<a:p><a:r><a:rPr lang="en-US" sz="{sz}" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
                esc(line.trim_end())
            );
        }
    }
    if text.lines().next().is_none() {
        xml.push_str(r#"<a:p><a:endParaRPr lang="en-US"/></a:p>"#);
    }
    xml.push_str("</p:txBody>");
}

/// Drop characters XML 1.0 cannot carry.
fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| matches!(c, '\t' | '\n' | '\r') || !c.is_control())
        .collect()
}

/// Scale `width` x `height` to fit inside `frame`, centred.
pub fn fit_within(frame: Rect, width: u32, height: u32) -> Rect {
    if width == 0 || height == 0 || frame.cx <= 0 || frame.cy <= 0 {
        return frame;
    }
    let scale = (frame.cx as f64 / width as f64).min(frame.cy as f64 / height as f64);
    let cx = (width as f64 * scale).round() as i64;
    let cy = (height as f64 * scale).round() as i64;
    Rect {
        x: frame.x + (frame.cx - cx) / 2,
        y: frame.y + (frame.cy - cy) / 2,
        cx,
        cy,
    }
}

fn write_picture(xml: &mut String, id: u32, ph: &PlaceholderShape, rel_id: &str, width: u32, height: u32) {
    let r = fit_within(ph.rect.unwrap_or(Rect::DEFAULT_BODY), width, height);
    let _ = write!(
        xml,
        concat!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="{name}"/>"#,
            r#"<p:cNvPicPr><a:picLocks noGrp="1" noChangeAspect="1"/></p:cNvPicPr>"#,
            r#"<p:nvPr>{ph}</p:nvPr></p:nvPicPr>"#,
            r#"<p:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
            r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
            r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#
        ),
        id = id,
        name = esc(&shape_name(ph, id)),
        ph = ph_element(ph),
        rel = esc(rel_id),
        x = r.x,
        y = r.y,
        cx = r.cx,
        cy = r.cy,
    );
}

fn write_chart_frame(xml: &mut String, id: u32, ph: &PlaceholderShape, rel_id: &str) {
    let frame = ph.rect.unwrap_or(Rect::DEFAULT_BODY);
    let _ = write!(
        xml,
        concat!(
            r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{id}" name="{name}"/>"#,
            r#"<p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr>"#,
            r#"<p:nvPr>{ph}</p:nvPr></p:nvGraphicFramePr>"#,
            r#"<p:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></p:xfrm>"#,
            r#"<a:graphic><a:graphicData uri="{uri}"><c:chart xmlns:c="{uri}" r:id="{rel}"/>"#,
            r#"</a:graphicData></a:graphic></p:graphicFrame>"#
        ),
        id = id,
        name = esc(&shape_name(ph, id)),
        ph = ph_element(ph),
        x = frame.x,
        y = frame.y,
        cx = frame.cx,
        cy = frame.cy,
        uri = CHART_URI,
        rel = esc(rel_id),
    );
}

fn write_table(xml: &mut String, id: u32, ph: &PlaceholderShape, headers: &[String], rows: &[Vec<String>]) {
    let cols = if headers.is_empty() {
        rows.iter().map(Vec::len).max().unwrap_or(0)
    } else {
        headers.len()
    };
    if cols == 0 {
        write_text_shape(xml, id, ph, None);
        return;
    }

    let frame = ph.rect.unwrap_or(Rect::DEFAULT_BODY);
    let row_count = rows.len() + usize::from(!headers.is_empty());
    let col_width = frame.cx / cols as i64;

    let _ = write!(
        xml,
        concat!(
            r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{id}" name="{name}"/>"#,
            r#"<p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr>"#,
            r#"<p:nvPr>{ph}</p:nvPr></p:nvGraphicFramePr>"#,
            r#"<p:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></p:xfrm>"#,
            r#"<a:graphic><a:graphicData uri="{uri}"><a:tbl>"#
        ),
        id = id,
        name = esc(&shape_name(ph, id)),
        ph = ph_element(ph),
        x = frame.x,
        y = frame.y,
        cx = col_width * cols as i64,
        cy = TABLE_ROW_HEIGHT * row_count as i64,
        uri = TABLE_URI,
    );
    if headers.is_empty() {
        xml.push_str(r#"<a:tblPr bandRow="1"/>"#);
    } else {
        xml.push_str(r#"<a:tblPr firstRow="1" bandRow="1"/>"#);
    }
    xml.push_str("<a:tblGrid>");
    for _ in 0..cols {
        let _ = write!(xml, r#"<a:gridCol w="{col_width}"/>"#);
    }
    xml.push_str("</a:tblGrid>");

    if !headers.is_empty() {
        write_row(xml, headers, cols);
    }
    for row in rows {
        write_row(xml, row, cols);
    }
    xml.push_str("</a:tbl></a:graphicData></a:graphic></p:graphicFrame>");
}

fn write_row(xml: &mut String, cells: &[String], cols: usize) {
    let _ = write!(xml, r#"<a:tr h="{TABLE_ROW_HEIGHT}">"#);
    for c in 0..cols {
        let text = cells.get(c).map(|s| sanitize(s)).unwrap_or_default();
        xml.push_str("<a:tc><a:txBody><a:bodyPr/><a:lstStyle/><a:p>");
        if text.is_empty() {
            xml.push_str(r#"<a:endParaRPr lang="en-US"/>"#);
        } else {
            let _ = write!(xml, r#"<a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r>"#, esc(&text));
        }
        xml.push_str("</a:p></a:txBody><a:tcPr/></a:tc>");
    }
    xml.push_str("</a:tr>");
}
