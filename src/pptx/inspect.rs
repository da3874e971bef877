use quick_xml::Reader;
use quick_xml::events::Event;

use super::error::{PptxError, Result};
use super::layout::{presentation_part, read_rels};
use super::package::{Package, resolve_target};
use super::presentation::slide_parts;
use super::rels::REL_SLIDE_LAYOUT;

/// What a finished slide contains, for logging and verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideSummary {
    pub part: String,
    pub layout_part: Option<String>,
    /// Non-empty paragraphs in document order.
    pub paragraphs: Vec<String>,
    pub pictures: usize,
    pub tables: usize,
    pub charts: usize,
}

pub fn inspect_slides(pkg: &Package) -> Result<Vec<SlideSummary>> {
    let pres_part = presentation_part(pkg)?;
    slide_parts(pkg, &pres_part)?
        .into_iter()
        .map(|part| summarize(pkg, part))
        .collect()
}

fn summarize(pkg: &Package, part: String) -> Result<SlideSummary> {
    let layout_part = read_rels(pkg, &part)?
        .first_of_type(REL_SLIDE_LAYOUT)
        .map(|r| resolve_target(&part, &r.target));

    let mut reader = Reader::from_str(pkg.xml(&part)?);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut pictures = 0;
    let mut tables = 0;
    let mut charts = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"t" => in_text = true,
                b"pic" => pictures += 1,
                b"tbl" => tables += 1,
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"chart" => charts += 1,
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(|e| PptxError::xml(&part, e))?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if !current.is_empty() {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(PptxError::xml(&part, e)),
            _ => {}
        }
    }

    Ok(SlideSummary { part, layout_part, paragraphs, pictures, tables, charts })
}
