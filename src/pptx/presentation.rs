use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use super::error::{PptxError, Result};
use super::layout::{list_rids, read_rels};
use super::package::{Package, resolve_target};
use super::xml::attr_i64;

const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Children of `p:presentation` that precede `p:sldIdLst` in schema order.
fn precedes_slide_list(local: &[u8]) -> bool {
    matches!(local, b"sldMasterIdLst" | b"notesMasterIdLst" | b"handoutMasterIdLst" | b"sldIdLst")
}

/// Slide parts in presentation order.
pub fn slide_parts(pkg: &Package, pres_part: &str) -> Result<Vec<String>> {
    let rels = read_rels(pkg, pres_part)?;
    let rids = list_rids(pkg.xml(pres_part)?, pres_part, b"sldId")?;
    rids.iter()
        .map(|rid| {
            rels.by_id(rid)
                .map(|r| resolve_target(pres_part, &r.target))
                .ok_or_else(|| PptxError::xml(pres_part, format!("dangling slide relationship {rid}")))
        })
        .collect()
}

fn existing_slide_ids(xml: &str, part: &str) -> Result<Vec<i64>> {
    let mut reader = Reader::from_str(xml);
    let mut ids = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sldId" => {
                if let Some(id) = attr_i64(&e, b"id") {
                    ids.push(id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(PptxError::xml(part, e)),
            _ => {}
        }
    }
    Ok(ids)
}

/// Rewrite `presentation.xml` with `p:sldId` entries appended for the given
/// relationship ids. Creates `p:sldIdLst` when the template has none.
pub fn append_slide_ids(xml: &str, part: &str, rids: &[String]) -> Result<String> {
    if rids.is_empty() {
        return Ok(xml.to_string());
    }

    let first_id = existing_slide_ids(xml, part)?.into_iter().max().unwrap_or(255).max(255) + 1;
    let entries: Vec<(i64, &str)> = rids
        .iter()
        .enumerate()
        .map(|(i, rid)| (first_id + i as i64, rid.as_str()))
        .collect();

    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + entries.len() * 48));
    let mut depth = 0usize;
    let mut prefix = String::new();
    let mut r_prefix = String::from("r");
    let mut done = false;

    loop {
        let event = reader.read_event().map_err(|e| PptxError::xml(part, e))?;
        match &event {
            Event::Start(e) => {
                if depth == 0 {
                    (prefix, r_prefix) = root_prefixes(e);
                } else if depth == 1 && !done && !precedes_slide_list(e.local_name().as_ref()) {
                    write_list(&mut writer, part, &prefix, &r_prefix, &entries)?;
                    done = true;
                }
                depth += 1;
            }
            Event::Empty(e) if depth == 1 && !done => {
                let local = e.local_name();
                if local.as_ref() == b"sldIdLst" {
                    write_list(&mut writer, part, &prefix, &r_prefix, &entries)?;
                    done = true;
                    continue;
                }
                if !precedes_slide_list(local.as_ref()) {
                    write_list(&mut writer, part, &prefix, &r_prefix, &entries)?;
                    done = true;
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if !done && depth == 1 && e.local_name().as_ref() == b"sldIdLst" {
                    write_entries(&mut writer, part, &prefix, &r_prefix, &entries)?;
                    done = true;
                } else if !done && depth == 0 {
                    write_list(&mut writer, part, &prefix, &r_prefix, &entries)?;
                    done = true;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        writer.write_event(event).map_err(|e| PptxError::xml(part, e))?;
    }

    String::from_utf8(writer.into_inner()).map_err(|e| PptxError::xml(part, e))
}

/// Element prefix of the root (`p:`) and the prefix bound to the
/// relationships namespace.
fn root_prefixes(root: &BytesStart<'_>) -> (String, String) {
    let name = String::from_utf8_lossy(root.name().as_ref()).into_owned();
    let prefix = match name.split_once(':') {
        Some((p, _)) => format!("{p}:"),
        None => String::new(),
    };
    let r_prefix = root
        .attributes()
        .flatten()
        .find(|a| a.value.as_ref() == REL_NS.as_bytes())
        .and_then(|a| {
            let key = String::from_utf8_lossy(a.key.as_ref()).into_owned();
            key.strip_prefix("xmlns:").map(str::to_string)
        })
        .unwrap_or_else(|| "r".to_string());
    (prefix, r_prefix)
}

fn write_list(
    writer: &mut Writer<Vec<u8>>,
    part: &str,
    prefix: &str,
    r_prefix: &str,
    entries: &[(i64, &str)],
) -> Result<()> {
    let tag = format!("{prefix}sldIdLst");
    writer
        .write_event(Event::Start(BytesStart::new(tag.as_str())))
        .map_err(|e| PptxError::xml(part, e))?;
    write_entries(writer, part, prefix, r_prefix, entries)?;
    writer
        .write_event(Event::End(BytesEnd::new(tag.as_str())))
        .map_err(|e| PptxError::xml(part, e))?;
    Ok(())
}

fn write_entries(
    writer: &mut Writer<Vec<u8>>,
    part: &str,
    prefix: &str,
    r_prefix: &str,
    entries: &[(i64, &str)],
) -> Result<()> {
    let rid_key = format!("{r_prefix}:id");
    for (id, rid) in entries {
        let id = id.to_string();
        let mut el = BytesStart::new(format!("{prefix}sldId"));
        el.push_attribute(("id", id.as_str()));
        el.push_attribute((rid_key.as_str(), *rid));
        writer
            .write_event(Event::Empty(el))
            .map_err(|e| PptxError::xml(part, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#;

    fn ids(xml: &str) -> Vec<i64> {
        existing_slide_ids(xml, "p").unwrap()
    }

    #[test]
    fn creates_slide_list_before_slide_size() {
        let xml = format!(r#"{HEAD}<p:sldSz cx="9144000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#);
        let out = append_slide_ids(&xml, "p", &["rId5".into(), "rId6".into()]).unwrap();
        assert_eq!(ids(&out), vec![256, 257]);
        let list = out.find("<p:sldIdLst>").unwrap();
        let size = out.find("<p:sldSz").unwrap();
        let master = out.find("</p:sldMasterIdLst>").unwrap();
        assert!(master < list && list < size);
        assert!(out.contains(r#"<p:sldId id="256" r:id="rId5"/>"#));
    }

    #[test]
    fn appends_to_existing_list() {
        let xml = format!(
            r#"{HEAD}<p:sldIdLst><p:sldId id="300" r:id="rId2"/></p:sldIdLst><p:sldSz cx="1" cy="1"/></p:presentation>"#
        );
        let out = append_slide_ids(&xml, "p", &["rId9".into()]).unwrap();
        assert_eq!(ids(&out), vec![300, 301]);
        assert_eq!(out.matches("sldIdLst>").count(), 2);
    }

    #[test]
    fn expands_empty_list_element() {
        let xml = format!(r#"{HEAD}<p:sldIdLst/><p:sldSz cx="1" cy="1"/></p:presentation>"#);
        let out = append_slide_ids(&xml, "p", &["rId3".into()]).unwrap();
        assert!(!out.contains("<p:sldIdLst/>"));
        assert_eq!(ids(&out), vec![256]);
    }

    #[test]
    fn no_slides_leaves_xml_untouched() {
        let xml = format!("{HEAD}</p:presentation>");
        assert_eq!(append_slide_ids(&xml, "p", &[]).unwrap(), xml);
    }
}
