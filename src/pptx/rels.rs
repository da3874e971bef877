use quick_xml::Reader;
use quick_xml::events::Event;

use super::error::{PptxError, Result};
use super::xml::{XML_DECL, attr, esc};

pub const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub const REL_THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
pub const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
pub const REL_CHART: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";

const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// Contents of one `.rels` part.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    rels: Vec<Relationship>,
}

impl Relationships {
    pub fn parse(xml: &str, part: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut rels = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"Relationship" => {
                    let (Some(id), Some(rel_type), Some(target)) =
                        (attr(&e, b"Id"), attr(&e, b"Type"), attr(&e, b"Target"))
                    else {
                        continue;
                    };
                    let external = attr(&e, b"TargetMode").is_some_and(|m| m == "External");
                    rels.push(Relationship { id, rel_type, target, external });
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(PptxError::xml(part, e)),
                _ => {}
            }
        }

        Ok(Self { rels })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.iter()
    }

    pub fn by_id(&self, id: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.id == id)
    }

    pub fn first_of_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.rels.iter().find(|r| r.rel_type == rel_type)
    }

    /// Add an internal relationship and return its new `rIdN`.
    pub fn add(&mut self, rel_type: &str, target: &str) -> String {
        let next = self
            .rels
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let id = format!("rId{next}");
        self.rels.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external: false,
        });
        id
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.rels.len() * 160);
        xml.push_str(XML_DECL);
        xml.push_str(&format!(r#"<Relationships xmlns="{RELS_NS}">"#));
        for r in &self.rels {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}""#,
                esc(&r.id),
                esc(&r.rel_type),
                esc(&r.target)
            ));
            if r.external {
                xml.push_str(r#" TargetMode="External""#);
            }
            xml.push_str("/>");
        }
        xml.push_str("</Relationships>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/>
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
  <Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn parses_and_allocates_ids() {
        let mut rels = Relationships::parse(SAMPLE, "ppt/_rels/presentation.xml.rels").unwrap();
        assert_eq!(rels.iter().count(), 3);
        assert_eq!(
            rels.first_of_type(REL_SLIDE_MASTER).map(|r| r.target.as_str()),
            Some("slideMasters/slideMaster1.xml")
        );
        assert!(rels.by_id("rId9").unwrap().external);

        let id = rels.add(REL_SLIDE, "slides/slide1.xml");
        assert_eq!(id, "rId10");
    }

    #[test]
    fn serializes_back() {
        let rels = Relationships::parse(SAMPLE, "x").unwrap();
        let again = Relationships::parse(&rels.to_xml(), "x").unwrap();
        assert_eq!(again.iter().count(), 3);
        assert!(rels.to_xml().contains(r#"TargetMode="External""#));
    }
}
