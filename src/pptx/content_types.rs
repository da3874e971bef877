use quick_xml::Reader;
use quick_xml::events::Event;

use super::error::{PptxError, Result};
use super::xml::{XML_DECL, attr, esc};

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

pub const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
pub const CT_PNG: &str = "image/png";
pub const CT_CHART: &str = "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";

const CT_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// The `[Content_Types].xml` part.
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut ct = Self::default();

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"Default" => {
                        if let (Some(ext), Some(t)) = (attr(&e, b"Extension"), attr(&e, b"ContentType")) {
                            ct.defaults.push((ext, t));
                        }
                    }
                    b"Override" => {
                        if let (Some(name), Some(t)) = (attr(&e, b"PartName"), attr(&e, b"ContentType")) {
                            ct.overrides.push((name, t));
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(PptxError::xml(CONTENT_TYPES_PART, e)),
                _ => {}
            }
        }

        Ok(ct)
    }

    pub fn has_default(&self, extension: &str) -> bool {
        self.defaults.iter().any(|(ext, _)| ext.eq_ignore_ascii_case(extension))
    }

    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        if !self.has_default(extension) {
            self.defaults.push((extension.to_string(), content_type.to_string()));
        }
    }

    /// Register an override for a package part (name without leading slash).
    pub fn add_override(&mut self, part: &str, content_type: &str) {
        let name = format!("/{}", part.trim_start_matches('/'));
        match self.overrides.iter_mut().find(|(n, _)| *n == name) {
            Some((_, t)) => *t = content_type.to_string(),
            None => self.overrides.push((name, content_type.to_string())),
        }
    }

    pub fn override_for(&self, part: &str) -> Option<&str> {
        let name = format!("/{}", part.trim_start_matches('/'));
        self.overrides
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, t)| t.as_str())
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(512 + self.overrides.len() * 140);
        xml.push_str(XML_DECL);
        xml.push_str(&format!(r#"<Types xmlns="{CT_NS}">"#));
        for (ext, t) in &self.defaults {
            xml.push_str(&format!(r#"<Default Extension="{}" ContentType="{}"/>"#, esc(ext), esc(t)));
        }
        for (name, t) in &self.overrides {
            xml.push_str(&format!(r#"<Override PartName="{}" ContentType="{}"/>"#, esc(name), esc(t)));
        }
        xml.push_str("</Types>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_defaults_and_overrides_once() {
        let mut ct = ContentTypes::parse(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#,
        )
        .unwrap();
        ct.add_default("png", CT_PNG);
        ct.add_default("PNG", CT_PNG);
        ct.add_override("ppt/slides/slide1.xml", CT_SLIDE);
        ct.add_override("/ppt/slides/slide1.xml", CT_SLIDE);

        let xml = ct.to_xml();
        assert_eq!(xml.matches("Extension=\"png\"").count(), 1);
        assert_eq!(xml.matches("/ppt/slides/slide1.xml").count(), 1);
        assert_eq!(ct.override_for("ppt/slides/slide1.xml"), Some(CT_SLIDE));
    }
}
