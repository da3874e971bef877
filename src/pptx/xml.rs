//! Small quick-xml helpers shared by the part readers and writers.

use quick_xml::events::BytesStart;

/// Value of the attribute whose qualified name is exactly `key`
/// (for example `b"name"` or `b"r:id"`).
pub(crate) fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .map(|a| unescape_lossy(&a.value))
}

/// Value of the first attribute with the given local name and a namespace
/// prefix, e.g. `r:id` or `r:embed` regardless of the prefix used.
pub(crate) fn prefixed_attr(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.prefix().is_some() && a.key.local_name().as_ref() == local)
        .map(|a| unescape_lossy(&a.value))
}

pub(crate) fn attr_i64(e: &BytesStart<'_>, key: &[u8]) -> Option<i64> {
    attr(e, key).and_then(|v| v.trim().parse().ok())
}

fn unescape_lossy(raw: &[u8]) -> String {
    let s = String::from_utf8_lossy(raw);
    match quick_xml::escape::unescape(&s) {
        Ok(v) => v.into_owned(),
        Err(_) => s.into_owned(),
    }
}

/// Escape text for element content or attribute values.
pub(crate) fn esc(s: &str) -> String {
    quick_xml::escape::escape(s).into_owned()
}

pub(crate) const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::Reader;
    use quick_xml::events::Event;

    fn first_start(xml: &str) -> BytesStart<'_> {
        let mut reader = Reader::from_str(xml);
        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => return e,
                Ok(Event::Eof) => panic!("no element"),
                Err(e) => panic!("{e}"),
                _ => {}
            }
        }
    }

    #[test]
    fn reads_plain_and_prefixed_attributes() {
        let e = first_start(r#"<p:sldId id="256" r:id="rId7"/>"#);
        assert_eq!(attr(&e, b"id").as_deref(), Some("256"));
        assert_eq!(prefixed_attr(&e, b"id").as_deref(), Some("rId7"));
        assert_eq!(attr_i64(&e, b"id"), Some(256));
    }

    #[test]
    fn unescapes_entity_references() {
        let e = first_start(r#"<p:cNvPr name="Q &amp; A"/>"#);
        assert_eq!(attr(&e, b"name").as_deref(), Some("Q & A"));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(esc("a < b & c"), "a &lt; b &amp; c");
    }
}
