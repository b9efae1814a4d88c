//! Fragment extraction.
//!
//! The fragment is returned as the verbatim slice of the source document,
//! from the opening tag of the first matching element to its closing tag, so
//! the conversion service sees exactly what the corpus contains.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use roundtrip_model::Selector;

use crate::error::{IngestError, Result};

/// Namespace declaration that the conversion service does not expect on the
/// fragment root.
pub const TEI_NAMESPACE_DECLARATION: &str = " xmlns=\"http://www.tei-c.org/ns/1.0\"";

/// Read `path` and extract the first element matching `selector`.
pub fn read_fragment(path: &Path, selector: &Selector) -> Result<Option<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    extract_fragment(&content, selector)
}

/// Extract the first element matching `selector` from `xml`.
///
/// The whole document is parsed, so a malformed document is an error even
/// when the fragment itself is well formed. Returns `Ok(None)` when no
/// element matches.
pub fn extract_fragment(xml: &str, selector: &Selector) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    let mut fragment = None;

    loop {
        let start = offset(&reader)?;
        let event = reader.read_event().map_err(|e| xml_error(&reader, &e))?;
        match event {
            Event::Start(element) if fragment.is_none() && is_match(&element, selector) => {
                let end_name = element.name().as_ref().to_vec();
                reader
                    .read_to_end(QName(&end_name))
                    .map_err(|e| xml_error(&reader, &e))?;
                let end = offset(&reader)?;
                fragment = Some(xml[start..end].to_string());
            }
            Event::Empty(element) if fragment.is_none() && is_match(&element, selector) => {
                let end = offset(&reader)?;
                fragment = Some(xml[start..end].to_string());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(fragment)
}

/// Remove the first occurrence of the TEI namespace declaration.
pub fn strip_namespace_declaration(fragment: &str) -> String {
    fragment.replacen(TEI_NAMESPACE_DECLARATION, "", 1)
}

fn is_match(element: &BytesStart<'_>, selector: &Selector) -> bool {
    let local_name = element.local_name();
    let Ok(name) = std::str::from_utf8(local_name.as_ref()) else {
        return false;
    };
    if name != selector.element() {
        return false;
    }

    let attributes: Vec<(String, String)> = element
        .attributes()
        .flatten()
        .map(|attr| {
            (
                String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned(),
                String::from_utf8_lossy(&attr.value).into_owned(),
            )
        })
        .collect();
    selector.matches(
        name,
        attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str())),
    )
}

fn offset(reader: &Reader<&[u8]>) -> Result<usize> {
    let position = reader.buffer_position();
    usize::try_from(position).map_err(|_| IngestError::Xml {
        position,
        message: "document too large".to_string(),
    })
}

fn xml_error(reader: &Reader<&[u8]>, error: &quick_xml::Error) -> IngestError {
    IngestError::Xml {
        position: reader.error_position(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EDITION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <text>
    <body>
      <head xml:lang="en"/>
      <div xml:lang="grc" type="edition" xml:space="preserve">
        <ab>
          <lb n="1"/>τῶι <expan>ἀδελφῶι</expan>
          <div type="textpart"><ab/></div>
        </ab>
      </div>
      <div type="translation"><p>to the brother</p></div>
    </body>
  </text>
</TEI>"#;

    #[test]
    fn extracts_verbatim_edition_div() {
        let selector = Selector::parse(r#"div[type="edition"]"#).unwrap();
        let fragment = extract_fragment(EDITION, &selector).unwrap().unwrap();
        assert!(fragment.starts_with(r#"<div xml:lang="grc" type="edition""#));
        assert!(fragment.ends_with("</div>"));
        assert!(fragment.contains(r#"<div type="textpart"><ab/></div>"#));
        assert!(fragment.contains("τῶι <expan>ἀδελφῶι</expan>"));
        assert!(!fragment.contains("translation"));
    }

    #[test]
    fn extracts_body_including_nested_divs() {
        let selector = Selector::parse("body").unwrap();
        let fragment = extract_fragment(EDITION, &selector).unwrap().unwrap();
        assert!(fragment.starts_with("<body>"));
        assert!(fragment.ends_with("</body>"));
        assert!(fragment.contains("to the brother"));
    }

    #[test]
    fn empty_element_is_a_fragment() {
        let selector = Selector::parse("body").unwrap();
        let fragment = extract_fragment("<TEI><text><body/></text></TEI>", &selector).unwrap();
        assert_eq!(fragment.as_deref(), Some("<body/>"));
    }

    #[test]
    fn missing_fragment_is_none() {
        let selector = Selector::parse(r#"div[type="commentary"]"#).unwrap();
        assert!(extract_fragment(EDITION, &selector).unwrap().is_none());
    }

    #[test]
    fn malformed_document_is_an_error() {
        let selector = Selector::parse("body").unwrap();
        let err = extract_fragment("<TEI><body></TEI>", &selector).unwrap_err();
        assert!(matches!(err, IngestError::Xml { .. }));
    }

    #[test]
    fn strips_only_first_namespace_declaration() {
        let fragment = r#"<div xmlns="http://www.tei-c.org/ns/1.0" type="edition"><ab xmlns="http://www.tei-c.org/ns/1.0"/></div>"#;
        assert_eq!(
            strip_namespace_declaration(fragment),
            r#"<div type="edition"><ab xmlns="http://www.tei-c.org/ns/1.0"/></div>"#
        );
    }
}
