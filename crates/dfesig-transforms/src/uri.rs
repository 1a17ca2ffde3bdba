#![forbid(unsafe_code)]

//! URI resolution for XML-DSig references.
//!
//! Handles:
//! - Empty URI (""): the entire document minus comments
//! - Same-document references ("#id"): the subtree of the element with
//!   that ID, minus comments

use crate::pipeline::TransformData;
use dfesig_core::Error;
use dfesig_xml::{NodeSet, XmlDocument};

/// Resolve a reference URI against `doc` into the pipeline's initial input.
pub fn resolve_uri(doc: &XmlDocument, uri: &str) -> Result<TransformData, Error> {
    let parsed = doc.parse_doc()?;
    let node_set = if uri.is_empty() {
        NodeSet::all_without_comments(&parsed)
    } else if let Some(id) = uri.strip_prefix('#') {
        NodeSet::tree_without_comments(doc.find_by_id(&parsed, id)?)
    } else {
        return Err(Error::Transform(format!(
            "external URI not supported: {uri}"
        )));
    };
    Ok(TransformData::Xml {
        xml_text: doc.text().to_owned(),
        node_set: Some(node_set),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(xml: &str) -> XmlDocument {
        XmlDocument::parse(xml.to_owned()).unwrap()
    }

    #[test]
    fn test_same_document() {
        let d = doc(r#"<r><a Id="x"><!--c-->t</a><b/></r>"#);
        let bytes = resolve_uri(&d, "#x").unwrap().into_binary().unwrap();
        assert_eq!(bytes, br#"<a Id="x">t</a>"#);
    }

    #[test]
    fn test_empty_uri_is_whole_document() {
        let d = doc("<r><!--c--><a/></r>");
        let bytes = resolve_uri(&d, "").unwrap().into_binary().unwrap();
        assert_eq!(bytes, b"<r><a></a></r>");
    }

    #[test]
    fn test_missing_and_duplicate_ids() {
        let d = doc(r#"<r><a Id="x"/><b id="x"/></r>"#);
        assert!(matches!(
            resolve_uri(&d, "#y"),
            Err(Error::ReferenceTargetNotFound(_))
        ));
        assert!(matches!(
            resolve_uri(&d, "#x"),
            Err(Error::ReferenceTargetNotFound(_))
        ));
    }

    #[test]
    fn test_external_uri() {
        let d = doc("<r/>");
        assert!(matches!(
            resolve_uri(&d, "http://example.com/doc.xml"),
            Err(Error::Transform(_))
        ));
    }
}
