#![forbid(unsafe_code)]

//! XML document abstraction for dfesig.
//!
//! Provides an owned document over `roxmltree` with ID lookup, plus the
//! `NodeSet` used by canonicalization and the enveloped-signature transform.

pub mod document;
pub mod nodeset;

pub use document::XmlDocument;
pub use nodeset::NodeSet;

/// Return roxmltree parsing options that allow DTD.
///
/// roxmltree never expands external entities, so accepting an internal
/// DTD subset is safe.
pub fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    }
}

/// Parse XML text with [`parsing_options`], mapping errors into the crate error.
pub fn parse(text: &str) -> Result<roxmltree::Document<'_>, dfesig_core::Error> {
    roxmltree::Document::parse_with_options(text, parsing_options())
        .map_err(|e| dfesig_core::Error::XmlParse(e.to_string()))
}
