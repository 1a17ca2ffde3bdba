#![forbid(unsafe_code)]

//! XML Canonicalization (C14N) for dfesig.
//!
//! The signing pipeline only talks to the [`Canonicalizer`] trait. The
//! implementation shipped here is [`InclusiveC14n`], Canonical XML 1.0 with
//! and without comments.

pub mod escape;
pub mod inclusive;
pub mod render;

use dfesig_core::{algorithm, Error};
use dfesig_xml::NodeSet;

/// Serializes an XML node-set into its canonical byte form.
///
/// Implementations must be deterministic: the same document and node-set
/// always yield the same bytes.
pub trait Canonicalizer: Send + Sync {
    /// The algorithm URI written into `CanonicalizationMethod` / `Transform`.
    fn uri(&self) -> &'static str;

    /// Canonicalize `node_set` of `doc` (the whole document when `None`).
    fn canonicalize(
        &self,
        doc: &roxmltree::Document<'_>,
        node_set: Option<&NodeSet>,
    ) -> Result<Vec<u8>, Error>;
}

/// The canonicalization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum C14nMode {
    /// Canonical XML 1.0
    #[default]
    Inclusive,
    /// Canonical XML 1.0 with comments
    InclusiveWithComments,
}

impl C14nMode {
    /// Get the algorithm URI for this mode.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Inclusive => algorithm::C14N,
            Self::InclusiveWithComments => algorithm::C14N_WITH_COMMENTS,
        }
    }

    /// Parse a C14N mode from an algorithm URI.
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            algorithm::C14N => Some(Self::Inclusive),
            algorithm::C14N_WITH_COMMENTS => Some(Self::InclusiveWithComments),
            _ => None,
        }
    }

    pub fn with_comments(&self) -> bool {
        matches!(self, Self::InclusiveWithComments)
    }

    pub fn canonicalizer(&self) -> InclusiveC14n {
        InclusiveC14n {
            with_comments: self.with_comments(),
        }
    }
}

/// Canonical XML 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InclusiveC14n {
    pub with_comments: bool,
}

impl Canonicalizer for InclusiveC14n {
    fn uri(&self) -> &'static str {
        if self.with_comments {
            algorithm::C14N_WITH_COMMENTS
        } else {
            algorithm::C14N
        }
    }

    fn canonicalize(
        &self,
        doc: &roxmltree::Document<'_>,
        node_set: Option<&NodeSet>,
    ) -> Result<Vec<u8>, Error> {
        inclusive::canonicalize(doc, self.with_comments, node_set)
    }
}

/// Canonicalize XML text.
///
/// - `xml`: the raw XML text
/// - `mode`: which C14N variant to use
/// - `node_set`: optional node set (for document-subset canonicalization)
pub fn canonicalize(xml: &str, mode: C14nMode, node_set: Option<&NodeSet>) -> Result<Vec<u8>, Error> {
    let doc = dfesig_xml::parse(xml)?;
    mode.canonicalizer().canonicalize(&doc, node_set)
}
