#![forbid(unsafe_code)]

//! `SignedInfo` construction and canonicalization.

use crate::model::{AlgorithmIdentifier, Reference, SignedInfo};
use dfesig_c14n::{Canonicalizer, InclusiveC14n};
use dfesig_core::{algorithm, ns, Error};
use dfesig_xml::NodeSet;
use serde::Serialize;

/// `SignedInfo` alone inside its `Signature` parent, which supplies the
/// XML-DSig default namespace.
#[derive(Serialize)]
#[serde(rename = "Signature")]
struct Detached<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: &'a str,
    #[serde(rename = "SignedInfo")]
    signed_info: &'a SignedInfo,
}

impl SignedInfo {
    /// `SignedInfo` with Canonical XML 1.0 as its canonicalization method.
    pub fn new(signature_method: &str, reference: Reference) -> Self {
        Self {
            canonicalization_method: AlgorithmIdentifier::new(algorithm::C14N),
            signature_method: AlgorithmIdentifier::new(signature_method),
            reference,
        }
    }

    /// The octets that get signed: this `SignedInfo` in canonical form, as
    /// a verifier sees it inside the final `Signature`.
    pub fn canonicalize(&self) -> Result<Vec<u8>, Error> {
        let xml = quick_xml::se::to_string(&Detached {
            xmlns: ns::DSIG,
            signed_info: self,
        })
        .map_err(|e| Error::Serialization(e.to_string()))?;

        let doc = dfesig_xml::parse(&xml)?;
        let node = dfesig_xml::document::find_element(&doc, ns::DSIG, ns::node::SIGNED_INFO)
            .ok_or_else(|| Error::Canonicalization("SignedInfo not rendered".into()))?;
        canonicalize_node(&doc, node, &self.canonicalization_method.algorithm)
    }
}

/// Canonicalize a `SignedInfo` element where it sits in `doc`, so the
/// namespaces and `xml:*` attributes in scope there are included.
pub(crate) fn canonicalize_node(
    doc: &roxmltree::Document<'_>,
    node: roxmltree::Node<'_, '_>,
    canonicalization_method: &str,
) -> Result<Vec<u8>, Error> {
    let canonicalizer = InclusiveC14n::default();
    if canonicalizer.uri() != canonicalization_method {
        return Err(Error::UnsupportedAlgorithm(format!(
            "canonicalization method: {canonicalization_method}"
        )));
    }
    canonicalizer.canonicalize(doc, Some(&NodeSet::tree_without_comments(node)))
}
