#![forbid(unsafe_code)]

//! Placing a signature into the signed document.
//!
//! Fiscal documents carry the signature as the last child of the signed
//! element's parent:
//!
//! ```xml
//! <NFe xmlns="http://www.portalfiscal.inf.br/nfe">
//!   <infNFe Id="NFe3524...">...</infNFe>
//!   <Signature xmlns="http://www.w3.org/2000/09/xmldsig#">...</Signature>
//! </NFe>
//! ```

use crate::model::{KeyInfo, Signature};
use crate::normalize;
use crate::options::SignatureOptions;
use crate::sign::{build_signed_info, prepare_document, sign_canonical};
use crate::signed_info::canonicalize_node;
use dfesig_core::{ns, Error};
use dfesig_keys::Certificate;
use dfesig_xml::document::{find_child_element, is_element};
use dfesig_xml::XmlDocument;
use std::ops::Range;

/// Sign the element identified by `id` and return the document with the
/// `Signature` appended to that element's parent (or inside the element
/// itself when it is the document element).
///
/// A `Signature` already present in that position is replaced. The signed
/// octets are `SignedInfo` canonicalized inside the returned document, so
/// namespaces declared on the ancestors are accounted for.
#[tracing::instrument(skip_all, fields(id = id.unwrap_or_default()))]
pub fn sign_document(
    xml: &str,
    id: Option<&str>,
    certificate: &Certificate,
    options: &SignatureOptions,
) -> Result<String, Error> {
    let id = id.filter(|id| !id.is_empty()).ok_or(Error::MissingIdentifier)?;

    let text = if options.remove_accents {
        normalize::remove_accents(xml)
    } else {
        xml.to_owned()
    };
    let text = strip_previous_signatures(text, id, options)?;
    let doc = prepare_document(text, options)?;

    let signed_info = build_signed_info(&doc, id, options)?;
    let key_info = KeyInfo::from_certificate(certificate);

    // Same SignedInfo, empty SignatureValue.
    let template = Signature::new(signed_info.clone(), Vec::new(), key_info.clone());
    let templated = prepare_document(insert_signature(&doc, id, &template.to_xml()?)?, options)?;
    let canonical = {
        let parsed = templated.parse_doc()?;
        let node = embedded_signed_info(&templated, &parsed, id)?;
        canonicalize_node(&parsed, node, &signed_info.canonicalization_method.algorithm)?
    };

    let signature_value = sign_canonical(certificate, &options.signature_method, &canonical)?;
    tracing::debug!(
        signature_method = %options.signature_method,
        digest_method = %options.digest_method,
        "SignedInfo signed in place"
    );

    let signature = Signature::new(signed_info, signature_value, key_info);
    insert_signature(&doc, id, &signature.to_xml()?)
}

/// The element that receives the signature for `target`.
fn signature_container<'a, 'input>(target: roxmltree::Node<'a, 'input>) -> roxmltree::Node<'a, 'input> {
    target.parent_element().unwrap_or(target)
}

/// Append `signature_xml` as the last child of the signature container.
fn insert_signature(doc: &XmlDocument, id: &str, signature_xml: &str) -> Result<String, Error> {
    let parsed = doc.parse_doc()?;
    let container = signature_container(doc.find_by_id(&parsed, id)?);

    let source = doc.text();
    let range = container.range();
    let element = &source[range.clone()];
    let mut out = String::with_capacity(source.len() + signature_xml.len());
    if element.ends_with("/>") {
        // Only possible when the container is the signed element itself.
        let qname = dfesig_xml::document::qualified_name(&container);
        out.push_str(&source[..range.end - 2]);
        out.push('>');
        out.push_str(signature_xml);
        out.push_str(&format!("</{qname}>"));
    } else {
        let close = element.rfind("</").ok_or_else(|| {
            Error::XmlParse("cannot locate the closing tag of the signature container".into())
        })?;
        let insert_at = range.start + close;
        out.push_str(&source[..insert_at]);
        out.push_str(signature_xml);
        out.push_str(&source[insert_at..range.end]);
    }
    out.push_str(&source[range.end..]);
    Ok(out)
}

/// `SignedInfo` of the signature just appended to the container.
fn embedded_signed_info<'a, 'input>(
    doc: &XmlDocument,
    parsed: &'a roxmltree::Document<'input>,
    id: &str,
) -> Result<roxmltree::Node<'a, 'input>, Error> {
    signature_container(doc.find_by_id(parsed, id)?)
        .children()
        .filter(|n| is_element(n, ns::DSIG, ns::node::SIGNATURE))
        .last()
        .and_then(|sig| find_child_element(sig, ns::DSIG, ns::node::SIGNED_INFO))
        .ok_or_else(|| Error::Canonicalization("SignedInfo missing from the signed document".into()))
}

/// Remove `ds:Signature` children of the signature container.
fn strip_previous_signatures(
    text: String,
    id: &str,
    options: &SignatureOptions,
) -> Result<String, Error> {
    let doc = prepare_document(text, options)?;
    let parsed = doc.parse_doc()?;
    let container = signature_container(doc.find_by_id(&parsed, id)?);

    let ranges: Vec<Range<usize>> = container
        .children()
        .filter(|n| is_element(n, ns::DSIG, ns::node::SIGNATURE))
        .map(|n| n.range())
        .collect();
    if ranges.is_empty() {
        return Ok(doc.text().to_owned());
    }
    tracing::debug!(count = ranges.len(), "replacing existing signature");

    let source = doc.text();
    let mut out = String::with_capacity(source.len());
    let mut pos = 0;
    for range in ranges {
        out.push_str(&source[pos..range.start]);
        pos = range.end;
    }
    out.push_str(&source[pos..]);
    Ok(out)
}
