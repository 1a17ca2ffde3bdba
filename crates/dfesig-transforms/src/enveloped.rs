#![forbid(unsafe_code)]

//! Enveloped signature transform.
//!
//! Removes every `ds:Signature` element, with its descendants, from the
//! node-set being signed, so that a signature placed inside the signed
//! content does not sign itself.

use crate::pipeline::{Transform, TransformData};
use dfesig_core::{algorithm, ns, Error};
use dfesig_xml::NodeSet;

/// The enveloped signature transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopedSignatureTransform;

impl Transform for EnvelopedSignatureTransform {
    fn uri(&self) -> &'static str {
        algorithm::ENVELOPED_SIGNATURE
    }

    fn execute(&self, input: TransformData) -> Result<TransformData, Error> {
        match input {
            TransformData::Xml { xml_text, node_set } => {
                let doc = dfesig_xml::parse(&xml_text)?;
                let mut set = node_set.unwrap_or_else(|| NodeSet::all(&doc));

                let signatures: Vec<_> = doc
                    .descendants()
                    .filter(|n| {
                        set.contains(n)
                            && dfesig_xml::document::is_element(n, ns::DSIG, ns::node::SIGNATURE)
                    })
                    .collect();
                let removed: usize = signatures
                    .into_iter()
                    .map(|sig| set.remove_subtree(sig))
                    .sum();
                tracing::debug!(removed, "enveloped-signature transform");

                Ok(TransformData::Xml {
                    xml_text,
                    node_set: Some(set),
                })
            }
            TransformData::Binary(_) => Err(Error::Transform(
                "enveloped-signature transform requires XML input".into(),
            )),
        }
    }
}
