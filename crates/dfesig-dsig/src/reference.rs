#![forbid(unsafe_code)]

//! Reference Builder: select the identified element, run the transform
//! chain, digest the result.

use crate::model::{AlgorithmIdentifier, Reference, Transforms};
use dfesig_core::{algorithm, Error};
use dfesig_transforms::{uri, TransformPipeline};
use dfesig_xml::XmlDocument;

/// The transform chain applied to every reference, in order.
pub const TRANSFORMS: [&str; 2] = [algorithm::ENVELOPED_SIGNATURE, algorithm::C14N];

impl Reference {
    /// Build the reference to the element carrying `id`.
    pub fn build(doc: &XmlDocument, id: &str, digest_method: &str) -> Result<Self, Error> {
        let digest_value = Self::compute_digest(doc, id, digest_method)?;
        Ok(Self {
            uri: format!("#{id}"),
            transforms: Transforms {
                transform: TRANSFORMS.iter().map(|t| AlgorithmIdentifier::new(*t)).collect(),
            },
            digest_method: AlgorithmIdentifier::new(digest_method),
            digest_value,
        })
    }

    /// Digest of the element carrying `id` after the transform chain.
    pub fn compute_digest(doc: &XmlDocument, id: &str, digest_method: &str) -> Result<Vec<u8>, Error> {
        let canonical = canonical_reference(doc, id)?;
        tracing::debug!(id, bytes = canonical.len(), "reference canonicalized");
        dfesig_crypto::digest::digest(digest_method, &canonical)
    }
}

/// The octets a verifier digests for `#id`.
pub fn canonical_reference(doc: &XmlDocument, id: &str) -> Result<Vec<u8>, Error> {
    if id.is_empty() {
        return Err(Error::MissingIdentifier);
    }
    let input = uri::resolve_uri(doc, &format!("#{id}"))?;
    TransformPipeline::from_uris(&TRANSFORMS)?
        .execute(input)?
        .into_binary()
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    const NFE: &str = include_str!("../../../test-data/nfe.xml");
    const NFE_ID: &str = "NFe35240114200166000187550010000000071123456789";

    fn nfe() -> XmlDocument {
        XmlDocument::parse(NFE.to_owned()).unwrap()
    }

    #[test]
    fn test_golden_digest() {
        let reference = Reference::build(&nfe(), NFE_ID, algorithm::SHA1).unwrap();
        assert_eq!(reference.uri, format!("#{NFE_ID}"));
        assert_eq!(reference.digest_value_base64(), "Ng5ajOJ+E3C1xWdpOdu8/AafERk=");
        assert_eq!(reference.transform_uris(), TRANSFORMS.to_vec());
        assert_eq!(reference.digest_method.algorithm, algorithm::SHA1);
    }

    #[test]
    fn test_canonical_form() {
        let canonical = String::from_utf8(canonical_reference(&nfe(), NFE_ID).unwrap()).unwrap();
        assert!(canonical.starts_with(
            r#"<infNFe xmlns="http://www.portalfiscal.inf.br/nfe" Id="NFe35240114200166000187550010000000071123456789" versao="4.00">"#
        ));
        assert!(!canonical.contains("comentario"));
        assert!(canonical.contains("<IE></IE>"));
    }

    #[test]
    fn test_digest_ignores_outside_content() {
        let moved = NFE.replace("</NFe>", "<extra>outside</extra></NFe>");
        let moved = XmlDocument::parse(moved).unwrap();
        assert_eq!(
            Reference::compute_digest(&moved, NFE_ID, algorithm::SHA1).unwrap(),
            Reference::compute_digest(&nfe(), NFE_ID, algorithm::SHA1).unwrap()
        );
    }

    #[test]
    fn test_inner_signature_excluded() {
        let with_sig = NFE.replace(
            "</emit>",
            r#"</emit><Signature xmlns="http://www.w3.org/2000/09/xmldsig#"><SignatureValue>AA==</SignatureValue></Signature>"#,
        );
        let with_sig = XmlDocument::parse(with_sig).unwrap();
        let digest = Reference::compute_digest(&with_sig, NFE_ID, algorithm::SHA1).unwrap();
        assert_eq!(
            base64::engine::general_purpose::STANDARD.encode(digest),
            "Ng5ajOJ+E3C1xWdpOdu8/AafERk="
        );
    }

    #[test]
    fn test_sha256_digest_length() {
        let digest = Reference::compute_digest(&nfe(), NFE_ID, algorithm::SHA256).unwrap();
        assert_eq!(digest.len(), 32);
    }

    #[test]
    fn test_errors() {
        let doc = nfe();
        assert!(matches!(
            Reference::build(&doc, "NFe0", algorithm::SHA1),
            Err(Error::ReferenceTargetNotFound(_))
        ));
        assert!(matches!(
            Reference::build(&doc, "", algorithm::SHA1),
            Err(Error::MissingIdentifier)
        ));
        let err = Reference::build(&doc, NFE_ID, "urn:unknown-digest").unwrap_err();
        assert!(err.is_crypto_primitive());
    }
}
