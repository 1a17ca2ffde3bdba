#![forbid(unsafe_code)]

//! Signature Assembler.

use crate::model::{KeyInfo, Reference, Signature, SignedInfo};
use crate::normalize;
use crate::options::SignatureOptions;
use crate::serializer::XmlSerializer;
use dfesig_core::Error;
use dfesig_keys::Certificate;
use dfesig_xml::XmlDocument;

/// Produce an enveloped XML-DSig signature over the element of `content`
/// whose ID attribute is `id`.
///
/// `content` is only read. The returned value is built fresh on every call
/// and has been through an XML round trip, so it matches exactly what a
/// verifier will parse.
///
/// `SignedInfo` is canonicalized on its own, under a bare `Signature`
/// parent. When the signature is embedded below elements that declare
/// prefixed namespaces or `xml:*` attributes, a verifier sees different
/// octets; [`crate::sign_document`] signs in place and covers that case.
///
/// Errors:
/// - [`Error::MissingIdentifier`] if `id` is `None` or empty; nothing else
///   runs in that case
/// - [`Error::Serialization`] if `content` cannot be written as XML
/// - [`Error::ReferenceTargetNotFound`] if `id` matches no element, or
///   more than one
/// - [`Error::NoPrivateKey`] if `certificate` has no private key
/// - [`Error::UnsupportedAlgorithm`] / [`Error::Crypto`] from the digest or
///   signature primitives
#[tracing::instrument(skip_all, fields(id = id.unwrap_or_default()))]
pub fn sign<S: XmlSerializer + ?Sized>(
    content: &S,
    id: Option<&str>,
    certificate: &Certificate,
    options: &SignatureOptions,
) -> Result<Signature, Error> {
    let id = id.filter(|id| !id.is_empty()).ok_or(Error::MissingIdentifier)?;

    let mut xml = content.to_xml()?;
    if options.remove_accents {
        xml = normalize::remove_accents(&xml);
    }
    let doc = prepare_document(xml, options)?;

    let signed_info = build_signed_info(&doc, id, options)?;
    let canonical = signed_info.canonicalize()?;
    let signature_value = sign_canonical(certificate, &options.signature_method, &canonical)?;
    tracing::debug!(
        signature_method = %options.signature_method,
        digest_method = %options.digest_method,
        "SignedInfo signed"
    );

    let assembled = Signature::new(
        signed_info,
        signature_value,
        KeyInfo::from_certificate(certificate),
    );
    Signature::from_xml(&assembled.to_xml()?)
}

pub(crate) fn prepare_document(xml: String, options: &SignatureOptions) -> Result<XmlDocument, Error> {
    let mut doc = XmlDocument::parse(xml)?;
    for attr in &options.id_attrs {
        doc.add_id_attr(attr);
    }
    Ok(doc)
}

pub(crate) fn build_signed_info(
    doc: &XmlDocument,
    id: &str,
    options: &SignatureOptions,
) -> Result<SignedInfo, Error> {
    let reference = Reference::build(doc, id, &options.digest_method)?;
    Ok(SignedInfo::new(&options.signature_method, reference))
}

/// Sign canonical `SignedInfo` octets with the certificate's private key.
pub(crate) fn sign_canonical(
    certificate: &Certificate,
    signature_method: &str,
    canonical: &[u8],
) -> Result<Vec<u8>, Error> {
    let key = certificate.private_key().ok_or(Error::NoPrivateKey)?;
    dfesig_crypto::sign::from_uri(signature_method)?.sign(key, canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::SerdeXml;
    use dfesig_core::algorithm;
    use serde::Serialize;
    use signature::Verifier;

    const NFE: &str = include_str!("../../../test-data/nfe.xml");
    const NFE_ID: &str = "NFe35240114200166000187550010000000071123456789";
    const GOLDEN_SIGNATURE: &str = "QZgAhNVc0s+T8Rj/VU/Er2A3fQn3+6eSrjzaKDWU03wL4a+aszOLhJWzNEiqi/ciA4x4Ozolt1PU3OectrnonShG+9xOU1kDFGbPcvRM8gNwbmXEWQQhPlQgLL8vN+PT7+yxdNNIH0znkDt+zUwIerAfi41dS7kInciQ6jjK36pNcXeTJTkHcXVKBJPqScqoDZ3RcAMDc6gILK0h6eeBtz34I1iq9VCIDhDGx3UHLIUBjmelfwNFGIZjwDKKaFFUZ9oAMFwV+67tZdoGrm7bEVurmEBiqz9uoXFGnB1tUCVAjLibVTBbnFOQMctsjkcT0Q9ufBT9aRlrwntrbifwEA==";

    fn signer() -> Certificate {
        dfesig_keys::loader::load_certificate(
            include_bytes!("../../../test-data/signer-bundle.pem"),
            None,
        )
        .unwrap()
    }

    fn public_only() -> Certificate {
        Certificate::from_der(include_bytes!("../../../test-data/signer.der")).unwrap()
    }

    #[test]
    fn test_golden_signature() {
        let sig = sign(NFE, Some(NFE_ID), &signer(), &SignatureOptions::default()).unwrap();
        assert_eq!(sig.digest_value_base64(), "Ng5ajOJ+E3C1xWdpOdu8/AafERk=");
        assert_eq!(sig.signature_value_base64(), GOLDEN_SIGNATURE);
        assert_eq!(sig.signed_info.reference.uri, format!("#{NFE_ID}"));
        assert_eq!(sig.signed_info.canonicalization_method.algorithm, algorithm::C14N);
        assert_eq!(sig.signed_info.signature_method.algorithm, algorithm::RSA_SHA1);
        assert_eq!(sig.certificate_der(), signer().der());
    }

    #[test]
    fn test_signature_verifies_over_canonical_signed_info() {
        let cert = signer();
        let sig = sign(NFE, Some(NFE_ID), &cert, &SignatureOptions::default()).unwrap();
        let canonical = sig.signed_info.canonicalize().unwrap();

        let embedded = Certificate::from_der(sig.certificate_der()).unwrap();
        let vk = rsa::pkcs1v15::VerifyingKey::<sha1::Sha1>::new(embedded.public_key().clone());
        let value = rsa::pkcs1v15::Signature::try_from(sig.signature_value.as_slice()).unwrap();
        assert!(vk.verify(&canonical, &value).is_ok());
    }

    #[test]
    fn test_deterministic() {
        let cert = signer();
        let opts = SignatureOptions::default();
        let a = sign(NFE, Some(NFE_ID), &cert, &opts).unwrap();
        let b = sign(&NFE.to_owned(), Some(NFE_ID), &cert, &opts).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_xml().unwrap(), b.to_xml().unwrap());
    }

    #[test]
    fn test_missing_identifier() {
        // Fails before the content is even serialized, so a public-only
        // certificate does not matter.
        let cert = public_only();
        for id in [None, Some("")] {
            assert!(matches!(
                sign(NFE, id, &cert, &SignatureOptions::default()),
                Err(Error::MissingIdentifier)
            ));
        }
    }

    #[test]
    fn test_reference_target_not_found() {
        assert!(matches!(
            sign(NFE, Some("NFe0"), &signer(), &SignatureOptions::default()),
            Err(Error::ReferenceTargetNotFound(_))
        ));
    }

    #[test]
    fn test_no_private_key() {
        assert!(matches!(
            sign(NFE, Some(NFE_ID), &public_only(), &SignatureOptions::default()),
            Err(Error::NoPrivateKey)
        ));
    }

    #[test]
    fn test_unknown_signature_method() {
        let opts = SignatureOptions::default().with_signature_method("urn:example:rsa-md2");
        let err = sign(NFE, Some(NFE_ID), &signer(), &opts).unwrap_err();
        assert!(matches!(err, Error::UnsupportedAlgorithm(_)));
        assert!(err.is_crypto_primitive());
    }

    #[test]
    fn test_sha256_variant() {
        let opts = SignatureOptions::default()
            .with_signature_method(algorithm::RSA_SHA256)
            .with_digest_method(algorithm::SHA256);
        let sig = sign(NFE, Some(NFE_ID), &signer(), &opts).unwrap();
        assert_eq!(sig.signed_info.reference.digest_value.len(), 32);
        assert_eq!(sig.signed_info.signature_method.algorithm, algorithm::RSA_SHA256);

        let vk = rsa::pkcs1v15::VerifyingKey::<sha2::Sha256>::new(signer().public_key().clone());
        let value = rsa::pkcs1v15::Signature::try_from(sig.signature_value.as_slice()).unwrap();
        assert!(vk
            .verify(&sig.signed_info.canonicalize().unwrap(), &value)
            .is_ok());
    }

    #[test]
    fn test_remove_accents_changes_digest() {
        let accented = NFE.replace("VENDA DE MERCADORIA", "VENDA DE MERCADORIA ação");
        let folded = NFE.replace("VENDA DE MERCADORIA", "VENDA DE MERCADORIA acao");
        let cert = signer();

        let plain = sign(accented.as_str(), Some(NFE_ID), &cert, &SignatureOptions::default()).unwrap();
        let stripped = sign(
            accented.as_str(),
            Some(NFE_ID),
            &cert,
            &SignatureOptions::default().with_remove_accents(true),
        )
        .unwrap();
        let expected = sign(folded.as_str(), Some(NFE_ID), &cert, &SignatureOptions::default()).unwrap();

        assert_ne!(plain.signed_info.reference.digest_value, stripped.signed_info.reference.digest_value);
        assert_eq!(stripped, expected);
    }

    #[test]
    fn test_custom_id_attribute() {
        let xml = r#"<evento><infEvento chave="E1"><x>1</x></infEvento></evento>"#;
        let cert = signer();
        assert!(matches!(
            sign(xml, Some("E1"), &cert, &SignatureOptions::default()),
            Err(Error::ReferenceTargetNotFound(_))
        ));
        let mut opts = SignatureOptions::default();
        opts.add_id_attr("chave");
        assert!(sign(xml, Some("E1"), &cert, &opts).is_ok());
    }

    #[derive(Serialize)]
    #[serde(rename = "envEvento")]
    struct EnvEvento {
        #[serde(rename = "@xmlns")]
        xmlns: &'static str,
        #[serde(rename = "infEvento")]
        inf_evento: InfEvento,
    }

    #[derive(Serialize)]
    struct InfEvento {
        #[serde(rename = "@Id")]
        id: &'static str,
        #[serde(rename = "tpEvento")]
        tp_evento: u32,
    }

    #[test]
    fn test_serde_content() {
        let ev = EnvEvento {
            xmlns: "http://www.portalfiscal.inf.br/nfe",
            inf_evento: InfEvento {
                id: "ID11011035240114200166000187550010000000071123456789",
                tp_evento: 110110,
            },
        };
        let text = SerdeXml(&ev).to_xml().unwrap();
        let cert = signer();
        let id = Some("ID11011035240114200166000187550010000000071123456789");
        let from_value = sign(&SerdeXml(&ev), id, &cert, &SignatureOptions::default()).unwrap();
        let from_text = sign(text.as_str(), id, &cert, &SignatureOptions::default()).unwrap();
        assert_eq!(from_value, from_text);
    }

    #[test]
    fn test_malformed_xml() {
        assert!(matches!(
            sign("<NFe><infNFe Id='x'>", Some("x"), &signer(), &SignatureOptions::default()),
            Err(Error::XmlParse(_))
        ));
    }
}
