#![forbid(unsafe_code)]

//! The `Signature` element tree.
//!
//! These types serialize to, and deserialize from, the XML-DSig element
//! shape through `quick-xml`'s serde support. Binary values (digest,
//! signature, certificate) are held as bytes and travel as base64 text.

use dfesig_core::{ns, Error};
use serde::{Deserialize, Serialize};

/// `<Signature xmlns="http://www.w3.org/2000/09/xmldsig#">`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "Signature")]
pub struct Signature {
    #[serde(rename = "@xmlns", default = "dsig_namespace")]
    xmlns: String,
    #[serde(rename = "SignedInfo")]
    pub signed_info: SignedInfo,
    #[serde(rename = "SignatureValue", with = "base64_text")]
    pub signature_value: Vec<u8>,
    #[serde(rename = "KeyInfo")]
    pub key_info: KeyInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedInfo {
    #[serde(rename = "CanonicalizationMethod")]
    pub canonicalization_method: AlgorithmIdentifier,
    #[serde(rename = "SignatureMethod")]
    pub signature_method: AlgorithmIdentifier,
    #[serde(rename = "Reference")]
    pub reference: Reference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "@URI")]
    pub uri: String,
    #[serde(rename = "Transforms")]
    pub transforms: Transforms,
    #[serde(rename = "DigestMethod")]
    pub digest_method: AlgorithmIdentifier,
    #[serde(rename = "DigestValue", with = "base64_text")]
    pub digest_value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transforms {
    #[serde(rename = "Transform", default)]
    pub transform: Vec<AlgorithmIdentifier>,
}

/// Any element whose only content is an `Algorithm` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmIdentifier {
    #[serde(rename = "@Algorithm")]
    pub algorithm: String,
}

impl AlgorithmIdentifier {
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    #[serde(rename = "X509Data")]
    pub x509_data: X509Data,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct X509Data {
    #[serde(rename = "X509Certificate", with = "base64_text")]
    pub x509_certificate: Vec<u8>,
}

fn dsig_namespace() -> String {
    ns::DSIG.to_owned()
}

impl Signature {
    pub fn new(signed_info: SignedInfo, signature_value: Vec<u8>, key_info: KeyInfo) -> Self {
        Self {
            xmlns: dsig_namespace(),
            signed_info,
            signature_value,
            key_info,
        }
    }

    /// Serialize to `<Signature xmlns="http://www.w3.org/2000/09/xmldsig#">…</Signature>`,
    /// without indentation.
    pub fn to_xml(&self) -> Result<String, Error> {
        quick_xml::se::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize a `Signature` element.
    pub fn from_xml(xml: &str) -> Result<Self, Error> {
        quick_xml::de::from_str(xml).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn digest_value_base64(&self) -> String {
        base64_text::encode(&self.signed_info.reference.digest_value)
    }

    pub fn signature_value_base64(&self) -> String {
        base64_text::encode(&self.signature_value)
    }

    /// DER of the embedded signer certificate.
    pub fn certificate_der(&self) -> &[u8] {
        &self.key_info.x509_data.x509_certificate
    }
}

impl Reference {
    /// Transform algorithm URIs, in order.
    pub fn transform_uris(&self) -> Vec<&str> {
        self.transforms
            .transform
            .iter()
            .map(|t| t.algorithm.as_str())
            .collect()
    }

    pub fn digest_value_base64(&self) -> String {
        base64_text::encode(&self.digest_value)
    }
}

/// Bytes as base64 element text. Whitespace inside the text (line-wrapped
/// values from other signers) is ignored when reading.
pub(crate) mod base64_text {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    const ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

    pub fn encode(bytes: &[u8]) -> String {
        ENGINE.encode(bytes)
    }

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        ENGINE.decode(compact).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfesig_core::algorithm;

    fn sample() -> Signature {
        Signature::new(
            SignedInfo {
                canonicalization_method: AlgorithmIdentifier::new(algorithm::C14N),
                signature_method: AlgorithmIdentifier::new(algorithm::RSA_SHA1),
                reference: Reference {
                    uri: "#NFe1".into(),
                    transforms: Transforms {
                        transform: vec![
                            AlgorithmIdentifier::new(algorithm::ENVELOPED_SIGNATURE),
                            AlgorithmIdentifier::new(algorithm::C14N),
                        ],
                    },
                    digest_method: AlgorithmIdentifier::new(algorithm::SHA1),
                    digest_value: vec![0xde, 0xad, 0xbe, 0xef],
                },
            },
            vec![1, 2, 3, 4, 5],
            KeyInfo {
                x509_data: X509Data {
                    x509_certificate: vec![0x30, 0x82],
                },
            },
        )
    }

    #[test]
    fn test_to_xml_shape() {
        let xml = sample().to_xml().unwrap();
        assert!(xml.starts_with(r#"<Signature xmlns="http://www.w3.org/2000/09/xmldsig#"><SignedInfo>"#));
        assert!(xml.contains(r##"<Reference URI="#NFe1"><Transforms>"##));
        assert!(xml.contains("<DigestValue>3q2+7w==</DigestValue>"));
        assert!(xml.contains("<SignatureValue>AQIDBAU=</SignatureValue>"));
        assert!(xml.ends_with("<KeyInfo><X509Data><X509Certificate>MII=</X509Certificate></X509Data></KeyInfo></Signature>"));
        assert!(!xml.contains('\n'));
    }

    #[test]
    fn test_xml_roundtrip_is_lossless() {
        let sig = sample();
        let parsed = Signature::from_xml(&sig.to_xml().unwrap()).unwrap();
        assert_eq!(parsed, sig);
        assert_eq!(
            parsed.signed_info.reference.transform_uris(),
            vec![algorithm::ENVELOPED_SIGNATURE, algorithm::C14N]
        );
    }

    #[test]
    fn test_wrapped_base64_accepted() {
        let xml = concat!(
            r#"<Signature xmlns="http://www.w3.org/2000/09/xmldsig#"><SignedInfo>"#,
            r#"<CanonicalizationMethod Algorithm="http://www.w3.org/TR/2001/REC-xml-c14n-20010315"/>"#,
            r#"<SignatureMethod Algorithm="http://www.w3.org/2000/09/xmldsig#rsa-sha1"/>"#,
            r##"<Reference URI="#x"><Transforms/>"##,
            r#"<DigestMethod Algorithm="http://www.w3.org/2000/09/xmldsig#sha1"/>"#,
            "<DigestValue>3q2+\n7w==</DigestValue></Reference></SignedInfo>",
            "<SignatureValue>AQID\r\nBAU=</SignatureValue>",
            "<KeyInfo><X509Data><X509Certificate>MII=</X509Certificate></X509Data></KeyInfo></Signature>",
        );
        let sig = Signature::from_xml(xml).unwrap();
        assert_eq!(sig.signed_info.reference.digest_value, vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(sig.signature_value_base64(), "AQIDBAU=");
        assert_eq!(sig.certificate_der(), &[0x30, 0x82]);
        assert!(sig.signed_info.reference.transform_uris().is_empty());
    }

    #[test]
    fn test_invalid_xml() {
        assert!(matches!(
            Signature::from_xml("<Signature><SignedInfo>"),
            Err(Error::Serialization(_))
        ));
    }
}
