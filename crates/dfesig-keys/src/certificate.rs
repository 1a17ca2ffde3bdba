#![forbid(unsafe_code)]

//! An X.509 signing certificate with its RSA key pair.

use dfesig_core::Error;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;

/// A signing certificate.
///
/// The private key is optional: a certificate loaded without one can still
/// be embedded in `KeyInfo`, but every signing operation fails with
/// [`Error::NoPrivateKey`].
#[derive(Clone)]
pub struct Certificate {
    der: Vec<u8>,
    subject: String,
    serial: Vec<u8>,
    public: RsaPublicKey,
    private: Option<RsaPrivateKey>,
}

impl Certificate {
    /// Parse a DER-encoded X.509 certificate carrying an RSA public key.
    pub fn from_der(data: &[u8]) -> Result<Self, Error> {
        use der::{Decode, Encode};
        use spki::DecodePublicKey;

        let cert = x509_cert::Certificate::from_der(data)
            .map_err(|e| Error::Certificate(format!("failed to parse X.509 certificate: {e}")))?;

        let spki_der = cert
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| Error::Certificate(format!("failed to encode SPKI: {e}")))?;
        let public = RsaPublicKey::from_public_key_der(&spki_der).map_err(|e| {
            Error::Certificate(format!("certificate does not carry an RSA public key: {e}"))
        })?;

        Ok(Self {
            der: data.to_vec(),
            subject: cert.tbs_certificate.subject.to_string(),
            serial: cert.tbs_certificate.serial_number.as_bytes().to_vec(),
            public,
            private: None,
        })
    }

    /// Parse a PEM-encoded X.509 certificate (`-----BEGIN CERTIFICATE-----`).
    pub fn from_pem(data: &[u8]) -> Result<Self, Error> {
        let (label, der) = pem_rfc7468::decode_vec(crate::loader::trim_ascii(data))
            .map_err(|e| Error::Certificate(format!("failed to decode certificate PEM: {e}")))?;
        if label != "CERTIFICATE" {
            return Err(Error::Certificate(format!(
                "expected CERTIFICATE PEM label, got: {label}"
            )));
        }
        Self::from_der(&der)
    }

    /// Attach the private key. Fails if it does not belong to this
    /// certificate's public key.
    pub fn with_private_key(mut self, key: RsaPrivateKey) -> Result<Self, Error> {
        if key.to_public_key() != self.public {
            return Err(Error::Key(
                "private key does not match the certificate public key".into(),
            ));
        }
        self.private = Some(key);
        Ok(self)
    }

    /// The DER encoding, as embedded in `X509Certificate`.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Serial number, lowercase hex.
    pub fn serial_hex(&self) -> String {
        hex::encode(&self.serial)
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    pub fn private_key(&self) -> Option<&RsaPrivateKey> {
        self.private.as_ref()
    }

    pub fn has_private_key(&self) -> bool {
        self.private.is_some()
    }

    /// SHA-1 over the DER encoding.
    pub fn thumbprint(&self) -> [u8; 20] {
        dfesig_crypto::sha1(&self.der)
    }

    /// [`thumbprint`](Self::thumbprint) as lowercase hex.
    pub fn thumbprint_hex(&self) -> String {
        hex::encode(self.thumbprint())
    }

    /// Raw SHA-1 / PKCS#1 v1.5 signature over `payload` with this
    /// certificate's private key.
    pub fn sign_pkcs1(&self, payload: &[u8]) -> Result<Vec<u8>, Error> {
        dfesig_crypto::sign_pkcs1(self.private.as_ref(), payload)
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject)
            .field("serial", &self.serial_hex())
            .field("thumbprint", &self.thumbprint_hex())
            .field("has_private_key", &self.has_private_key())
            .finish()
    }
}
