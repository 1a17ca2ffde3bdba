#![forbid(unsafe_code)]

//! `KeyInfo` construction.

use crate::model::{KeyInfo, X509Data};
use dfesig_keys::Certificate;

impl KeyInfo {
    /// `KeyInfo/X509Data/X509Certificate` carrying the certificate DER.
    /// Only the public certificate is ever embedded.
    pub fn from_certificate(certificate: &Certificate) -> Self {
        Self {
            x509_data: X509Data {
                x509_certificate: certificate.der().to_vec(),
            },
        }
    }
}
