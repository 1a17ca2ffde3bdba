#![forbid(unsafe_code)]

//! Signing options.

use dfesig_core::algorithm;
use serde::Deserialize;

/// Options for [`sign`](crate::sign()).
///
/// The defaults are RSA-SHA1 and SHA-1, which is what the fiscal
/// authorities' validators expect. SHA-1 is cryptographically weak; the
/// SHA-2 URIs are accepted where the receiving side supports them. Nothing
/// here is ever upgraded implicitly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SignatureOptions {
    /// `SignatureMethod` algorithm URI.
    pub signature_method: String,
    /// `DigestMethod` algorithm URI.
    pub digest_method: String,
    /// Fold accented Latin letters to ASCII before signing.
    pub remove_accents: bool,
    /// ID attribute names recognised besides `Id`, `ID` and `id`.
    pub id_attrs: Vec<String>,
}

impl Default for SignatureOptions {
    fn default() -> Self {
        Self {
            signature_method: algorithm::RSA_SHA1.to_owned(),
            digest_method: algorithm::SHA1.to_owned(),
            remove_accents: false,
            id_attrs: Vec::new(),
        }
    }
}

impl SignatureOptions {
    pub fn with_signature_method(mut self, uri: impl Into<String>) -> Self {
        self.signature_method = uri.into();
        self
    }

    pub fn with_digest_method(mut self, uri: impl Into<String>) -> Self {
        self.digest_method = uri.into();
        self
    }

    pub fn with_remove_accents(mut self, remove: bool) -> Self {
        self.remove_accents = remove;
        self
    }

    /// Register an additional ID attribute name.
    pub fn add_id_attr(&mut self, name: &str) {
        if !self.id_attrs.iter().any(|a| a == name) {
            self.id_attrs.push(name.to_owned());
        }
    }
}
