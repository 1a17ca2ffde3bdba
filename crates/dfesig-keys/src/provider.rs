#![forbid(unsafe_code)]

//! Resolving a [`CertificateConfig`] into a usable [`Certificate`].

use crate::certificate::Certificate;
use crate::config::CertificateConfig;
use crate::loader;
use crate::store::CertificateStore;
use dfesig_core::Error;

/// Source of signing certificates.
pub trait CertificateProvider: Send + Sync {
    /// Load the certificate (and its private key, if any) described by
    /// `config`.
    fn resolve(&self, config: &CertificateConfig) -> Result<Certificate, Error>;
}

/// Resolves certificates from the local filesystem or memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCertificateProvider;

impl CertificateProvider for FileCertificateProvider {
    fn resolve(&self, config: &CertificateConfig) -> Result<Certificate, Error> {
        match config {
            CertificateConfig::File {
                certificate,
                private_key,
                password,
            } => loader::load_certificate_files(
                certificate,
                private_key.as_deref(),
                password.as_deref(),
            ),
            CertificateConfig::Bytes {
                certificate,
                private_key,
                password,
            } => {
                let cert = loader::load_certificate(certificate, password.as_deref())?;
                match private_key {
                    Some(key) => {
                        cert.with_private_key(loader::load_private_key(key, password.as_deref())?)
                    }
                    None => Ok(cert),
                }
            }
            CertificateConfig::Store {
                directory,
                thumbprint,
                password,
            } => {
                let mut store = CertificateStore::new(directory);
                if let Some(pwd) = password {
                    store = store.with_password(pwd.as_str());
                }
                store.find_by_thumbprint(thumbprint)
            }
        }
    }
}

/// Resolve `config` through `provider` and produce a raw SHA-1 / PKCS#1 v1.5
/// signature over `payload`.
///
/// The private key only lives for the duration of this call.
#[tracing::instrument(skip_all, fields(payload_len = payload.len()))]
pub fn sign_pkcs1_from_config(
    provider: &dyn CertificateProvider,
    config: &CertificateConfig,
    payload: &[u8],
) -> Result<Vec<u8>, Error> {
    let cert = provider.resolve(config)?;
    tracing::debug!(thumbprint = %cert.thumbprint_hex(), "resolved signing certificate");
    cert.sign_pkcs1(payload)
}

/// [`sign_pkcs1_from_config`] with the [`FileCertificateProvider`].
pub fn sign_pkcs1_with_config(config: &CertificateConfig, payload: &[u8]) -> Result<Vec<u8>, Error> {
    sign_pkcs1_from_config(&FileCertificateProvider, config, payload)
}
