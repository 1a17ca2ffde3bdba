#![forbid(unsafe_code)]

//! Signing certificates for dfesig.
//!
//! A [`Certificate`] pairs an X.509 certificate (kept as DER, embedded into
//! `KeyInfo`) with its RSA public key and, when available, the matching
//! private key. Certificates are obtained through a [`CertificateProvider`]
//! from a [`CertificateConfig`]: PEM/DER files, in-memory bytes, or a
//! directory store searched by SHA-1 thumbprint.

pub mod certificate;
pub mod config;
pub mod loader;
pub mod provider;
pub mod store;

pub use certificate::Certificate;
pub use config::CertificateConfig;
pub use provider::{
    sign_pkcs1_from_config, sign_pkcs1_with_config, CertificateProvider,
    FileCertificateProvider,
};
pub use store::CertificateStore;
