#![forbid(unsafe_code)]

//! dfesig: XML-DSig enveloped signatures and raw RSA PKCS#1 v1.5 signatures
//! for Brazilian fiscal documents (NF-e, NFC-e, CT-e, events).
//!
//! ```no_run
//! use dfesig::{sign_document, CertificateConfig, CertificateProvider, FileCertificateProvider, SignatureOptions};
//!
//! # fn main() -> dfesig::Result<()> {
//! let config = CertificateConfig::file("empresa.crt", Some("empresa.key".into()));
//! let certificate = FileCertificateProvider.resolve(&config)?;
//! let xml = std::fs::read_to_string("nfe.xml")?;
//! let signed = sign_document(&xml, Some("NFe3524..."), &certificate, &SignatureOptions::default())?;
//! # let _ = signed;
//! # Ok(())
//! # }
//! ```

pub use dfesig_c14n as c14n;
pub use dfesig_core as core;
pub use dfesig_crypto as crypto;
pub use dfesig_dsig as dsig;
pub use dfesig_keys as keys;
pub use dfesig_transforms as transforms;
pub use dfesig_xml as xml;

pub mod config;
pub mod telemetry;

pub use dfesig_core::{Error, Result};
pub use dfesig_crypto::{sha1, sign_pkcs1};
pub use dfesig_dsig::{sign, sign_document, SerdeXml, Signature, SignatureOptions, XmlSerializer};
pub use dfesig_keys::{
    sign_pkcs1_from_config, sign_pkcs1_with_config, Certificate, CertificateConfig,
    CertificateProvider, FileCertificateProvider,
};
