#![forbid(unsafe_code)]

//! Enveloped XML Digital Signatures (XML-DSig) for fiscal documents.
//!
//! [`sign`] takes serializable content, the identifier of the element to
//! sign and a certificate with its private key, and returns the assembled
//! [`Signature`]. [`sign_document`] additionally places the signature
//! next to the signed element and returns the signed document.

pub mod envelope;
pub mod keyinfo;
pub mod model;
pub mod normalize;
pub mod options;
pub mod reference;
pub mod serializer;
pub mod sign;
pub mod signed_info;

pub use envelope::sign_document;
pub use model::{AlgorithmIdentifier, KeyInfo, Reference, Signature, SignedInfo, Transforms, X509Data};
pub use options::SignatureOptions;
pub use serializer::{SerdeXml, XmlSerializer};
pub use sign::sign;
