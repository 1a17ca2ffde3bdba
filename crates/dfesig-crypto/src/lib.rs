#![forbid(unsafe_code)]

//! Cryptographic primitives for dfesig.
//!
//! - [`digest`]: SHA-1 / SHA-2 digests selected by algorithm URI
//! - [`sign`]: RSA PKCS#1 v1.5 signatures selected by algorithm URI
//! - [`pkcs1`]: the raw SHA-1 / PKCS#1 v1.5 signer over arbitrary bytes

pub mod digest;
pub mod pkcs1;
pub mod sign;

pub use digest::DigestMethod;
pub use pkcs1::{sha1, sign_pkcs1, sign_pkcs1_prehashed};
pub use sign::SignatureAlgorithm;
