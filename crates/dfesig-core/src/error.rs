#![forbid(unsafe_code)]

/// Errors produced while assembling a signature.
///
/// None of these are transient: the same inputs always produce the same
/// error, so callers should not retry.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot sign a document without a reference identifier")]
    MissingIdentifier,

    #[error("reference target not found: #{0}")]
    ReferenceTargetNotFound(String),

    #[error("certificate carries no extractable private key")]
    NoPrivateKey,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("cryptographic error: {0}")]
    Crypto(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("XML parsing error: {0}")]
    XmlParse(String),

    #[error("canonicalization error: {0}")]
    Canonicalization(String),

    #[error("transform error: {0}")]
    Transform(String),

    #[error("key error: {0}")]
    Key(String),

    #[error("certificate error: {0}")]
    Certificate(String),

    #[error("base64 decode error: {0}")]
    Base64(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error came from a hash or signature primitive
    /// (including an algorithm identifier the primitives do not know).
    pub fn is_crypto_primitive(&self) -> bool {
        matches!(self, Self::Crypto(_) | Self::UnsupportedAlgorithm(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
