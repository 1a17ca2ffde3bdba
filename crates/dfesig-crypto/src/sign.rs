#![forbid(unsafe_code)]

//! RSA PKCS#1 v1.5 signature algorithms.

use crate::digest::DigestMethod;
use dfesig_core::{algorithm, Error};
use rsa::RsaPrivateKey;
use signature::SignatureEncoding;

/// Trait for signature algorithms.
pub trait SignatureAlgorithm: Send + Sync {
    fn uri(&self) -> &'static str;
    fn sign(&self, key: &RsaPrivateKey, data: &[u8]) -> Result<Vec<u8>, Error>;
}

/// Create a signature algorithm from its URI.
pub fn from_uri(uri: &str) -> Result<Box<dyn SignatureAlgorithm>, Error> {
    let (uri, hash) = match uri {
        algorithm::RSA_SHA1 => (algorithm::RSA_SHA1, DigestMethod::Sha1),
        algorithm::RSA_SHA224 => (algorithm::RSA_SHA224, DigestMethod::Sha224),
        algorithm::RSA_SHA256 => (algorithm::RSA_SHA256, DigestMethod::Sha256),
        algorithm::RSA_SHA384 => (algorithm::RSA_SHA384, DigestMethod::Sha384),
        algorithm::RSA_SHA512 => (algorithm::RSA_SHA512, DigestMethod::Sha512),
        _ => {
            return Err(Error::UnsupportedAlgorithm(format!(
                "signature algorithm: {uri}"
            )))
        }
    };
    Ok(Box::new(RsaPkcs1v15 { uri, hash }))
}

/// RSA PKCS#1 v1.5 over the given hash.
struct RsaPkcs1v15 {
    uri: &'static str,
    hash: DigestMethod,
}

impl SignatureAlgorithm for RsaPkcs1v15 {
    fn uri(&self) -> &'static str {
        self.uri
    }

    fn sign(&self, key: &RsaPrivateKey, data: &[u8]) -> Result<Vec<u8>, Error> {
        use signature::Signer;
        macro_rules! do_sign {
            ($hasher:ty) => {{
                let sk = rsa::pkcs1v15::SigningKey::<$hasher>::new(key.clone());
                let sig = sk
                    .try_sign(data)
                    .map_err(|e| Error::Crypto(format!("RSA signing failed: {e}")))?;
                Ok(sig.to_vec())
            }};
        }
        match self.hash {
            DigestMethod::Sha1 => do_sign!(sha1::Sha1),
            DigestMethod::Sha224 => do_sign!(sha2::Sha224),
            DigestMethod::Sha256 => do_sign!(sha2::Sha256),
            DigestMethod::Sha384 => do_sign!(sha2::Sha384),
            DigestMethod::Sha512 => do_sign!(sha2::Sha512),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa::pkcs8::DecodePrivateKey;
    use signature::Verifier;

    fn test_key() -> RsaPrivateKey {
        RsaPrivateKey::from_pkcs8_pem(include_str!("../../../test-data/signer.key")).unwrap()
    }

    #[test]
    fn test_rsa_sha1_verifies() {
        let key = test_key();
        let alg = from_uri(algorithm::RSA_SHA1).unwrap();
        assert_eq!(alg.uri(), algorithm::RSA_SHA1);
        let sig = alg.sign(&key, b"<SignedInfo/>").unwrap();
        assert_eq!(sig.len(), 256);

        let vk = rsa::pkcs1v15::VerifyingKey::<sha1::Sha1>::new(key.to_public_key());
        let sig = rsa::pkcs1v15::Signature::try_from(sig.as_slice()).unwrap();
        assert!(vk.verify(b"<SignedInfo/>", &sig).is_ok());
    }

    #[test]
    fn test_rsa_sha256_verifies() {
        let key = test_key();
        let sig = from_uri(algorithm::RSA_SHA256)
            .unwrap()
            .sign(&key, b"data")
            .unwrap();
        let vk = rsa::pkcs1v15::VerifyingKey::<sha2::Sha256>::new(key.to_public_key());
        let sig = rsa::pkcs1v15::Signature::try_from(sig.as_slice()).unwrap();
        assert!(vk.verify(b"data", &sig).is_ok());
    }

    #[test]
    fn test_deterministic() {
        let key = test_key();
        let alg = from_uri(algorithm::RSA_SHA1).unwrap();
        assert_eq!(alg.sign(&key, b"x").unwrap(), alg.sign(&key, b"x").unwrap());
    }

    #[test]
    fn test_unknown_uri() {
        let err = from_uri("http://www.w3.org/2001/04/xmldsig-more#rsa-md5").err().unwrap();
        assert!(err.is_crypto_primitive());
    }
}
