#![forbid(unsafe_code)]

//! Raw RSA PKCS#1 v1.5 / SHA-1 signing over arbitrary bytes.
//!
//! This is the signature some fiscal web services require outside of
//! XML-DSig (e.g. over a concatenated string of document fields). The
//! output is the bare signature: no XML, no encoding.

use dfesig_core::Error;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha1::{Digest, Sha1};

/// SHA-1 of `data`.
pub fn sha1(data: &[u8]) -> [u8; 20] {
    let mut out = [0u8; 20];
    out.copy_from_slice(&Sha1::digest(data));
    out
}

/// Sign `payload` with SHA-1 and PKCS#1 v1.5 padding (including the SHA-1
/// DigestInfo prefix). Deterministic for a given key and payload.
pub fn sign_pkcs1(key: Option<&RsaPrivateKey>, payload: &[u8]) -> Result<Vec<u8>, Error> {
    let key = key.ok_or(Error::NoPrivateKey)?;
    tracing::debug!(payload_len = payload.len(), "raw PKCS#1 signature");
    sign_pkcs1_prehashed(key, &sha1(payload))
}

/// Sign an existing SHA-1 digest with PKCS#1 v1.5 padding.
pub fn sign_pkcs1_prehashed(key: &RsaPrivateKey, digest: &[u8; 20]) -> Result<Vec<u8>, Error> {
    key.sign(Pkcs1v15Sign::new::<Sha1>(), digest)
        .map_err(|e| Error::Crypto(format!("RSA signing failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use rsa::pkcs8::DecodePrivateKey;
    use signature::{SignatureEncoding, Signer, Verifier};

    const PAYLOAD: &[u8] = include_bytes!("../../../test-data/payload.bin");
    const GOLDEN: &[u8] = include_bytes!("../../../test-data/payload.sig");

    fn test_key() -> RsaPrivateKey {
        RsaPrivateKey::from_pkcs8_pem(include_str!("../../../test-data/signer.key")).unwrap()
    }

    #[test]
    fn test_sha1() {
        assert_eq!(hex::encode(sha1(b"")), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
        assert_eq!(hex::encode(sha1(PAYLOAD)), "e500a40c21e37278e972cb87103218773d6e875b");
    }

    #[test]
    fn test_golden_signature() {
        let key = test_key();
        let sig = sign_pkcs1(Some(&key), PAYLOAD).unwrap();
        assert_eq!(sig, GOLDEN);
        assert!(base64::engine::general_purpose::STANDARD
            .encode(&sig)
            .starts_with("tbw4DkminAHxJ9jhBCy1RwCIuAkNPkz+"));
    }

    #[test]
    fn test_verifies_with_public_key() {
        let key = test_key();
        let sig = sign_pkcs1(Some(&key), PAYLOAD).unwrap();
        let vk = rsa::pkcs1v15::VerifyingKey::<Sha1>::new(key.to_public_key());
        let sig = rsa::pkcs1v15::Signature::try_from(sig.as_slice()).unwrap();
        assert!(vk.verify(PAYLOAD, &sig).is_ok());
    }

    #[test]
    fn test_matches_rustcrypto_signer() {
        let key = test_key();
        let sk = rsa::pkcs1v15::SigningKey::<Sha1>::new(key.clone());
        let expected = sk.sign(b"anything").to_vec();
        assert_eq!(sign_pkcs1(Some(&key), b"anything").unwrap(), expected);
    }

    #[test]
    fn test_prehashed_matches() {
        let key = test_key();
        let digest = sha1(PAYLOAD);
        assert_eq!(sign_pkcs1_prehashed(&key, &digest).unwrap(), GOLDEN);
    }

    #[test]
    fn test_empty_payload_is_signed() {
        let key = test_key();
        assert_eq!(sign_pkcs1(Some(&key), b"").unwrap().len(), 256);
    }

    #[test]
    fn test_missing_key() {
        assert!(matches!(sign_pkcs1(None, b"x"), Err(Error::NoPrivateKey)));
    }
}
