#![forbid(unsafe_code)]

//! Certificate and private key loading (PEM, DER, PKCS#1, PKCS#8, encrypted
//! PKCS#8, PEM bundles).

use crate::certificate::Certificate;
use dfesig_core::Error;
use rsa::RsaPrivateKey;
use std::path::Path;

const PEM_BEGIN: &[u8] = b"-----BEGIN";

/// Load an RSA private key, auto-detecting PEM or DER.
///
/// `password` is only consulted for encrypted PKCS#8.
pub fn load_private_key(data: &[u8], password: Option<&str>) -> Result<RsaPrivateKey, Error> {
    if trim_ascii(data).starts_with(PEM_BEGIN) {
        load_private_key_pem(data, password)
    } else {
        load_private_key_der(data, password)
    }
}

/// Load an RSA private key from PEM data.
pub fn load_private_key_pem(pem_data: &[u8], password: Option<&str>) -> Result<RsaPrivateKey, Error> {
    let (label, der) = pem_rfc7468::decode_vec(trim_ascii(pem_data))
        .map_err(|e| Error::Key(format!("failed to decode private key PEM: {e}")))?;
    decode_private_key(label, &der, password)
}

/// Load an RSA private key from DER: PKCS#8, then PKCS#1, then encrypted
/// PKCS#8 when a password is given.
pub fn load_private_key_der(der: &[u8], password: Option<&str>) -> Result<RsaPrivateKey, Error> {
    use pkcs1::DecodeRsaPrivateKey;
    use pkcs8::DecodePrivateKey;

    if let Ok(key) = RsaPrivateKey::from_pkcs8_der(der) {
        return Ok(key);
    }
    if let Ok(key) = RsaPrivateKey::from_pkcs1_der(der) {
        return Ok(key);
    }
    if let Some(pwd) = password {
        return RsaPrivateKey::from_pkcs8_encrypted_der(der, pwd)
            .map_err(|e| Error::Key(format!("failed to decrypt private key: {e}")));
    }
    Err(Error::Key("unable to detect private key format".into()))
}

fn decode_private_key(
    label: &str,
    der: &[u8],
    password: Option<&str>,
) -> Result<RsaPrivateKey, Error> {
    use pkcs1::DecodeRsaPrivateKey;
    use pkcs8::DecodePrivateKey;

    match label {
        "PRIVATE KEY" => RsaPrivateKey::from_pkcs8_der(der)
            .map_err(|e| Error::Key(format!("failed to parse PKCS#8 private key: {e}"))),
        "RSA PRIVATE KEY" => RsaPrivateKey::from_pkcs1_der(der)
            .map_err(|e| Error::Key(format!("failed to parse PKCS#1 private key: {e}"))),
        "ENCRYPTED PRIVATE KEY" => {
            let pwd = password.ok_or_else(|| {
                Error::Key("encrypted private key requires a password".into())
            })?;
            RsaPrivateKey::from_pkcs8_encrypted_der(der, pwd)
                .map_err(|e| Error::Key(format!("failed to decrypt private key: {e}")))
        }
        _ => Err(Error::Key(format!("unsupported PEM label: {label}"))),
    }
}

fn is_private_key_label(label: &str) -> bool {
    matches!(
        label,
        "PRIVATE KEY" | "RSA PRIVATE KEY" | "ENCRYPTED PRIVATE KEY"
    )
}

/// Load a certificate, auto-detecting PEM or DER.
///
/// PEM input may be a bundle: the first `CERTIFICATE` block is the
/// certificate, and a private key block in the same data is attached.
pub fn load_certificate(data: &[u8], password: Option<&str>) -> Result<Certificate, Error> {
    if !trim_ascii(data).starts_with(PEM_BEGIN) {
        return Certificate::from_der(data);
    }

    let mut cert = None;
    let mut key = None;
    for (label, der) in pem_blocks(data)? {
        if label == "CERTIFICATE" && cert.is_none() {
            cert = Some(Certificate::from_der(&der)?);
        } else if is_private_key_label(&label) && key.is_none() {
            key = Some(decode_private_key(&label, &der, password)?);
        }
    }

    let cert = cert.ok_or_else(|| Error::Certificate("no CERTIFICATE block in PEM data".into()))?;
    match key {
        Some(key) => cert.with_private_key(key),
        None => Ok(cert),
    }
}

/// Load a certificate file and, optionally, a separate private key file.
pub fn load_certificate_files(
    certificate: &Path,
    private_key: Option<&Path>,
    password: Option<&str>,
) -> Result<Certificate, Error> {
    let data = std::fs::read(certificate)?;
    let cert = load_certificate(&data, password)?;
    match private_key {
        Some(path) => {
            let key = load_private_key(&std::fs::read(path)?, password)?;
            cert.with_private_key(key)
        }
        None => Ok(cert),
    }
}

/// Split PEM text into decoded `(label, der)` blocks, ignoring anything
/// between them.
pub fn pem_blocks(data: &[u8]) -> Result<Vec<(String, Vec<u8>)>, Error> {
    let text = std::str::from_utf8(data)
        .map_err(|e| Error::Certificate(format!("invalid PEM encoding: {e}")))?;

    let mut blocks = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("-----BEGIN ") {
        let after = &rest[start..];
        let end = after
            .find("-----END ")
            .and_then(|e| after[e + 9..].find("-----").map(|close| e + 9 + close + 5))
            .ok_or_else(|| Error::Certificate("unterminated PEM block".into()))?;
        let (label, der) = pem_rfc7468::decode_vec(after[..end].as_bytes())
            .map_err(|e| Error::Certificate(format!("failed to decode PEM block: {e}")))?;
        blocks.push((label.to_owned(), der));
        rest = &after[end..];
    }
    Ok(blocks)
}

pub(crate) fn trim_ascii(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    let end = data
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |p| p + 1);
    &data[start..end]
}
