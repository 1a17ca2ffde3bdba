#![forbid(unsafe_code)]

//! Directory-backed certificate store with lookup by SHA-1 thumbprint.

use crate::certificate::Certificate;
use crate::loader;
use dfesig_core::Error;
use std::path::{Path, PathBuf};

const CERT_EXTENSIONS: [&str; 4] = ["pem", "crt", "cer", "der"];

/// A directory of certificate files.
///
/// Files with a `.pem`, `.crt`, `.cer` or `.der` extension are treated as
/// certificates. The private key for `name.crt` is read from `name.key`
/// when present, or from the certificate file itself if it is a PEM bundle.
#[derive(Debug, Clone)]
pub struct CertificateStore {
    directory: PathBuf,
    password: Option<String>,
}

impl CertificateStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            password: None,
        }
    }

    /// Password used for encrypted private keys in this store.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Every certificate file in the store, sorted by path.
    pub fn certificate_paths(&self) -> Result<Vec<PathBuf>, Error> {
        let entries = std::fs::read_dir(&self.directory).map_err(|e| {
            Error::Certificate(format!(
                "cannot read certificate store {}: {e}",
                self.directory.display()
            ))
        })?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_cert = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| CERT_EXTENSIONS.iter().any(|c| ext.eq_ignore_ascii_case(c)));
            if is_cert && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Find the certificate whose SHA-1 thumbprint is `thumbprint` (hex;
    /// case, spaces and colons are ignored) and load its private key.
    pub fn find_by_thumbprint(&self, thumbprint: &str) -> Result<Certificate, Error> {
        let wanted = normalize_thumbprint(thumbprint)?;
        for path in self.certificate_paths()? {
            let data = std::fs::read(&path)?;
            let cert = match loader::load_certificate(&data, self.password.as_deref()) {
                Ok(cert) => cert,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping unreadable certificate");
                    continue;
                }
            };
            if cert.thumbprint() != wanted {
                continue;
            }
            tracing::debug!(path = %path.display(), "certificate found in store");
            if cert.has_private_key() {
                return Ok(cert);
            }
            let key_path = path.with_extension("key");
            if !key_path.is_file() {
                return Ok(cert);
            }
            let key = loader::load_private_key(&std::fs::read(&key_path)?, self.password.as_deref())?;
            return cert.with_private_key(key);
        }
        Err(Error::Certificate(format!(
            "no certificate with thumbprint {} in {}",
            hex::encode(wanted),
            self.directory.display()
        )))
    }
}

/// Parse a hex SHA-1 thumbprint such as `8E:D6:26 ...` or `8ed626...`.
pub fn normalize_thumbprint(thumbprint: &str) -> Result<[u8; 20], Error> {
    let digits: String = thumbprint
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    let bytes = hex::decode(&digits)
        .map_err(|e| Error::Certificate(format!("invalid thumbprint {thumbprint:?}: {e}")))?;
    bytes.try_into().map_err(|_| {
        Error::Certificate(format!(
            "invalid thumbprint {thumbprint:?}: expected 20 bytes"
        ))
    })
}
