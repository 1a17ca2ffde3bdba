#![forbid(unsafe_code)]

//! Signer configuration file.
//!
//! ```toml
//! [certificate]
//! source = "store"
//! directory = "/etc/dfesig/certs"
//! thumbprint = "8ed6269c9e69135450afab6b7c556d1b4a786efe"
//!
//! [signature]
//! remove_accents = true
//! ```
//!
//! Any key can be overridden from the environment with the `DFESIG_`
//! prefix and `__` as the section separator, e.g.
//! `DFESIG_CERTIFICATE__PASSWORD`.

use config::{Config, Environment, File};
use dfesig_core::Error;
use dfesig_dsig::SignatureOptions;
use dfesig_keys::CertificateConfig;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct SignerConfig {
    pub certificate: CertificateConfig,
    #[serde(default)]
    pub signature: SignatureOptions,
}

impl SignerConfig {
    /// Load from a TOML, YAML or JSON file (by extension), with
    /// environment overrides.
    pub fn load(path: &Path) -> Result<Self, Error> {
        Self::load_with_sources(path, None)
    }

    /// Load from `path`, taking overrides from `overrides` (dotted keys)
    /// instead of the process environment when given.
    pub fn load_with_sources(
        path: &Path,
        overrides: Option<HashMap<String, String>>,
    ) -> Result<Self, Error> {
        let mut builder = Config::builder().add_source(File::from(path));

        if let Some(vars) = overrides {
            for (key, value) in vars {
                builder = builder.set_override(&key, value).map_err(config_error)?;
            }
        } else {
            builder = builder.add_source(
                Environment::with_prefix("DFESIG")
                    .prefix_separator("_")
                    .separator("__"),
            );
        }

        let config: Self = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(config_error)?;
        tracing::debug!(path = %path.display(), certificate = ?config.certificate, "signer configuration loaded");
        Ok(config)
    }
}

fn config_error(e: config::ConfigError) -> Error {
    Error::Config(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfesig_core::algorithm;
    use std::io::Write;

    fn write_config(ext: &str, body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(ext).tempfile().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_toml_file_source() {
        let file = write_config(
            ".toml",
            r#"
[certificate]
source = "file"
certificate = "empresa.crt"
private_key = "empresa.key"
password = "secret123"
"#,
        );
        let config = SignerConfig::load_with_sources(file.path(), Some(HashMap::new())).unwrap();
        match &config.certificate {
            CertificateConfig::File {
                certificate,
                private_key,
                password,
            } => {
                assert_eq!(certificate, Path::new("empresa.crt"));
                assert_eq!(private_key.as_deref(), Some(Path::new("empresa.key")));
                assert_eq!(password.as_deref(), Some("secret123"));
            }
            other => panic!("unexpected certificate source {other:?}"),
        }
        assert_eq!(config.signature, SignatureOptions::default());
    }

    #[test]
    fn test_store_and_signature_section() {
        let file = write_config(
            ".toml",
            r#"
[certificate]
source = "store"
directory = "/etc/dfesig/certs"
thumbprint = "8ed6269c9e69135450afab6b7c556d1b4a786efe"

[signature]
signature_method = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256"
digest_method = "http://www.w3.org/2001/04/xmlenc#sha256"
remove_accents = true
"#,
        );
        let config = SignerConfig::load_with_sources(file.path(), Some(HashMap::new())).unwrap();
        assert!(matches!(config.certificate, CertificateConfig::Store { .. }));
        assert_eq!(config.signature.signature_method, algorithm::RSA_SHA256);
        assert_eq!(config.signature.digest_method, algorithm::SHA256);
        assert!(config.signature.remove_accents);
        assert!(config.signature.id_attrs.is_empty());
    }

    #[test]
    fn test_override() {
        let file = write_config(
            ".json",
            r#"{"certificate": {"source": "file", "certificate": "a.crt"}}"#,
        );
        let mut vars = HashMap::new();
        vars.insert("certificate.certificate".to_owned(), "b.crt".to_owned());
        let config = SignerConfig::load_with_sources(file.path(), Some(vars)).unwrap();
        match config.certificate {
            CertificateConfig::File { certificate, .. } => {
                assert_eq!(certificate, Path::new("b.crt"))
            }
            other => panic!("unexpected certificate source {other:?}"),
        }
    }

    #[test]
    fn test_missing_certificate_section() {
        let file = write_config(".toml", "[signature]\nremove_accents = true\n");
        let err = SignerConfig::load_with_sources(file.path(), Some(HashMap::new())).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SignerConfig::load(Path::new("/nonexistent/dfesig.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
