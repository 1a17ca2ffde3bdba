#![forbid(unsafe_code)]

//! dfesig CLI: sign fiscal XML documents and raw payloads.

use base64::Engine;
use clap::{Args, Parser, Subcommand};
use dfesig::config::SignerConfig;
use dfesig::{
    CertificateConfig, CertificateProvider, Error, FileCertificateProvider, SignatureOptions,
};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(
    name = "dfesig",
    about = "dfesig — XML-DSig and PKCS#1 signing for fiscal documents",
    version
)]
struct Cli {
    /// Verbose output (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the signing certificate comes from.
#[derive(Args)]
struct CertArgs {
    /// Certificate file (PEM, DER or PEM bundle with the key)
    #[arg(long)]
    cert: Option<PathBuf>,

    /// Private key file (PEM or DER; PKCS#8, PKCS#1 or encrypted PKCS#8)
    #[arg(short = 'k', long)]
    key: Option<PathBuf>,

    /// Password for an encrypted private key
    #[arg(long)]
    password: Option<String>,

    /// Signer configuration file (TOML, YAML or JSON)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign the element with the given ID and embed the signature
    Sign {
        /// Input XML file
        file: PathBuf,

        /// ID of the element to sign (e.g. NFe3524...)
        #[arg(long)]
        id: String,

        #[command(flatten)]
        cert: CertArgs,

        /// SignatureMethod algorithm URI
        #[arg(long = "signature-method")]
        signature_method: Option<String>,

        /// DigestMethod algorithm URI
        #[arg(long = "digest-method")]
        digest_method: Option<String>,

        /// Fold accented letters to ASCII before signing
        #[arg(long = "remove-accents")]
        remove_accents: bool,

        /// Register additional ID attribute names
        #[arg(long = "id-attr")]
        id_attr: Vec<String>,

        /// Write only the <Signature> element instead of the signed document
        #[arg(long = "signature-only")]
        signature_only: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Raw RSA PKCS#1 v1.5 / SHA-1 signature over a file's bytes
    SignPkcs1 {
        /// Payload file
        file: PathBuf,

        #[command(flatten)]
        cert: CertArgs,

        /// Write the signature as base64 text instead of raw bytes
        #[arg(long)]
        base64: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the SHA-1 of a file as hex
    Sha1 {
        /// Input file
        file: PathBuf,
    },

    /// Show supported algorithms
    Info,
}

fn main() {
    let cli = Cli::parse();
    if cli.verbose {
        dfesig::telemetry::init_verbose_tracing();
    } else {
        dfesig::telemetry::init_tracing();
    }

    let result = match cli.command {
        Commands::Sign {
            file,
            id,
            cert,
            signature_method,
            digest_method,
            remove_accents,
            id_attr,
            signature_only,
            output,
        } => {
            let overrides = SignOverrides {
                signature_method,
                digest_method,
                remove_accents,
                id_attr,
            };
            cmd_sign(file, id, cert, overrides, signature_only, output)
        }

        Commands::SignPkcs1 {
            file,
            cert,
            base64,
            output,
        } => cmd_sign_pkcs1(file, cert, base64, output),

        Commands::Sha1 { file } => cmd_sha1(file),

        Commands::Info => cmd_info(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

struct SignOverrides {
    signature_method: Option<String>,
    digest_method: Option<String>,
    remove_accents: bool,
    id_attr: Vec<String>,
}

impl SignOverrides {
    fn apply(self, mut options: SignatureOptions) -> SignatureOptions {
        if let Some(uri) = self.signature_method {
            options.signature_method = uri;
        }
        if let Some(uri) = self.digest_method {
            options.digest_method = uri;
        }
        options.remove_accents |= self.remove_accents;
        for attr in &self.id_attr {
            options.add_id_attr(attr);
        }
        options
    }
}

fn cmd_sign(
    file: PathBuf,
    id: String,
    cert: CertArgs,
    overrides: SignOverrides,
    signature_only: bool,
    output: Option<PathBuf>,
) -> Result<(), Error> {
    let xml = read_file(&file)?;
    let (source, options) = certificate_source(cert)?;
    let options = overrides.apply(options);
    let certificate = FileCertificateProvider.resolve(&source)?;
    tracing::info!(file = %file.display(), id = %id, "signing");

    let out = if signature_only {
        dfesig::sign(xml.as_str(), Some(&id), &certificate, &options)?.to_xml()?
    } else {
        dfesig::sign_document(&xml, Some(&id), &certificate, &options)?
    };
    write_output(output, out.as_bytes())
}

fn cmd_sign_pkcs1(
    file: PathBuf,
    cert: CertArgs,
    base64: bool,
    output: Option<PathBuf>,
) -> Result<(), Error> {
    let payload = std::fs::read(&file)?;
    let (source, _) = certificate_source(cert)?;
    let signature = dfesig::sign_pkcs1_from_config(&FileCertificateProvider, &source, &payload)?;

    if base64 {
        let mut text = base64::engine::general_purpose::STANDARD.encode(signature);
        text.push('\n');
        write_output(output, text.as_bytes())
    } else {
        write_output(output, &signature)
    }
}

fn cmd_sha1(file: PathBuf) -> Result<(), Error> {
    let data = std::fs::read(&file)?;
    println!("{}", hex::encode(dfesig::sha1(&data)));
    Ok(())
}

fn cmd_info() -> Result<(), Error> {
    println!("dfesig — XML-DSig enveloped signatures for fiscal documents");
    println!();
    println!("Canonicalization:");
    println!("  Canonical XML 1.0 (with and without comments)");
    println!();
    println!("Transforms:");
    println!("  enveloped-signature, Canonical XML 1.0");
    println!();
    println!("Supported digest algorithms:");
    println!("  SHA-1 (default), SHA-224, SHA-256, SHA-384, SHA-512");
    println!();
    println!("Supported signature algorithms:");
    println!("  RSA PKCS#1 v1.5 (SHA-1 (default), SHA-224, SHA-256, SHA-384, SHA-512)");
    println!();
    println!("Certificate sources:");
    println!("  PEM/DER certificate + PEM/DER key (PKCS#8, PKCS#1, encrypted PKCS#8)");
    println!("  PEM bundle, directory store by SHA-1 thumbprint");
    Ok(())
}

/// Resolve the certificate source and base signing options from the
/// command line: either a configuration file or explicit files.
fn certificate_source(args: CertArgs) -> Result<(CertificateConfig, SignatureOptions), Error> {
    if let Some(path) = args.config {
        if args.cert.is_some() || args.key.is_some() {
            return Err(Error::Config(
                "--config cannot be combined with --cert/--key".into(),
            ));
        }
        let config = SignerConfig::load(&path)?;
        let certificate = match args.password {
            Some(pwd) => config.certificate.with_password(pwd),
            None => config.certificate,
        };
        return Ok((certificate, config.signature));
    }

    let cert = args
        .cert
        .ok_or_else(|| Error::Config("either --cert or --config is required".into()))?;
    Ok((
        CertificateConfig::File {
            certificate: cert,
            private_key: args.key,
            password: args.password,
        },
        SignatureOptions::default(),
    ))
}

fn read_file(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {e}", path.display()),
        ))
    })
}

fn write_output(path: Option<PathBuf>, data: &[u8]) -> Result<(), Error> {
    match path {
        Some(p) => std::fs::write(&p, data).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {e}", p.display())))
        }),
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout();
            stdout.write_all(data)?;
            stdout.flush()?;
            Ok(())
        }
    }
}
