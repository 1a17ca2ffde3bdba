#![forbid(unsafe_code)]

//! Tracing setup for the command-line tool.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

static INIT: OnceLock<()> = OnceLock::new();

/// Install a stderr subscriber filtered by `RUST_LOG` (default `warn`).
/// Later calls are no-ops.
pub fn init_tracing() {
    INIT.get_or_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(env_filter)
            .try_init();
    });
}

/// Like [`init_tracing`], but at `debug` for the dfesig crates unless
/// `RUST_LOG` says otherwise.
pub fn init_verbose_tracing() {
    INIT.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("warn,dfesig=debug,dfesig_dsig=debug,dfesig_keys=debug,dfesig_crypto=debug")
        });
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(env_filter)
            .try_init();
    });
}
