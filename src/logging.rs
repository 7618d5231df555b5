//! Diagnostic logging via `tracing`.
//!
//! Scan results never go through here; they are written by a
//! [`ScanSink`](crate::sink::ScanSink). Logs land on stderr and are
//! controlled by `RUST_LOG`, for example:
//!
//! ```bash
//! RUST_LOG=zipwalk=trace zipwalk ~/downloads
//! ```

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber. `verbose` raises the default level to debug.
///
/// Calling it twice is harmless; the second subscriber is ignored.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("zipwalk=debug")
        } else {
            EnvFilter::new("zipwalk=warn")
        }
    });

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact(),
    );

    let _ = tracing::subscriber::set_global_default(subscriber);
}
