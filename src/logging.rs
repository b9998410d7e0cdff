//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout stays parseable for scripts. The filter is
//! taken from `RUST_LOG`, falling back to `call_reconcile=info`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "call_reconcile=info,call_reconcile_core=info";

pub fn init(verbose: bool) {
    let fallback = if verbose {
        "call_reconcile=debug,call_reconcile_core=debug"
    } else {
        DEFAULT_FILTER
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| fallback.into());

    // A second init (e.g. from tests) is harmless; ignore the error.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
