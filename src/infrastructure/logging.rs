use std::io;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence; otherwise `verbose` selects debug-level
/// output for this crate. Repeated initialization is harmless, so tests
/// may call this freely.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "promptcom=debug"
    } else {
        "promptcom=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .try_init();
}
