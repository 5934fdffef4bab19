// Logging setup: `tracing` events go to stderr, filtered by `RUST_LOG` or the
// configured level.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the log filter. `RUST_LOG` wins; otherwise the configured level
/// applies to this crate only.
pub fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ytrss_cli={}", level)))
}

/// Log to stderr so prompts on stdout stay readable.
pub fn init_logging(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter(level))
        .try_init();
}
