//! Structured logging.
//!
//! Uses `tracing` with an `EnvFilter`; an explicit filter wins over
//! `RUST_LOG`, which wins over the built-in default.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither a flag nor `RUST_LOG` is given.
pub const DEFAULT_FILTER: &str = "mempool_sweeper=info";

/// Resolve the log filter from an explicit directive or the environment.
pub fn build_filter(directive: Option<&str>) -> EnvFilter {
    match directive {
        Some(directive) => EnvFilter::try_new(directive).unwrap_or_else(|e| {
            eprintln!("Invalid log filter '{}': {}, using default", directive, e);
            EnvFilter::new(DEFAULT_FILTER)
        }),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()),
    }
}

/// Install the global subscriber.
pub fn init_logging(directive: Option<&str>) {
    tracing_subscriber::registry()
        .with(build_filter(directive))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
