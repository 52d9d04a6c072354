//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! monitors, supervisor, bootstrap
//!     → logging.rs (structured log events, per-endpoint spans)
//!     → metrics.rs (counters and gauges, Prometheus exposition)
//! ```

pub mod logging;
pub mod metrics;
