//! Pending transaction race engine.
//!
//! # Data Flow
//! ```text
//! supervisor.rs (one task per endpoint)
//!     → chain.rs (node connection + signer context)
//!     → monitor.rs (pending feed → per-hash pipeline)
//!     → replacement.rs (fee bump, value adjustment)
//!     → signed replacement broadcast back to the same node
//! ```
//!
//! # Design Decisions
//! - Hashes on one endpoint are processed strictly one at a time
//! - No state is shared between monitors beyond the read-only registry
//!   and receiver; the same transaction seen on two endpoints is raced twice
//! - A dead subscription is final for that endpoint; WebSocket transports
//!   are dialed with reconnection disabled so a dropped socket ends the feed

pub mod chain;
pub mod monitor;
pub mod replacement;
pub mod supervisor;

pub use chain::Chain;
pub use monitor::{HashOutcome, IgnoreReason, Stage, SweepError};
pub use replacement::{fee_bump, ReplacementPlan, ReplacementValue};
pub use supervisor::{run, run_monitors, supervise, MonitorExit};
