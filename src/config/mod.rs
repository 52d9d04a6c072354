//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config.json
//!     → loader.rs (read, or write template and halt)
//!     → validation.rs (semantic checks)
//!     → SweeperConfig (validated, immutable for the whole run)
//! ```

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_init, ConfigError};
pub use schema::SweeperConfig;
pub use validation::ValidationError;
