//! Configuration loading from disk.

use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::SweeperConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    /// No config existed; an empty template was written for the operator.
    #[error("No config found, empty template written to {}; fill it in and restart", .0.display())]
    TemplateCreated(PathBuf),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a JSON file.
pub fn load_config(path: &Path) -> Result<SweeperConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: SweeperConfig = serde_json::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load the configuration, writing a template if the file does not exist.
///
/// A freshly written template is reported as [`ConfigError::TemplateCreated`]
/// so startup halts until the operator fills it in.
pub fn load_or_init(path: &Path) -> Result<SweeperConfig, ConfigError> {
    if !path.exists() {
        write_template(path)?;
        return Err(ConfigError::TemplateCreated(path.to_path_buf()));
    }
    load_config(path)
}

/// Write the empty template. Never overwrites an existing file.
pub fn write_template(path: &Path) -> Result<(), ConfigError> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"   ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    SweeperConfig::default().serialize(&mut serializer)?;
    buf.push(b'\n');

    file.write_all(&buf)?;
    tracing::info!(path = %path.display(), "Created empty config");
    Ok(())
}
