//! Controlled account registry.
//!
//! # Security
//! - Keys are loaded from a line-oriented key file, one hex key per line
//! - Keys are never logged or serialized; only derived addresses are
//! - The registry is immutable once loaded and shared read-only via `Arc`

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Errors reading the key source.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Failed to open account file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read account file: {0}")]
    Read(#[from] std::io::Error),
}

/// Map from derived address to the private key controlling it.
#[derive(Default)]
pub struct AccountRegistry {
    accounts: HashMap<Address, PrivateKeySigner>,
}

impl AccountRegistry {
    /// Parse a hex-encoded private key (with or without 0x prefix).
    pub fn parse_key(private_key_hex: &str) -> BlockchainResult<PrivateKeySigner> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))
    }

    /// Build a registry from key lines, skipping blank and malformed ones.
    ///
    /// A key appearing twice keeps a single entry.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut accounts = HashMap::new();

        for (idx, line) in lines.into_iter().enumerate() {
            let line = line.as_ref().trim();
            if line.is_empty() {
                continue;
            }

            match Self::parse_key(line) {
                Ok(signer) => {
                    accounts.insert(signer.address(), signer);
                }
                Err(e) => {
                    tracing::warn!(line = idx + 1, error = %e, "Skipping malformed key");
                }
            }
        }

        Self { accounts }
    }

    /// Load the registry from a newline-delimited key file.
    ///
    /// Lines that are not valid UTF-8 are skipped like any other malformed
    /// key; only I/O failures abort the load.
    pub fn load(path: &Path) -> Result<Self, AccountError> {
        let file = File::open(path).map_err(|source| AccountError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut lines = Vec::new();
        for (idx, raw) in BufReader::new(file).split(b'\n').enumerate() {
            match String::from_utf8(raw?) {
                Ok(line) => lines.push(line),
                Err(_) => {
                    tracing::warn!(line = idx + 1, "Skipping non-UTF-8 line");
                    // keep numbering aligned for later warnings
                    lines.push(String::new());
                }
            }
        }

        let registry = Self::from_lines(lines);
        tracing::info!(accounts = registry.len(), "Loaded accounts");
        Ok(registry)
    }

    /// Key controlling `address`, if it is one of ours.
    pub fn get(&self, address: &Address) -> Option<&PrivateKeySigner> {
        self.accounts.get(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl std::fmt::Debug for AccountRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountRegistry")
            .field("accounts", &self.accounts.len())
            .finish()
    }
}
