//! # Configuration
//!
//! Optional TOML configuration for the binmeta tool.
//!
//! ## Resolution
//!
//! 1. `--config <path>`: must exist
//! 2. `binmeta.toml` in the working directory, if present
//! 3. Built-in defaults
//!
//! Command-line flags override whatever the file says.
//!
//! ```toml
//! [writer]
//! abi_version = 32
//! max_chunk_length = 65535
//!
//! [output]
//! json = false
//! ```

use binmeta_core::BinmetaError;
use binmeta_core::primitives::{CURRENT_ABI_VERSION, MAX_CHUNK_LENGTH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "binmeta.toml";

/// Maximum size of a configuration file (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub writer: WriterConfig,
    pub output: OutputConfig,
}

/// Settings for `emit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WriterConfig {
    /// Version stamped on emitted records.
    pub abi_version: i32,
    /// Per-chunk cap; never above the protocol maximum.
    pub max_chunk_length: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            abi_version: CURRENT_ABI_VERSION,
            max_chunk_length: MAX_CHUNK_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Default for `--json-mode`.
    pub json: bool,
}

impl Config {
    /// Load configuration from an explicit path, the working directory, or defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, BinmetaError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                if local.is_file() {
                    Self::from_file(&local)
                } else {
                    tracing::debug!("no configuration file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Read and validate one configuration file.
    pub fn from_file(path: &Path) -> Result<Self, BinmetaError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            BinmetaError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(BinmetaError::InvalidArgument(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            BinmetaError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        let config = Self::parse(&contents)
            .map_err(|e| BinmetaError::InvalidArgument(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn parse(contents: &str) -> Result<Self, BinmetaError> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| BinmetaError::InvalidArgument(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), BinmetaError> {
        let limit = self.writer.max_chunk_length;
        if limit == 0 || limit > MAX_CHUNK_LENGTH {
            return Err(BinmetaError::InvalidArgument(format!(
                "writer.max_chunk_length must be between 1 and {}, got {}",
                MAX_CHUNK_LENGTH, limit
            )));
        }
        Ok(())
    }
}
