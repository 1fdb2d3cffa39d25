//! # Configuration File
//!
//! Reads detection settings from TOML:
//!
//! ```toml
//! [duplicate_detection]
//! similarity_threshold_percent = 90
//! chunk_size = 1000
//! ```
//!
//! Precedence is command-line flag, then file, then built-in default.
//! Resolved values are validated, never clamped.

use dupegroup_core::DedupeError;
use dupegroup_core::DetectionConfig;
use dupegroup_core::primitives::{DEFAULT_CHUNK_SIZE, DEFAULT_SIMILARITY_PERCENT};
use serde::Deserialize;
use std::path::Path;

/// File consulted when `--config` is not given. Missing is not an error.
pub const DEFAULT_CONFIG_FILE: &str = "dupegroup.toml";

/// Contents of a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// The `[duplicate_detection]` table.
    pub duplicate_detection: DetectionSection,
}

/// The `[duplicate_detection]` table. Absent keys fall through to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectionSection {
    /// Similarity threshold in percent, 0 to 100.
    pub similarity_threshold_percent: Option<i32>,
    /// Rows compared per batch; must be at least 1.
    pub chunk_size: Option<usize>,
}

impl FileConfig {
    /// Parse TOML text.
    pub fn parse(text: &str) -> Result<Self, DedupeError> {
        toml::from_str(text)
            .map_err(|e| DedupeError::Config(format!("Invalid configuration file: {}", e)))
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self, DedupeError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DedupeError::Config(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::parse(&text)
    }

    /// Load `explicit` if given, otherwise `dupegroup.toml` in the working
    /// directory if it exists, otherwise an empty config.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, DedupeError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            tracing::debug!("Using configuration file {}", DEFAULT_CONFIG_FILE);
            return Self::load(fallback);
        }
        Ok(Self::default())
    }

    /// Merge command-line overrides over the file and defaults, then validate.
    pub fn resolve(
        &self,
        similarity_percent: Option<i32>,
        chunk_size: Option<usize>,
    ) -> Result<DetectionConfig, DedupeError> {
        let section = &self.duplicate_detection;
        let config = DetectionConfig {
            similarity_percent: similarity_percent
                .or(section.similarity_threshold_percent)
                .unwrap_or(DEFAULT_SIMILARITY_PERCENT),
            chunk_size: chunk_size
                .or(section.chunk_size)
                .unwrap_or(DEFAULT_CHUNK_SIZE),
        };
        config.validate()?;
        Ok(config)
    }
}
