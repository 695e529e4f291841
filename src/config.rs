use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Compression applied to archive entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveCompression {
    Stored,
    #[default]
    Deflated,
}

impl From<ArchiveCompression> for zip::CompressionMethod {
    fn from(value: ArchiveCompression) -> Self {
        match value {
            ArchiveCompression::Stored => zip::CompressionMethod::Stored,
            ArchiveCompression::Deflated => zip::CompressionMethod::Deflated,
        }
    }
}

/// Settings supplied when a container is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Directory under which each container creates its staging directory.
    pub temp_root: PathBuf,
    pub compression: ArchiveCompression,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            temp_root: std::env::temp_dir(),
            compression: ArchiveCompression::default(),
        }
    }
}

impl ContainerConfig {
    /// Default settings with staging directories placed under `temp_root`.
    pub fn with_temp_root(temp_root: impl Into<PathBuf>) -> Self {
        Self {
            temp_root: temp_root.into(),
            ..Self::default()
        }
    }

    /// Load settings from a JSON file; missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
