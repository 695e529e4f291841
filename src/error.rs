use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgendaError {
    #[error("'{path}' is not a valid agenda file: {reason}")]
    InvalidArchive { path: PathBuf, reason: String },

    #[error("'{path}' is not a valid agenda file: missing section '{section}'")]
    MissingSection { path: PathBuf, section: String },

    #[error("Schema mismatch in {record}: {detail}")]
    SchemaMismatch { record: &'static str, detail: String },

    #[error("Theme asset not found: {0}")]
    AssetNotFound(String),

    #[error("Invalid theme id '{0}': ids name a file and may not contain path separators or '..'")]
    InvalidThemeId(String),

    #[error("Item '{0}' is detached from its container")]
    UnlinkedItem(String),

    #[error("{0} section is detached from its container")]
    UnlinkedSection(&'static str),

    #[error("Invalid graph buffer: expected {expected}, got {found}")]
    BufferTypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("'{0}' already exists. Remove it or pass --force to replace it.")]
    AlreadyExists(PathBuf),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Category '{category}' is {actual}, not {requested}")]
    CategoryShape {
        category: String,
        actual: &'static str,
        requested: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Graph codec error: {0}")]
    Codec(#[from] bincode::Error),
}

impl AgendaError {
    /// Shorthand for a record-level schema mismatch.
    pub fn schema(record: &'static str, detail: impl Into<String>) -> Self {
        AgendaError::SchemaMismatch {
            record,
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AgendaError>;
