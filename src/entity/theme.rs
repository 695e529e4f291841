// src/entity/theme.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codec::Record;

/// A named image asset. The image itself lives in the staging files
/// directory as `<id>.png`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub id: String,
}

impl Theme {
    /// Create a theme, generating an id when none is supplied.
    pub fn new(name: impl Into<String>, id: Option<String>) -> Self {
        Self {
            name: name.into(),
            id: id.unwrap_or_else(Self::generate_id),
        }
    }

    /// Time-ordered unique token (UUID v7, hex without hyphens).
    pub fn generate_id() -> String {
        Uuid::now_v7().simple().to_string()
    }

    /// File name of the theme's image inside the files directory.
    pub fn asset_name(&self) -> String {
        format!("{}.png", self.id)
    }
}

impl Record for Theme {
    const KIND: &'static str = "theme";
    const FIELDS: &'static [&'static str] = &["name", "id"];
}
