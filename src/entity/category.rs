// src/entity/category.rs
use serde::{Deserialize, Serialize};

use crate::codec::Record;

/// Descriptive catalog entry for one category of the data section.
///
/// Items never point at a `Category`; they are filed under the category's
/// key in the data section, and `name` is expected to match that key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Category {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub count: i64,
}

impl Category {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: kind.into(),
            count: 0,
        }
    }
}

impl Record for Category {
    const KIND: &'static str = "category";
    const FIELDS: &'static [&'static str] = &["name", "description", "type", "count"];
}
