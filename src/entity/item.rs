// src/entity/item.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::{GraphKind, GraphNode};
use crate::error::{AgendaError, Result};
use crate::storage::{ContainerLink, ThemeImage};

/// Separator placed between the pieces that make up an item's content.
pub const CONTENT_DELIMITER: &str = "\r\n";

const RECORD: &str = "item";

/// A single agenda entry.
///
/// `link` points back at the owning container's staging area. It is never
/// serialized and is only absent while the item is detached for encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
    pub content: String,
    pub level: i64,
    pub theme: String,
    #[serde(skip)]
    link: Option<ContainerLink>,
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
            && self.content == other.content
            && self.level == other.level
            && self.theme == other.theme
    }
}

impl Eq for Item {}

impl Item {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        level: i64,
        theme: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            level,
            theme: theme.into(),
            link: None,
        }
    }

    /// Build an item from ordered `(key, value)` pairs.
    ///
    /// `title`, `level` and `theme` are required. The optional `content`
    /// field comes first in the resulting content, followed by every other
    /// field's value in the order given, joined by [`CONTENT_DELIMITER`].
    /// A leading delimiter (no base content) is dropped.
    pub fn from_fields<'a, I>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a Value)>,
    {
        let mut title = None;
        let mut level = None;
        let mut theme = None;
        let mut base = None;
        let mut extras = Vec::new();

        for (key, value) in fields {
            match key {
                "title" => title = Some(expect_str(key, value)?),
                "theme" => theme = Some(expect_str(key, value)?),
                "content" => base = Some(expect_str(key, value)?),
                "level" => {
                    let parsed = value.as_i64().ok_or_else(|| {
                        AgendaError::schema(
                            RECORD,
                            format!("field 'level' is not an integer: {}", value),
                        )
                    })?;
                    level = Some(parsed);
                }
                _ => extras.push(expect_str(key, value)?),
            }
        }

        let mut content = base.unwrap_or("").to_string();
        for extra in extras {
            content.push_str(CONTENT_DELIMITER);
            content.push_str(extra);
        }
        if let Some(stripped) = content.strip_prefix(CONTENT_DELIMITER) {
            content = stripped.to_string();
        }

        Ok(Self::new(
            title.ok_or_else(|| missing("title"))?,
            content,
            level.ok_or_else(|| missing("level"))?,
            theme.ok_or_else(|| missing("theme"))?,
        ))
    }

    /// Build an item from a JSON object, in document order.
    pub fn from_dict(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            AgendaError::schema(RECORD, format!("expected an object, got {}", value))
        })?;
        Self::from_fields(map.iter().map(|(key, value)| (key.as_str(), value)))
    }

    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }

    /// Open and decode this item's theme image.
    pub fn get_image(&self) -> Result<ThemeImage> {
        let link = self
            .link
            .as_ref()
            .ok_or_else(|| AgendaError::UnlinkedItem(self.title.clone()))?;

        if self.theme.is_empty() {
            return Err(AgendaError::AssetNotFound(format!(
                "<none> (item '{}' has no theme)",
                self.title
            )));
        }

        link.load_theme_image(&self.theme)
    }
}

impl GraphNode for Item {
    const KIND: GraphKind = GraphKind::Item;

    fn attach(&mut self, link: &ContainerLink) {
        self.link = Some(link.clone());
    }

    fn detach(&mut self) {
        self.link = None;
    }
}

fn expect_str<'a>(key: &str, value: &'a Value) -> Result<&'a str> {
    value.as_str().ok_or_else(|| {
        AgendaError::schema(RECORD, format!("field '{}' is not a string: {}", key, value))
    })
}

fn missing(field: &str) -> AgendaError {
    AgendaError::schema(RECORD, format!("missing required field '{}'", field))
}
