// src/section/data.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::{GraphKind, GraphNode};
use crate::entity::Item;
use crate::error::{AgendaError, Result};
use crate::storage::{ContainerLink, ThemeImage};

const RECORD: &str = "data";

/// Arrangement of a category's items, fixed when the category is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryShape {
    DateIndexed,
    Sequenced,
}

impl CategoryShape {
    pub fn name(self) -> &'static str {
        match self {
            CategoryShape::DateIndexed => "date-indexed",
            CategoryShape::Sequenced => "sequenced",
        }
    }
}

impl std::fmt::Display for CategoryShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for CategoryShape {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "date-indexed" | "dated" | "date" => Ok(CategoryShape::DateIndexed),
            "sequenced" | "list" => Ok(CategoryShape::Sequenced),
            _ => Err(format!("Invalid category shape: {}", s)),
        }
    }
}

/// Items of one category: keyed by date, or kept in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryEntries {
    DateIndexed(BTreeMap<String, Item>),
    Sequenced(Vec<Item>),
}

impl CategoryEntries {
    pub fn empty(shape: CategoryShape) -> Self {
        match shape {
            CategoryShape::DateIndexed => CategoryEntries::DateIndexed(BTreeMap::new()),
            CategoryShape::Sequenced => CategoryEntries::Sequenced(Vec::new()),
        }
    }

    pub fn shape(&self) -> CategoryShape {
        match self {
            CategoryEntries::DateIndexed(_) => CategoryShape::DateIndexed,
            CategoryEntries::Sequenced(_) => CategoryShape::Sequenced,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CategoryEntries::DateIndexed(map) => map.len(),
            CategoryEntries::Sequenced(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Date-keyed view, if this category is date-indexed.
    pub fn as_dated(&self) -> Option<&BTreeMap<String, Item>> {
        match self {
            CategoryEntries::DateIndexed(map) => Some(map),
            CategoryEntries::Sequenced(_) => None,
        }
    }

    /// Ordered view, if this category is sequenced.
    pub fn as_sequence(&self) -> Option<&[Item]> {
        match self {
            CategoryEntries::DateIndexed(_) => None,
            CategoryEntries::Sequenced(list) => Some(list),
        }
    }

    /// All items; dated ones in date-key order.
    pub fn items(&self) -> Box<dyn Iterator<Item = &Item> + '_> {
        match self {
            CategoryEntries::DateIndexed(map) => Box::new(map.values()),
            CategoryEntries::Sequenced(list) => Box::new(list.iter()),
        }
    }

    fn items_mut(&mut self) -> Box<dyn Iterator<Item = &mut Item> + '_> {
        match self {
            CategoryEntries::DateIndexed(map) => Box::new(map.values_mut()),
            CategoryEntries::Sequenced(list) => Box::new(list.iter_mut()),
        }
    }
}

/// The item graph, keyed by category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSection {
    categories: BTreeMap<String, CategoryEntries>,
    #[serde(skip)]
    link: Option<ContainerLink>,
}

impl PartialEq for DataSection {
    fn eq(&self, other: &Self) -> bool {
        self.categories == other.categories
    }
}

impl DataSection {
    /// Empty section linked to a container.
    pub fn new(link: &ContainerLink) -> Self {
        let mut section = Self::default();
        section.attach(link);
        section
    }

    /// Build from `{category: {date: item, ...} | [item, ...], ...}`.
    ///
    /// An object value makes the category date-indexed, a list makes it
    /// sequenced; anything else is a schema mismatch.
    pub fn from_dict(value: &Value, link: &ContainerLink) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            AgendaError::schema(RECORD, format!("expected an object, got {}", value))
        })?;

        let mut categories = BTreeMap::new();
        for (key, current) in object {
            let entries = match current {
                Value::Object(dated) => {
                    let mut map = BTreeMap::new();
                    for (date, item) in dated {
                        map.insert(date.clone(), Item::from_dict(item)?);
                    }
                    CategoryEntries::DateIndexed(map)
                }
                Value::Array(list) => CategoryEntries::Sequenced(
                    list.iter().map(Item::from_dict).collect::<Result<_>>()?,
                ),
                other => {
                    return Err(AgendaError::schema(
                        RECORD,
                        format!(
                            "category '{}' is neither a date map nor a list: {}",
                            key, other
                        ),
                    ))
                }
            };
            categories.insert(key.clone(), entries);
        }

        let mut section = Self {
            categories,
            link: None,
        };
        section.attach(link);
        Ok(section)
    }

    /// Category keys, in key order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryEntries)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, category: &str) -> Option<&CategoryEntries> {
        self.categories.get(category)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of items across all categories.
    pub fn item_count(&self) -> usize {
        self.categories.values().map(CategoryEntries::len).sum()
    }

    /// Create an empty category with the given shape.
    ///
    /// Returns `false` if it already exists with that shape; an existing
    /// category of the other shape is an error.
    pub fn create_category(&mut self, category: &str, shape: CategoryShape) -> Result<bool> {
        if let Some(existing) = self.categories.get(category) {
            return if existing.shape() == shape {
                Ok(false)
            } else {
                Err(shape_error(category, existing.shape(), shape))
            };
        }
        self.categories
            .insert(category.to_string(), CategoryEntries::empty(shape));
        Ok(true)
    }

    /// File `item` under `date` in a date-indexed category, creating the
    /// category if needed. Returns the item previously stored for that date.
    pub fn insert_dated(
        &mut self,
        category: &str,
        date: impl Into<String>,
        mut item: Item,
    ) -> Result<Option<Item>> {
        self.create_category(category, CategoryShape::DateIndexed)?;
        if let Some(link) = &self.link {
            item.attach(link);
        }
        match self.categories.get_mut(category) {
            Some(CategoryEntries::DateIndexed(map)) => Ok(map.insert(date.into(), item)),
            _ => Err(AgendaError::UnknownCategory(category.to_string())),
        }
    }

    /// Append `item` to a sequenced category, creating the category if needed.
    pub fn push_item(&mut self, category: &str, mut item: Item) -> Result<()> {
        self.create_category(category, CategoryShape::Sequenced)?;
        if let Some(link) = &self.link {
            item.attach(link);
        }
        match self.categories.get_mut(category) {
            Some(CategoryEntries::Sequenced(list)) => {
                list.push(item);
                Ok(())
            }
            _ => Err(AgendaError::UnknownCategory(category.to_string())),
        }
    }

    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }

    /// The container link, or `UnlinkedSection` while detached.
    pub fn link(&self) -> Result<&ContainerLink> {
        self.link.as_ref().ok_or(AgendaError::UnlinkedSection("data"))
    }

    /// Open and decode the image of theme `theme_id`.
    pub fn theme_image(&self, theme_id: &str) -> Result<ThemeImage> {
        self.link()?.load_theme_image(theme_id)
    }
}

impl GraphNode for DataSection {
    const KIND: GraphKind = GraphKind::Data;

    fn attach(&mut self, link: &ContainerLink) {
        for entries in self.categories.values_mut() {
            for item in entries.items_mut() {
                item.attach(link);
            }
        }
        self.link = Some(link.clone());
    }

    fn detach(&mut self) {
        self.link = None;
        for entries in self.categories.values_mut() {
            for item in entries.items_mut() {
                item.detach();
            }
        }
    }
}

fn shape_error(category: &str, actual: CategoryShape, requested: CategoryShape) -> AgendaError {
    AgendaError::CategoryShape {
        category: category.to_string(),
        actual: actual.name(),
        requested: requested.name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample() -> Value {
        json!({
            "work": {
                "01/02/2024": {"title": "Standup", "level": 0, "theme": "t1"},
                "01/03/2024": {"title": "Review", "level": 1, "theme": "", "room": "B2"}
            },
            "todo": [
                {"title": "Milk", "level": 0, "theme": ""},
                {"title": "Bread", "level": 1, "theme": "", "content": "whole grain"}
            ]
        })
    }

    fn link(tmp: &TempDir) -> ContainerLink {
        ContainerLink::create(tmp.path()).unwrap()
    }

    #[test]
    fn test_from_dict_picks_shape_per_category() {
        let tmp = TempDir::new().unwrap();
        let data = DataSection::from_dict(&sample(), &link(&tmp)).unwrap();

        assert_eq!(data.keys().collect::<Vec<_>>(), vec!["todo", "work"]);
        assert_eq!(data.get("work").unwrap().shape(), CategoryShape::DateIndexed);
        assert_eq!(data.get("todo").unwrap().shape(), CategoryShape::Sequenced);
        assert_eq!(data.item_count(), 4);

        let work = data.get("work").unwrap().as_dated().unwrap();
        assert_eq!(work["01/03/2024"].content, "B2");

        let todo = data.get("todo").unwrap().as_sequence().unwrap();
        assert_eq!(todo[0].title, "Milk");
        assert_eq!(todo[1].content, "whole grain");
    }

    #[test]
    fn test_from_dict_links_every_item() {
        let tmp = TempDir::new().unwrap();
        let data = DataSection::from_dict(&sample(), &link(&tmp)).unwrap();
        assert!(data.is_linked());
        for (_, entries) in data.iter() {
            assert!(entries.items().all(Item::is_linked));
        }
    }

    #[test]
    fn test_from_dict_rejects_scalar_category() {
        let tmp = TempDir::new().unwrap();
        let err = DataSection::from_dict(&json!({"bad": 3}), &link(&tmp)).unwrap_err();
        assert!(matches!(err, AgendaError::SchemaMismatch { record: "data", .. }));
    }

    #[test]
    fn test_category_shape_is_stable() {
        let tmp = TempDir::new().unwrap();
        let mut data = DataSection::from_dict(&sample(), &link(&tmp)).unwrap();

        let err = data.push_item("work", Item::new("x", "", 0, "")).unwrap_err();
        assert!(matches!(err, AgendaError::CategoryShape { .. }));

        let err = data
            .insert_dated("todo", "01/01/2024", Item::new("x", "", 0, ""))
            .unwrap_err();
        assert!(matches!(err, AgendaError::CategoryShape { .. }));

        assert_eq!(data.get("work").unwrap().shape(), CategoryShape::DateIndexed);
        assert_eq!(data.get("todo").unwrap().shape(), CategoryShape::Sequenced);
        assert_eq!(data.item_count(), 4);
    }

    #[test]
    fn test_insert_dated_replaces_same_date() {
        let tmp = TempDir::new().unwrap();
        let mut data = DataSection::new(&link(&tmp));

        let previous = data.insert_dated("work", "d1", Item::new("a", "", 0, "")).unwrap();
        assert!(previous.is_none());
        let previous = data.insert_dated("work", "d1", Item::new("b", "", 0, "")).unwrap();
        assert_eq!(previous.unwrap().title, "a");

        let work = data.get("work").unwrap().as_dated().unwrap();
        assert_eq!(work.len(), 1);
        assert!(work["d1"].is_linked());
    }

    #[test]
    fn test_push_item_creates_sequence() {
        let tmp = TempDir::new().unwrap();
        let mut data = DataSection::new(&link(&tmp));
        data.push_item("todo", Item::new("a", "", 0, "")).unwrap();
        data.push_item("todo", Item::new("b", "", 0, "")).unwrap();

        let todo = data.get("todo").unwrap();
        let titles: Vec<_> = todo.items().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[test]
    fn test_create_category_is_idempotent() {
        let mut data = DataSection::default();
        assert!(data.create_category("x", CategoryShape::Sequenced).unwrap());
        assert!(!data.create_category("x", CategoryShape::Sequenced).unwrap());
        assert!(data.create_category("x", CategoryShape::DateIndexed).is_err());
    }

    #[test]
    fn test_detach_clears_item_links() {
        let tmp = TempDir::new().unwrap();
        let mut data = DataSection::from_dict(&sample(), &link(&tmp)).unwrap();
        data.detach();

        assert!(matches!(data.link(), Err(AgendaError::UnlinkedSection("data"))));
        let item = &data.get("todo").unwrap().as_sequence().unwrap()[0];
        assert!(matches!(item.get_image(), Err(AgendaError::UnlinkedItem(_))));
    }

    #[test]
    fn test_graph_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let link = link(&tmp);
        let mut data = DataSection::from_dict(&sample(), &link).unwrap();

        let bytes = data.to_bytes(&link).unwrap();
        assert!(data.is_linked());

        let restored = DataSection::from_bytes(&bytes, &link).unwrap();
        assert_eq!(restored, data);
        assert!(restored.get("work").unwrap().items().all(Item::is_linked));
    }

    #[test]
    fn test_shape_from_str() {
        assert_eq!("list".parse::<CategoryShape>().unwrap(), CategoryShape::Sequenced);
        assert_eq!("date_indexed".parse::<CategoryShape>().unwrap(), CategoryShape::DateIndexed);
        assert!("tree".parse::<CategoryShape>().is_err());
    }
}
