// src/section/meta.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::{GraphKind, GraphNode, Record};
use crate::entity::{Category, Theme};
use crate::error::{AgendaError, Result};
use crate::storage::ContainerLink;

pub const DEFAULT_DATE_FORMAT: &str = "MM/DD/YYYY";

const RECORD: &str = "metadata";

/// Catalog of categories and themes plus file-wide counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataSection {
    categories: Vec<Category>,
    themes: Vec<Theme>,
    data_count: u64,
    date_format: String,
    #[serde(skip)]
    link: Option<ContainerLink>,
}

impl Default for MetadataSection {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            themes: Vec::new(),
            data_count: 0,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            link: None,
        }
    }
}

impl PartialEq for MetadataSection {
    fn eq(&self, other: &Self) -> bool {
        self.categories == other.categories
            && self.themes == other.themes
            && self.data_count == other.data_count
            && self.date_format == other.date_format
    }
}

impl MetadataSection {
    /// Empty section linked to a container.
    pub fn new(link: &ContainerLink) -> Self {
        let mut section = Self::default();
        section.attach(link);
        section
    }

    /// Build from `{date_format, data_count, categories: [...], themes: [...]}`.
    pub fn from_dict(value: &Value, link: &ContainerLink) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            AgendaError::schema(RECORD, format!("expected an object, got {}", value))
        })?;
        let field = |name: &str| {
            object.get(name).ok_or_else(|| {
                AgendaError::schema(RECORD, format!("missing required field '{}'", name))
            })
        };

        let date_format = field("date_format")?
            .as_str()
            .ok_or_else(|| AgendaError::schema(RECORD, "field 'date_format' is not a string"))?
            .to_string();
        let data_count = field("data_count")?.as_u64().ok_or_else(|| {
            AgendaError::schema(RECORD, "field 'data_count' is not a non-negative integer")
        })?;

        let categories = records::<Category>(field("categories")?)?;
        let themes = records::<Theme>(field("themes")?)?;

        let mut section = Self {
            categories,
            themes,
            data_count,
            date_format,
            link: None,
        };
        section.attach(link);
        Ok(section)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn categories_mut(&mut self) -> &mut [Category] {
        &mut self.categories
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Append a category record unless one with the same name exists.
    ///
    /// Returns whether the record was added.
    pub fn add_category(&mut self, category: Category) -> bool {
        if self.category(&category.name).is_some() {
            return false;
        }
        self.categories.push(category);
        true
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn theme(&self, id: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.id == id)
    }

    pub fn contains_theme(&self, id: &str) -> bool {
        self.theme(id).is_some()
    }

    /// Append a theme record unless its id is already registered.
    ///
    /// Returns whether the record was added.
    pub fn add_theme(&mut self, theme: Theme) -> bool {
        if self.contains_theme(&theme.id) {
            return false;
        }
        self.themes.push(theme);
        true
    }

    pub fn data_count(&self) -> u64 {
        self.data_count
    }

    pub fn set_data_count(&mut self, count: u64) {
        self.data_count = count;
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn set_date_format(&mut self, format: impl Into<String>) {
        self.date_format = format.into();
    }

    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }

    /// The container link, or `UnlinkedSection` while detached.
    pub fn link(&self) -> Result<&ContainerLink> {
        self.link
            .as_ref()
            .ok_or(AgendaError::UnlinkedSection("metadata"))
    }
}

impl GraphNode for MetadataSection {
    const KIND: GraphKind = GraphKind::Metadata;

    fn attach(&mut self, link: &ContainerLink) {
        self.link = Some(link.clone());
    }

    fn detach(&mut self) {
        self.link = None;
    }
}

fn records<R: Record>(value: &Value) -> Result<Vec<R>> {
    let list = value.as_array().ok_or_else(|| {
        AgendaError::schema(RECORD, format!("expected a list of {} records", R::KIND))
    })?;
    list.iter().map(R::from_value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample() -> Value {
        json!({
            "date_format": "DD/MM/YYYY",
            "data_count": 2,
            "categories": [
                {"name": "work", "description": "Office", "type": "date", "count": 1},
                {"name": "todo", "description": "Chores", "type": "list", "count": 1}
            ],
            "themes": [{"name": "Sea", "id": "t1"}]
        })
    }

    #[test]
    fn test_new_section_defaults() {
        let tmp = TempDir::new().unwrap();
        let link = ContainerLink::create(tmp.path()).unwrap();
        let meta = MetadataSection::new(&link);

        assert!(meta.is_linked());
        assert_eq!(meta.date_format(), DEFAULT_DATE_FORMAT);
        assert_eq!(meta.data_count(), 0);
        assert!(meta.categories().is_empty());
        assert!(meta.themes().is_empty());
    }

    #[test]
    fn test_from_dict() {
        let tmp = TempDir::new().unwrap();
        let link = ContainerLink::create(tmp.path()).unwrap();
        let meta = MetadataSection::from_dict(&sample(), &link).unwrap();

        assert_eq!(meta.date_format(), "DD/MM/YYYY");
        assert_eq!(meta.data_count(), 2);
        assert_eq!(meta.categories().len(), 2);
        assert_eq!(meta.categories()[1].kind, "list");
        assert_eq!(meta.theme("t1").unwrap().name, "Sea");
        assert!(meta.is_linked());
    }

    #[test]
    fn test_from_dict_missing_themes() {
        let tmp = TempDir::new().unwrap();
        let link = ContainerLink::create(tmp.path()).unwrap();
        let mut dict = sample();
        dict.as_object_mut().unwrap().remove("themes");

        let err = MetadataSection::from_dict(&dict, &link).unwrap_err();
        assert!(matches!(err, AgendaError::SchemaMismatch { record: "metadata", .. }));
    }

    #[test]
    fn test_from_dict_bad_theme_record() {
        let tmp = TempDir::new().unwrap();
        let link = ContainerLink::create(tmp.path()).unwrap();
        let mut dict = sample();
        dict["themes"] = json!([{"name": "Sea"}]);

        let err = MetadataSection::from_dict(&dict, &link).unwrap_err();
        assert!(matches!(err, AgendaError::SchemaMismatch { record: "theme", .. }));
    }

    #[test]
    fn test_theme_ids_stay_unique() {
        let mut meta = MetadataSection::default();
        assert!(meta.add_theme(Theme::new("Sea", Some("t1".to_string()))));
        assert!(!meta.add_theme(Theme::new("Ocean", Some("t1".to_string()))));
        assert_eq!(meta.themes().len(), 1);
        assert_eq!(meta.themes()[0].name, "Sea");
    }

    #[test]
    fn test_category_names_stay_unique() {
        let mut meta = MetadataSection::default();
        assert!(meta.add_category(Category::new("work", "", "date")));
        assert!(!meta.add_category(Category::new("work", "again", "list")));
        assert_eq!(meta.categories().len(), 1);
    }

    #[test]
    fn test_detached_section_has_no_link() {
        let meta = MetadataSection::default();
        assert!(matches!(meta.link(), Err(AgendaError::UnlinkedSection("metadata"))));
    }

    #[test]
    fn test_graph_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let link = ContainerLink::create(tmp.path()).unwrap();
        let mut meta = MetadataSection::from_dict(&sample(), &link).unwrap();

        let bytes = meta.to_bytes(&link).unwrap();
        assert!(meta.is_linked());

        let restored = MetadataSection::from_bytes(&bytes, &link).unwrap();
        assert_eq!(restored, meta);
        assert!(restored.is_linked());
    }
}
