use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ContainerConfig;
use crate::entity::Item;
use crate::error::{AgendaError, Result};
use crate::section::CategoryEntries;
use crate::storage::AgendaFile;

/// Settings from `--config`, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<ContainerConfig> {
    match path {
        Some(path) => ContainerConfig::from_json_file(path),
        None => Ok(ContainerConfig::default()),
    }
}

pub fn handle_init(config: ContainerConfig, file: PathBuf) -> Result<()> {
    if file.exists() {
        return Err(AgendaError::AlreadyExists(file));
    }

    let mut agenda = AgendaFile::open_with(&file, config)?;
    agenda.update()?;
    agenda.close()?;

    println!("Created {}", file.display());
    Ok(())
}

pub fn handle_import(
    config: ContainerConfig,
    file: PathBuf,
    meta: PathBuf,
    data: PathBuf,
    force: bool,
) -> Result<()> {
    if file.exists() {
        if !force {
            return Err(AgendaError::AlreadyExists(file));
        }
        fs::remove_file(&file)?;
    }

    let meta = read_dictionary(&meta)?;
    let data = read_dictionary(&data)?;

    let agenda = AgendaFile::from_dicts(&meta, &data, &file, config)?;
    let categories = agenda.data().len();
    let items = agenda.data().item_count();
    let themes = agenda.meta().themes().len();
    agenda.close()?;

    println!(
        "Imported {} ({} categories, {} items, {} themes)",
        file.display(),
        categories,
        items,
        themes
    );
    Ok(())
}

pub fn handle_list(
    config: ContainerConfig,
    file: PathBuf,
    category: Option<String>,
    json: bool,
) -> Result<()> {
    let agenda = AgendaFile::open_with(&file, config)?;

    let selected: Vec<(&str, &CategoryEntries)> = match &category {
        Some(name) => {
            let entries = agenda
                .data()
                .get(name)
                .ok_or_else(|| AgendaError::UnknownCategory(name.clone()))?;
            vec![(name.as_str(), entries)]
        }
        None => agenda.data().iter().collect(),
    };

    if json {
        let mut out = Map::new();
        for (name, entries) in &selected {
            out.insert(name.to_string(), entries_to_json(entries)?);
        }
        println!("{}", serde_json::to_string_pretty(&Value::Object(out))?);
    } else if selected.is_empty() {
        println!("No categories found.");
    } else {
        for (name, entries) in &selected {
            let noun = if entries.len() == 1 { "item" } else { "items" };
            println!("{} ({}, {} {})", name, entries.shape(), entries.len(), noun);
            match entries {
                CategoryEntries::DateIndexed(map) => {
                    for (date, item) in map {
                        println!("  {}  {}", date, describe(item));
                    }
                }
                CategoryEntries::Sequenced(list) => {
                    for (i, item) in list.iter().enumerate() {
                        println!("  {:>3}. {}", i + 1, describe(item));
                    }
                }
            }
        }
    }

    agenda.close()
}

pub fn handle_themes(config: ContainerConfig, file: PathBuf, json: bool) -> Result<()> {
    let agenda = AgendaFile::open_with(&file, config)?;
    let themes = agenda.meta().themes();

    if json {
        println!("{}", serde_json::to_string_pretty(themes)?);
    } else if themes.is_empty() {
        println!("No themes found.");
    } else {
        println!("Themes:\n");
        for theme in themes {
            let missing = if agenda.files_dir().join(theme.asset_name()).exists() {
                ""
            } else {
                "  (image missing)"
            };
            println!("  {}  {}{}", theme.id, theme.name, missing);
        }
    }

    agenda.close()
}

pub fn handle_add_theme(
    config: ContainerConfig,
    file: PathBuf,
    image: PathBuf,
    name: String,
    id: Option<String>,
) -> Result<()> {
    let mut agenda = AgendaFile::open_with(&file, config)?;
    let id = agenda.add_theme(&image, &name, id.as_deref())?;
    agenda.close()?;

    println!("Added theme {} ({})", id, name);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn handle_add_item(
    config: ContainerConfig,
    file: PathBuf,
    category: String,
    title: String,
    date: Option<String>,
    level: i64,
    theme: String,
    content: Option<String>,
    stdin: bool,
) -> Result<()> {
    let mut content = content.unwrap_or_default();
    if stdin {
        io::stdin().read_to_string(&mut content)?;
    }

    let mut agenda = AgendaFile::open_with(&file, config)?;
    let item = Item::new(title, content, level, theme);

    match &date {
        Some(date) => {
            if let Some(previous) = agenda.insert_dated_item(&category, date, item)? {
                println!("Replaced '{}' on {}", previous.title, date);
            }
        }
        None => agenda.push_item(&category, item)?,
    }
    let total = agenda.meta().data_count();
    agenda.close()?;

    println!("Added item to {} ({} items in file)", category, total);
    Ok(())
}

pub fn handle_copy(config: ContainerConfig, file: PathBuf, destination: PathBuf) -> Result<()> {
    let agenda = AgendaFile::open_with(&file, config)?;
    agenda.save_to(&destination)?;
    agenda.close()?;

    println!("Copied {} to {}", file.display(), destination.display());
    Ok(())
}

/// Parse a JSON or YAML (by extension) dictionary file.
fn read_dictionary(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)?;
    let yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    debug!(path = %path.display(), yaml, "reading dictionary");

    if yaml {
        Ok(serde_yaml::from_str(&text)?)
    } else {
        Ok(serde_json::from_str(&text)?)
    }
}

fn entries_to_json(entries: &CategoryEntries) -> Result<Value> {
    Ok(match entries {
        CategoryEntries::DateIndexed(map) => serde_json::to_value(map)?,
        CategoryEntries::Sequenced(list) => serde_json::to_value(list)?,
    })
}

fn describe(item: &Item) -> String {
    let mut line = format!("[{}] {}", item.level, item.title);
    if !item.theme.is_empty() {
        line.push_str(&format!("  theme:{}", item.theme));
    }
    line
}
