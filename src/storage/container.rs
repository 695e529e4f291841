// src/storage/container.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use super::archive::{self, DATA_SECTION, META_SECTION};
use super::assets::{self, ImageSource, ThemeImage};
use super::link::ContainerLink;
use crate::codec::GraphNode;
use crate::config::ContainerConfig;
use crate::entity::{Category, Item, Theme};
use crate::error::Result;
use crate::section::{CategoryShape, DataSection, MetadataSection};

/// An open agenda file.
///
/// The archive is unpacked into a private staging directory on open. Every
/// mutation re-encodes both sections into the staging directory and
/// rebuilds the archive from it. `close` does a final update and removes the
/// staging directory; dropping without `close` removes it without updating.
pub struct AgendaFile {
    path: PathBuf,
    config: ContainerConfig,
    link: ContainerLink,
    meta: MetadataSection,
    data: DataSection,
}

impl AgendaFile {
    /// Open `path` with the default configuration.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, ContainerConfig::default())
    }

    /// Open an existing archive, or start an empty one if `path` does not
    /// exist yet. Nothing is written for a new file until the first update.
    pub fn open_with(path: impl AsRef<Path>, config: ContainerConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let link = ContainerLink::create(&config.temp_root)?;

        if !path.exists() {
            debug!(
                path = %path.display(),
                staging = %link.staging_dir().display(),
                "starting new agenda file"
            );
            return Ok(Self {
                meta: MetadataSection::new(&link),
                data: DataSection::new(&link),
                path,
                config,
                link,
            });
        }

        match load(&path, &link) {
            Ok((meta, data)) => {
                info!(
                    path = %path.display(),
                    categories = data.len(),
                    themes = meta.themes().len(),
                    "opened agenda file"
                );
                Ok(Self {
                    path,
                    config,
                    link,
                    meta,
                    data,
                })
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to open agenda file");
                if let Err(cleanup) = fs::remove_dir_all(link.staging_dir()) {
                    warn!(
                        staging = %link.staging_dir().display(),
                        error = %cleanup,
                        "failed to remove staging directory"
                    );
                }
                Err(e)
            }
        }
    }

    /// Build a container at `path` from raw dictionaries, as produced by
    /// import tooling, and write it out immediately.
    pub fn from_dicts(
        meta: &Value,
        data: &Value,
        path: impl AsRef<Path>,
        config: ContainerConfig,
    ) -> Result<Self> {
        let mut file = Self::open_with(path, config)?;
        file.meta = MetadataSection::from_dict(meta, &file.link)?;
        file.data = DataSection::from_dict(data, &file.link)?;
        file.update()?;
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    pub fn staging_dir(&self) -> &Path {
        self.link.staging_dir()
    }

    pub fn files_dir(&self) -> &Path {
        self.link.files_dir()
    }

    pub fn meta(&self) -> &MetadataSection {
        &self.meta
    }

    pub fn data(&self) -> &DataSection {
        &self.data
    }

    /// Re-encode both sections into the staging directory and rebuild the
    /// archive.
    pub fn update(&mut self) -> Result<()> {
        let meta = self.meta.to_bytes(&self.link)?;
        let data = self.data.to_bytes(&self.link)?;

        fs::write(self.link.staging_dir().join(META_SECTION), &meta)?;
        fs::write(self.link.staging_dir().join(DATA_SECTION), &data)?;
        debug!(meta_bytes = meta.len(), data_bytes = data.len(), "sections staged");

        self.save()
    }

    /// Write the archive to its own path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&self.path)
    }

    /// Write the archive to `destination`, e.g. to keep a copy elsewhere.
    /// Any file already at `destination` is replaced.
    pub fn save_to(&self, destination: impl AsRef<Path>) -> Result<()> {
        let destination = destination.as_ref();
        let entries =
            archive::write(self.link.staging_dir(), destination, self.config.compression)?;
        info!(path = %destination.display(), entries, "archive saved");
        Ok(())
    }

    /// Final update, then remove the staging directory.
    pub fn close(mut self) -> Result<()> {
        self.update()?;
        fs::remove_dir_all(self.link.staging_dir())?;
        info!(path = %self.path.display(), "closed agenda file");
        Ok(())
    }

    /// Store an image as theme `id` (generated when `None`) and register it.
    ///
    /// The bytes are copied as-is. The theme record is only appended if the
    /// id is new, but the archive is always rebuilt so the image is flushed.
    /// Returns the theme id.
    pub fn add_theme<'a>(
        &mut self,
        source: impl Into<ImageSource<'a>>,
        name: &str,
        id: Option<&str>,
    ) -> Result<String> {
        let theme = Theme::new(name, id.map(str::to_string));
        assets::write_theme_asset(self.link.files_dir(), &theme.id, source.into())?;

        let id = theme.id.clone();
        let added = self.meta.add_theme(theme);
        debug!(theme = %id, added, "theme asset written");

        self.update()?;
        Ok(id)
    }

    /// Open and decode the image of theme `id`.
    pub fn get_image(&self, id: &str) -> Result<ThemeImage> {
        self.data.theme_image(id)
    }

    /// Register a category record in the metadata catalog.
    ///
    /// Returns whether it was new; an existing name is left untouched.
    pub fn add_category(&mut self, category: Category) -> Result<bool> {
        let added = self.meta.add_category(category);
        if added {
            self.refresh_counts();
            self.update()?;
        }
        Ok(added)
    }

    /// Create an empty data category of the given shape.
    pub fn create_category(&mut self, category: &str, shape: CategoryShape) -> Result<bool> {
        let created = self.data.create_category(category, shape)?;
        if created {
            self.update()?;
        }
        Ok(created)
    }

    /// File `item` under `date` in a date-indexed category.
    pub fn insert_dated_item(
        &mut self,
        category: &str,
        date: &str,
        item: Item,
    ) -> Result<Option<Item>> {
        let previous = self.data.insert_dated(category, date, item)?;
        self.refresh_counts();
        self.update()?;
        Ok(previous)
    }

    /// Append `item` to a sequenced category.
    pub fn push_item(&mut self, category: &str, item: Item) -> Result<()> {
        self.data.push_item(category, item)?;
        self.refresh_counts();
        self.update()
    }

    fn refresh_counts(&mut self) {
        self.meta.set_data_count(self.data.item_count() as u64);
        for category in self.meta.categories_mut() {
            if let Some(entries) = self.data.get(&category.name) {
                category.count = entries.len() as i64;
            }
        }
    }
}

impl Drop for AgendaFile {
    fn drop(&mut self) {
        let staging = self.link.staging_dir();
        if staging.exists() {
            warn!(
                path = %self.path.display(),
                "agenda file dropped without close; discarding staging directory"
            );
            let _ = fs::remove_dir_all(staging);
        }
    }
}

fn load(path: &Path, link: &ContainerLink) -> Result<(MetadataSection, DataSection)> {
    let entries = archive::extract(path, link.staging_dir())?;
    fs::create_dir_all(link.files_dir())?;
    debug!(path = %path.display(), entries, "archive extracted");

    let meta_bytes = fs::read(link.staging_dir().join(META_SECTION))?;
    let data_bytes = fs::read(link.staging_dir().join(DATA_SECTION))?;

    let meta = MetadataSection::from_bytes(&meta_bytes, link)?;
    let data = DataSection::from_bytes(&data_bytes, link)?;
    Ok((meta, data))
}
