// src/storage/link.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use super::assets::{self, ThemeImage};
use crate::error::Result;

/// Name of the staging subdirectory holding theme images.
pub const FILES_DIR: &str = "files";

const STAGING_PREFIX: &str = "badp-";

#[derive(Debug)]
struct StagingPaths {
    root: PathBuf,
    files: PathBuf,
}

/// Non-owning handle from sections and items back to their container.
///
/// It only names the container's staging area; the container itself owns
/// the directory and removes it on close. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct ContainerLink {
    paths: Arc<StagingPaths>,
}

impl ContainerLink {
    /// Create a fresh, uniquely named staging directory (with its `files/`
    /// subdirectory) under `temp_root`.
    pub fn create(temp_root: &Path) -> Result<Self> {
        fs::create_dir_all(temp_root)?;

        let root = temp_root.join(format!("{}{}", STAGING_PREFIX, Uuid::new_v4().simple()));
        fs::create_dir(&root)?;

        let files = root.join(FILES_DIR);
        fs::create_dir(&files)?;

        Ok(Self {
            paths: Arc::new(StagingPaths { root, files }),
        })
    }

    pub fn staging_dir(&self) -> &Path {
        &self.paths.root
    }

    pub fn files_dir(&self) -> &Path {
        &self.paths.files
    }

    pub fn load_theme_image(&self, theme_id: &str) -> Result<ThemeImage> {
        assets::read_theme_asset(self.files_dir(), theme_id)
    }
}
