// src/storage/assets.rs
//! Theme image assets stored as `<id>.png` in the staging files directory.
//!
//! Writing is a raw byte copy; nothing is decoded or re-encoded on the way
//! in. Decoding happens only when an image is read back.

use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{AgendaError, Result};

/// Where the bytes of a new theme image come from.
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    Path(&'a Path),
    Bytes(&'a [u8]),
}

impl<'a> From<&'a Path> for ImageSource<'a> {
    fn from(path: &'a Path) -> Self {
        ImageSource::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for ImageSource<'a> {
    fn from(path: &'a PathBuf) -> Self {
        ImageSource::Path(path.as_path())
    }
}

impl<'a> From<&'a [u8]> for ImageSource<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        ImageSource::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for ImageSource<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        ImageSource::Bytes(bytes.as_slice())
    }
}

impl ImageSource<'_> {
    fn read(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            ImageSource::Path(path) => Ok(Cow::Owned(fs::read(path)?)),
            ImageSource::Bytes(bytes) => Ok(Cow::Borrowed(*bytes)),
        }
    }
}

/// A decoded theme image together with the raw bytes it was read from.
#[derive(Debug, Clone)]
pub struct ThemeImage {
    id: String,
    bytes: Vec<u8>,
    image: DynamicImage,
}

impl ThemeImage {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The stored file contents, byte for byte.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Reject ids that would place the asset outside the files directory.
pub fn validate_theme_id(theme_id: &str) -> Result<()> {
    let escapes = theme_id.is_empty()
        || theme_id.contains(['/', '\\'])
        || theme_id.contains("..");
    if escapes {
        return Err(AgendaError::InvalidThemeId(theme_id.to_string()));
    }
    Ok(())
}

pub fn asset_path(files_dir: &Path, theme_id: &str) -> PathBuf {
    files_dir.join(format!("{}.png", theme_id))
}

/// Copy the source bytes to `<files_dir>/<theme_id>.png`, replacing any
/// previous asset for that id.
pub fn write_theme_asset(
    files_dir: &Path,
    theme_id: &str,
    source: ImageSource<'_>,
) -> Result<PathBuf> {
    validate_theme_id(theme_id)?;
    let path = asset_path(files_dir, theme_id);
    let bytes = source.read()?;
    fs::write(&path, bytes.as_ref())?;
    Ok(path)
}

/// Read and decode `<files_dir>/<theme_id>.png`.
pub fn read_theme_asset(files_dir: &Path, theme_id: &str) -> Result<ThemeImage> {
    validate_theme_id(theme_id)?;
    let path = asset_path(files_dir, theme_id);
    let bytes = fs::read(&path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            AgendaError::AssetNotFound(theme_id.to_string())
        } else {
            AgendaError::Io(e)
        }
    })?;
    let image = image::load_from_memory(&bytes)?;

    Ok(ThemeImage {
        id: theme_id.to_string(),
        bytes,
        image,
    })
}
