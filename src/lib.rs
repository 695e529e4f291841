pub mod cli;
pub mod codec;
pub mod config;
pub mod entity;
pub mod error;
pub mod section;
pub mod storage;

pub use config::{ArchiveCompression, ContainerConfig};
pub use entity::{Category, Item, Theme};
pub use error::{AgendaError, Result};
pub use section::{CategoryEntries, CategoryShape, DataSection, MetadataSection};
pub use storage::{AgendaFile, ImageSource, ThemeImage};
