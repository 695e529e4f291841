pub mod archive;
mod assets;
mod container;
mod link;

pub use archive::{DATA_SECTION, META_SECTION};
pub use assets::{asset_path, ImageSource, ThemeImage};
pub use container::AgendaFile;
pub use link::{ContainerLink, FILES_DIR};
