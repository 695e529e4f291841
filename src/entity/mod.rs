// src/entity/mod.rs
mod category;
mod item;
mod theme;

pub use category::Category;
pub use item::{Item, CONTENT_DELIMITER};
pub use theme::Theme;
