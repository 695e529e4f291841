//! The two top-level serialized units of an agenda file.
//!
//! Both sections hold a [`ContainerLink`](crate::storage::ContainerLink)
//! back to their container, which is detached while they are encoded.

mod data;
mod meta;

pub use data::{CategoryEntries, CategoryShape, DataSection};
pub use meta::{MetadataSection, DEFAULT_DATE_FORMAT};
