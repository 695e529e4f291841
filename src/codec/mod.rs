// src/codec/mod.rs
//! Serialization protocol shared by the metadata and data sections.
//!
//! Two codecs live here:
//! - the record codec, a JSON text form with an explicit field list per
//!   record type (categories and themes);
//! - the graph codec, a binary form for whole sections and items whose
//!   container link is detached while encoding and re-attached afterwards.

mod graph;
mod record;

pub use graph::{decode, encode, GraphKind, GraphNode, GRAPH_FORMAT_VERSION};
pub use record::Record;
