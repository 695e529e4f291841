// src/codec/graph.rs
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{AgendaError, Result};
use crate::storage::ContainerLink;

/// Current graph buffer format. Buffers written by a newer format are
/// rejected rather than guessed at.
pub const GRAPH_FORMAT_VERSION: u16 = 1;

const MAGIC: [u8; 4] = *b"BADP";

/// Which kind of node a graph buffer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphKind {
    Metadata,
    Data,
    Item,
}

impl std::fmt::Display for GraphKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl GraphKind {
    fn name(self) -> &'static str {
        match self {
            GraphKind::Metadata => "metadata section",
            GraphKind::Data => "data section",
            GraphKind::Item => "item",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GraphHeader {
    magic: [u8; 4],
    version: u16,
    kind: GraphKind,
}

/// A node of the object graph that carries a link back to its container.
///
/// The link is not part of the encoded form. Encoding runs in two phases
/// around the serializer: `detach` before, `attach` after. Decoding attaches
/// the link to the freshly built graph.
pub trait GraphNode: Serialize + DeserializeOwned {
    const KIND: GraphKind;

    /// Link this node, and everything it owns, to a container.
    fn attach(&mut self, link: &ContainerLink);

    /// Drop the link from this node and everything it owns.
    fn detach(&mut self);

    fn to_bytes(&mut self, link: &ContainerLink) -> Result<Vec<u8>> {
        encode(self, link)
    }

    fn from_bytes(bytes: &[u8], link: &ContainerLink) -> Result<Self> {
        decode(bytes, link)
    }
}

/// Encode `node`, leaving it attached to `link` afterwards whether or not
/// encoding succeeded.
pub fn encode<N: GraphNode>(node: &mut N, link: &ContainerLink) -> Result<Vec<u8>> {
    node.detach();
    let encoded = encode_detached(&*node);
    node.attach(link);
    encoded
}

fn encode_detached<N: GraphNode>(node: &N) -> Result<Vec<u8>> {
    let header = GraphHeader {
        magic: MAGIC,
        version: GRAPH_FORMAT_VERSION,
        kind: N::KIND,
    };

    let mut buf = Vec::new();
    bincode::serialize_into(&mut buf, &header)?;
    bincode::serialize_into(&mut buf, node)?;
    Ok(buf)
}

/// Decode a buffer of the node's kind and attach it to `link`.
pub fn decode<N: GraphNode>(bytes: &[u8], link: &ContainerLink) -> Result<N> {
    let mut reader = bytes;

    let header: GraphHeader =
        bincode::deserialize_from(&mut reader).map_err(|_| AgendaError::BufferTypeMismatch {
            expected: N::KIND.name(),
            found: "an unrecognised buffer".to_string(),
        })?;

    if header.magic != MAGIC {
        return Err(AgendaError::BufferTypeMismatch {
            expected: N::KIND.name(),
            found: "an unrecognised buffer".to_string(),
        });
    }
    if header.version > GRAPH_FORMAT_VERSION {
        return Err(AgendaError::schema(
            N::KIND.name(),
            format!(
                "graph format version {} is newer than supported {}",
                header.version, GRAPH_FORMAT_VERSION
            ),
        ));
    }
    if header.kind != N::KIND {
        return Err(AgendaError::BufferTypeMismatch {
            expected: N::KIND.name(),
            found: header.kind.to_string(),
        });
    }

    // Slice decoding checks length prefixes against the remaining bytes
    // before allocating.
    let mut node: N = bincode::deserialize(reader)?;
    node.attach(link);
    Ok(node)
}
