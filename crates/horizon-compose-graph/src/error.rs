//! Error types for the graph crate.

use thiserror::Error;

use crate::canvas::GeometryId;
use crate::node::NodeId;

/// Errors that can occur while building a [`SourceGraph`](crate::SourceGraph).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A node references a node id that is not in the graph.
    #[error("reference to node {node:?} which is not in the graph")]
    DanglingNode { node: NodeId },

    /// A node or geometry references a geometry id that is not in the graph.
    #[error("reference to geometry {geometry:?} which is not in the graph")]
    DanglingGeometry { geometry: GeometryId },
}

/// A raw enumeration value this build does not recognize.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unrecognized {enumeration} value {tag}")]
pub struct UnrecognizedTag {
    /// Name of the enumeration the value belongs to.
    pub enumeration: &'static str,
    /// The raw value.
    pub tag: u32,
}

/// Result type for graph construction.
pub type GraphResult<T> = Result<T, GraphError>;
