//! Error types for instantiation.

use horizon_compose_graph::{GeometryId, NodeFamily, NodeId, UnrecognizedTag};
use thiserror::Error;

/// Errors that abort an instantiation.
///
/// Every variant means the input graph is corrupt, from an incompatible
/// producer, or violates a caller invariant. None is retried; the call
/// returns no object graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InstantiationError {
    /// A node kind this build does not know.
    #[error("unrecognized {family} kind {tag} at node {node:?}")]
    UnrecognizedNode {
        node: NodeId,
        family: NodeFamily,
        tag: u32,
    },

    /// A canvas geometry kind this build does not know.
    #[error("unrecognized canvas geometry kind {tag} at geometry {geometry:?}")]
    UnrecognizedGeometry { geometry: GeometryId, tag: u32 },

    /// An enumeration value this build does not know.
    #[error(transparent)]
    UnrecognizedTag(#[from] UnrecognizedTag),

    /// The root passed to `materialize` is not a visual.
    #[error("root node {node:?} is a {kind}, not a visual")]
    RootNotVisual { node: NodeId, kind: &'static str },

    /// A node of the wrong family was found where another was required.
    #[error("node {node:?} is a {found}, expected a {expected}")]
    UnexpectedKind {
        node: NodeId,
        expected: NodeFamily,
        found: &'static str,
    },

    /// A node id that is not in the graph being instantiated.
    #[error("node {node:?} is not in the graph")]
    MissingNode { node: NodeId },

    /// A geometry id that is not in the graph being instantiated.
    #[error("geometry {geometry:?} is not in the graph")]
    MissingGeometry { geometry: GeometryId },

    /// A controller was referenced but no animator of its target starts it.
    #[error("animation controller {node:?} is never started on its target")]
    ControllerNotStarted { node: NodeId },
}

/// Result type for instantiation.
pub type InstantiationResult<T> = Result<T, InstantiationError>;

/// Errors that can occur while loading an [`InstantiatorConfig`](crate::InstantiatorConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration is not valid TOML for this schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
