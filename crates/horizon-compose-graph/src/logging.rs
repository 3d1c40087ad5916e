//! Tracing targets used by the graph crate.

/// Target names for log filtering.
pub mod targets {
    /// Node and geometry insertion.
    pub const GRAPH: &str = "horizon_compose_graph::graph";
}
