//! Tracing targets and span names used by Horizon Compose.
//!
//! Horizon Compose uses the `tracing` crate for instrumentation. Install a
//! subscriber in the application to see the output, and filter by the
//! targets below:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_compose::instantiator=trace")
//!     .init();
//! ```

/// Span names used throughout Horizon Compose.
pub mod span_names {
    /// One `materialize` call.
    pub const MATERIALIZE: &str = "horizon_compose::materialize";
}

/// Target names for log filtering.
pub mod targets {
    /// Node creation, cache hits and completion statistics.
    pub const INSTANTIATOR: &str = "horizon_compose::instantiator";
    /// Canvas geometry construction.
    pub const GEOMETRY: &str = "horizon_compose::geometry";
    /// Animation starts, pauses and expression reuse.
    pub const ANIMATION: &str = "horizon_compose::animation";
    /// Versioned loads.
    pub const LOADER: &str = "horizon_compose::loader";
}
