//! Instantiation of composition description graphs.
//!
//! This crate turns a [`SourceGraph`](horizon_compose_graph::SourceGraph) into
//! live objects on a native compositor:
//!
//! - **Compositor surface**: [`Compositor`] is the capability set a native
//!   composition API provides
//! - **Instantiator**: [`Instantiator`] walks the graph from a root visual,
//!   creating each object once and starting animations after their
//!   dependencies exist
//! - **Recording backend**: [`recording::RecordingCompositor`] records every
//!   call for headless validation and tests
//! - **Versioned loads**: [`CompositionLoader`] discards graphs whose load
//!   was superseded
//!
//! # Example
//!
//! ```
//! use horizon_compose::recording::RecordingCompositor;
//! use horizon_compose::{Collection, Instantiator, InstantiatorConfig, ObjectKind};
//! use horizon_compose_graph::{
//!     Color, ColorBrush, ContainerVisual, EllipseGeometry, NodeKind, ShapeVisual, SourceGraph,
//!     SpriteShape, Vec2,
//! };
//!
//! let mut graph = SourceGraph::new();
//! let ellipse = graph.insert(NodeKind::from(EllipseGeometry {
//!     radius: Some(Vec2::new(5.0, 5.0)),
//!     ..Default::default()
//! }))?;
//! let red = graph.insert(NodeKind::from(ColorBrush { color: Some(Color::RED) }))?;
//! let sprite = graph.insert(NodeKind::from(SpriteShape {
//!     geometry: Some(ellipse),
//!     fill_brush: Some(red),
//!     ..Default::default()
//! }))?;
//! let shapes = graph.insert(NodeKind::from(ShapeVisual {
//!     shapes: vec![sprite],
//!     ..Default::default()
//! }))?;
//! let root = graph.insert(NodeKind::from(ContainerVisual {
//!     children: vec![shapes],
//!     ..Default::default()
//! }))?;
//!
//! let mut compositor = RecordingCompositor::new();
//! let materialized = Instantiator::new(InstantiatorConfig::default())
//!     .materialize(&mut compositor, &graph, root)?;
//!
//! let root = compositor.object(materialized.root).unwrap();
//! assert_eq!(root.items(Collection::Children).len(), 1);
//! assert_eq!(compositor.count_of(ObjectKind::SpriteShape), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod compositor;
mod config;
mod error;
mod instantiator;
mod loader;
pub mod logging;
pub mod recording;

pub use compositor::{
    CanvasPathCommand, Collection, Compositor, KeyFrameContent, NativeKeyFrame, ObjectKind,
    Property, Value,
};
pub use config::{ExpressionAnimationPolicy, InstantiatorConfig};
pub use error::{ConfigError, InstantiationError, InstantiationResult};
pub use instantiator::{InstantiationStats, Instantiator, Materialized, materialize};
pub use loader::{CompositionLoader, LoadGeneration, LoadTicket};

pub use horizon_compose_graph as graph;
