//! Platform-neutral composition description graphs.
//!
//! This crate holds the input side of Horizon Compose: an immutable DAG of
//! visuals, shapes, geometries, brushes, clips, animations, easing functions,
//! animation controllers and property sets, as produced by an animation
//! translator. The `horizon-compose` crate turns such a graph into live
//! objects on a native compositor.
//!
//! - **Arena storage**: [`SourceGraph`] stores nodes in a slot map; a
//!   [`NodeId`] is a node's identity
//! - **Node kinds**: [`NodeKind`] is a closed tagged union, one variant per
//!   concrete kind
//! - **Canvas geometries**: [`CanvasGeometry`] is a second, independent
//!   sub-graph keyed by [`GeometryId`]
//! - **Forward compatibility**: unknown kinds and enumeration values are kept
//!   as `Unrecognized` and reported when the graph is instantiated
//!
//! # Example
//!
//! ```
//! use horizon_compose_graph::{
//!     Color, ColorBrush, ContainerVisual, EllipseGeometry, Node, NodeKind, ShapeVisual,
//!     SourceGraph, SpriteShape, Vec2,
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
//! let root = graph.insert(
//!     Node::new(ContainerVisual { children: vec![shapes], ..Default::default() })
//!         .with_comment("root"),
//! )?;
//!
//! assert!(graph.node(root).unwrap().kind().is_visual());
//! # Ok::<(), horizon_compose_graph::GraphError>(())
//! ```

mod canvas;
mod error;
mod graph;
pub mod logging;
mod node;
mod types;

pub use canvas::{CanvasGeometry, GeometryId, PathBuilder, PathCommand};
pub use error::{GraphError, GraphResult, UnrecognizedTag};
pub use graph::SourceGraph;
pub use node::{
    AnimationController, AnimationValueType, Animator, ClipProperties, ColorBrush,
    ColorGradientStop, ContainerShape, ContainerVisual, CubicBezierEasing, EllipseGeometry,
    ExpressionAnimation, GeometricClip, GeometryProperties, GradientProperties, InsetClip,
    KeyFrame, KeyFrameAnimation, KeyFrameValue, LinearGradientBrush, Node, NodeFamily, NodeId,
    NodeKind, PathGeometry, PathNode, PropertyBag, PropertySet, PropertyValue,
    RadialGradientBrush, RectangleGeometry, RoundedRectangleGeometry, ShapeProperties,
    ShapeVisual, SourceNode, SpriteShape, SpriteVisual, StepEasing, UnrecognizedNode, ViewBox,
    VisualProperties,
};
pub use types::{
    Affine2, BorderMode, Color, CombineMode, Enumeration, ExtendMode, FigureLoop, FillRule,
    LineJoin, Mat4, MappingMode, StrokeCap, Tag, Vec2, Vec3, Vec4,
};
