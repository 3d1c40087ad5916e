//! Description graph nodes.
//!
//! A [`Node`] is the value a producer hands to
//! [`SourceGraph::insert`](crate::SourceGraph::insert). Each concrete kind is a
//! variant of [`NodeKind`]. Optional properties are `Option`s: `None` leaves
//! the native default in place, `Some` is always written, even when it holds
//! a zero value.

use std::fmt;
use std::time::Duration;

use slotmap::new_key_type;

use crate::canvas::GeometryId;
use crate::types::{
    Affine2, BorderMode, Color, ExtendMode, LineJoin, Mat4, MappingMode, StrokeCap, Tag, Vec2,
    Vec3, Vec4,
};

new_key_type! {
    /// Identity of a node in a [`SourceGraph`](crate::SourceGraph).
    ///
    /// Memoization during instantiation is keyed by this identity, never by
    /// node contents: two equal nodes inserted separately are two objects.
    pub struct NodeId;
}

/// Broad category of a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeFamily {
    Visual,
    Shape,
    Geometry,
    Path,
    Brush,
    GradientStop,
    Clip,
    ViewBox,
    Animation,
    Easing,
    AnimationController,
    PropertySet,
}

impl fmt::Display for NodeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Visual => "visual",
            Self::Shape => "shape",
            Self::Geometry => "geometry",
            Self::Path => "path",
            Self::Brush => "brush",
            Self::GradientStop => "gradient stop",
            Self::Clip => "clip",
            Self::ViewBox => "view box",
            Self::Animation => "animation",
            Self::Easing => "easing function",
            Self::AnimationController => "animation controller",
            Self::PropertySet => "property set",
        };
        f.write_str(name)
    }
}

/// A value stored in a property set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Boolean(bool),
    Scalar(f32),
    Vector2(Vec2),
    Vector3(Vec3),
    Vector4(Vec4),
    Color(Color),
}

/// An animation to start on a node once it is materialized.
#[derive(Debug, Clone, PartialEq)]
pub struct Animator {
    /// Name of the animated property on the node.
    pub property: String,
    /// The animation node.
    pub animation: NodeId,
    /// Optional [`AnimationController`] node driving the animation.
    pub controller: Option<NodeId>,
}

/// Named values and animators for a node's companion property set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    pub values: Vec<(String, PropertyValue)>,
    pub animators: Vec<Animator>,
}

impl PropertyBag {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.animators.is_empty()
    }
}

/// A node as supplied to the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub comment: Option<String>,
    pub animators: Vec<Animator>,
    /// Contents of the companion property set. For a property-set node the
    /// values and animators are merged into the set itself.
    pub properties: PropertyBag,
}

impl Node {
    pub fn new(kind: impl Into<NodeKind>) -> Self {
        Self {
            kind: kind.into(),
            comment: None,
            animators: Vec::new(),
            properties: PropertyBag::default(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Animate `property` with `animation`.
    pub fn animate(mut self, property: impl Into<String>, animation: NodeId) -> Self {
        self.animators.push(Animator {
            property: property.into(),
            animation,
            controller: None,
        });
        self
    }

    /// Animate `property` with `animation`, driven by `controller`.
    pub fn animate_with_controller(
        mut self,
        property: impl Into<String>,
        animation: NodeId,
        controller: NodeId,
    ) -> Self {
        self.animators.push(Animator {
            property: property.into(),
            animation,
            controller: Some(controller),
        });
        self
    }

    /// Add a named value to the companion property set.
    pub fn with_property(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.values.push((name.into(), value));
        self
    }

    /// Animate a named value of the companion property set.
    pub fn animate_property(mut self, name: impl Into<String>, animation: NodeId) -> Self {
        self.properties.animators.push(Animator {
            property: name.into(),
            animation,
            controller: None,
        });
        self
    }
}

impl From<NodeKind> for Node {
    fn from(kind: NodeKind) -> Self {
        Self::new(kind)
    }
}

/// A node stored in a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceNode {
    pub(crate) kind: NodeKind,
    pub(crate) comment: Option<String>,
    pub(crate) animators: Vec<Animator>,
    pub(crate) properties: NodeId,
    pub(crate) owner: Option<NodeId>,
    pub(crate) driver: Option<NodeId>,
}

impl SourceNode {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn animators(&self) -> &[Animator] {
        &self.animators
    }

    /// The companion property set. A property set is its own companion.
    pub fn properties(&self) -> NodeId {
        self.properties
    }

    /// For a companion property set, the node it belongs to.
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    /// For an animation controller, the first node inserted with an animator
    /// it drives.
    pub fn driver(&self) -> Option<NodeId> {
        self.driver
    }
}

// ---------------------------------------------------------------------------
// Visuals

/// Properties common to every visual.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualProperties {
    pub border_mode: Option<Tag<BorderMode>>,
    pub center_point: Option<Vec3>,
    pub clip: Option<NodeId>,
    pub is_visible: Option<bool>,
    pub offset: Option<Vec3>,
    pub opacity: Option<f32>,
    pub rotation_angle_in_degrees: Option<f32>,
    pub rotation_axis: Option<Vec3>,
    pub scale: Option<Vec3>,
    pub size: Option<Vec2>,
    pub transform_matrix: Option<Mat4>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerVisual {
    pub visual: VisualProperties,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeVisual {
    pub visual: VisualProperties,
    pub children: Vec<NodeId>,
    pub shapes: Vec<NodeId>,
    pub view_box: Option<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpriteVisual {
    pub visual: VisualProperties,
    pub children: Vec<NodeId>,
    pub brush: Option<NodeId>,
}

// ---------------------------------------------------------------------------
// Shapes

/// Properties common to every shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeProperties {
    pub center_point: Option<Vec2>,
    pub offset: Option<Vec2>,
    pub rotation_angle_in_degrees: Option<f32>,
    pub scale: Option<Vec2>,
    pub transform_matrix: Option<Affine2>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerShape {
    pub shape: ShapeProperties,
    pub shapes: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpriteShape {
    pub shape: ShapeProperties,
    pub geometry: Option<NodeId>,
    pub fill_brush: Option<NodeId>,
    pub stroke_brush: Option<NodeId>,
    /// Empty means unset.
    pub stroke_dash_array: Vec<f32>,
    pub stroke_dash_cap: Option<Tag<StrokeCap>>,
    pub stroke_dash_offset: Option<f32>,
    pub stroke_start_cap: Option<Tag<StrokeCap>>,
    pub stroke_end_cap: Option<Tag<StrokeCap>>,
    pub stroke_line_join: Option<Tag<LineJoin>>,
    pub stroke_miter_limit: Option<f32>,
    pub stroke_thickness: Option<f32>,
    pub is_stroke_non_scaling: Option<bool>,
}

// ---------------------------------------------------------------------------
// Geometries

/// Trim properties common to every composition geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryProperties {
    pub trim_start: Option<f32>,
    pub trim_end: Option<f32>,
    pub trim_offset: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EllipseGeometry {
    pub geometry: GeometryProperties,
    pub center: Option<Vec2>,
    pub radius: Option<Vec2>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RectangleGeometry {
    pub geometry: GeometryProperties,
    pub offset: Option<Vec2>,
    pub size: Option<Vec2>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundedRectangleGeometry {
    pub geometry: GeometryProperties,
    pub corner_radius: Option<Vec2>,
    pub offset: Option<Vec2>,
    pub size: Option<Vec2>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathGeometry {
    pub geometry: GeometryProperties,
    /// A [`NodeKind::Path`] node.
    pub path: Option<NodeId>,
}

/// A path object wrapping a canvas geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PathNode {
    pub geometry: GeometryId,
}

// ---------------------------------------------------------------------------
// Brushes

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorBrush {
    pub color: Option<Color>,
}

/// Properties common to gradient brushes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradientProperties {
    /// [`NodeKind::ColorGradientStop`] nodes, in order.
    pub color_stops: Vec<NodeId>,
    pub extend_mode: Option<Tag<ExtendMode>>,
    pub mapping_mode: Option<Tag<MappingMode>>,
    pub transform_matrix: Option<Affine2>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearGradientBrush {
    pub gradient: GradientProperties,
    pub start_point: Option<Vec2>,
    pub end_point: Option<Vec2>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadialGradientBrush {
    pub gradient: GradientProperties,
    pub ellipse_center: Option<Vec2>,
    pub ellipse_radius: Option<Vec2>,
    pub gradient_origin_offset: Option<Vec2>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorGradientStop {
    pub color: Option<Color>,
    pub offset: Option<f32>,
}

// ---------------------------------------------------------------------------
// Clips and view boxes

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipProperties {
    pub center_point: Option<Vec2>,
    pub scale: Option<Vec2>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsetClip {
    pub clip: ClipProperties,
    pub left_inset: Option<f32>,
    pub top_inset: Option<f32>,
    pub right_inset: Option<f32>,
    pub bottom_inset: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometricClip {
    pub clip: ClipProperties,
    pub geometry: Option<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewBox {
    pub offset: Option<Vec2>,
    pub size: Option<Vec2>,
}

// ---------------------------------------------------------------------------
// Animations

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpressionAnimation {
    pub expression: String,
    pub target: Option<String>,
    /// Named objects the expression refers to.
    pub reference_parameters: Vec<(String, NodeId)>,
}

impl ExpressionAnimation {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            ..Default::default()
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, node: NodeId) -> Self {
        self.reference_parameters.push((name.into(), node));
        self
    }
}

/// The value type animated by a key frame animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationValueType {
    Scalar,
    Vector2,
    Vector3,
    Vector4,
    Color,
    Boolean,
    Path,
}

/// The value at a key frame.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyFrameValue {
    Scalar(f32),
    Vector2(Vec2),
    Vector3(Vec3),
    Vector4(Vec4),
    Color(Color),
    Boolean(bool),
    /// A [`NodeKind::Path`] node.
    Path(NodeId),
    /// An expression evaluated at the key frame.
    Expression(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyFrame {
    pub progress: f32,
    pub value: KeyFrameValue,
    /// An easing-function node.
    pub easing: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyFrameAnimation {
    pub value_type: AnimationValueType,
    pub duration: Duration,
    pub target: Option<String>,
    pub reference_parameters: Vec<(String, NodeId)>,
    pub key_frames: Vec<KeyFrame>,
}

impl KeyFrameAnimation {
    pub fn new(value_type: AnimationValueType, duration: Duration) -> Self {
        Self {
            value_type,
            duration,
            target: None,
            reference_parameters: Vec::new(),
            key_frames: Vec::new(),
        }
    }

    pub fn key_frame(mut self, progress: f32, value: KeyFrameValue, easing: Option<NodeId>) -> Self {
        self.key_frames.push(KeyFrame {
            progress,
            value,
            easing,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CubicBezierEasing {
    pub control_point1: Vec2,
    pub control_point2: Vec2,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepEasing {
    pub step_count: Option<i32>,
    pub initial_step: Option<i32>,
    pub final_step: Option<i32>,
    pub is_initial_step_single_frame: Option<bool>,
    pub is_final_step_single_frame: Option<bool>,
}

/// Controls the animations started through animators that name it.
///
/// The animator that starts an animation decides what is animated; the
/// controller object is whatever the first such start returns. `target` and
/// `property` describe the controlled animation for diagnostics and are not
/// checked against those animators. `target` is also the node materialized
/// when the controller is referenced before any node that drives it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationController {
    pub target: NodeId,
    pub property: String,
    pub is_paused: bool,
    pub progress: Option<f32>,
}

/// A standalone property set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySet {
    pub values: Vec<(String, PropertyValue)>,
}

/// A node kind this build does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnrecognizedNode {
    pub family: NodeFamily,
    pub tag: u32,
}

// ---------------------------------------------------------------------------

/// Every concrete kind of description node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    ContainerVisual(ContainerVisual),
    ShapeVisual(ShapeVisual),
    SpriteVisual(SpriteVisual),
    ContainerShape(ContainerShape),
    SpriteShape(SpriteShape),
    EllipseGeometry(EllipseGeometry),
    RectangleGeometry(RectangleGeometry),
    RoundedRectangleGeometry(RoundedRectangleGeometry),
    PathGeometry(PathGeometry),
    Path(PathNode),
    ColorBrush(ColorBrush),
    LinearGradientBrush(LinearGradientBrush),
    RadialGradientBrush(RadialGradientBrush),
    ColorGradientStop(ColorGradientStop),
    InsetClip(InsetClip),
    GeometricClip(GeometricClip),
    ViewBox(ViewBox),
    ExpressionAnimation(ExpressionAnimation),
    KeyFrameAnimation(KeyFrameAnimation),
    LinearEasing,
    CubicBezierEasing(CubicBezierEasing),
    StepEasing(StepEasing),
    AnimationController(AnimationController),
    PropertySet(PropertySet),
    Unrecognized(UnrecognizedNode),
}

impl NodeKind {
    pub fn family(&self) -> NodeFamily {
        match self {
            Self::ContainerVisual(_) | Self::ShapeVisual(_) | Self::SpriteVisual(_) => {
                NodeFamily::Visual
            }
            Self::ContainerShape(_) | Self::SpriteShape(_) => NodeFamily::Shape,
            Self::EllipseGeometry(_)
            | Self::RectangleGeometry(_)
            | Self::RoundedRectangleGeometry(_)
            | Self::PathGeometry(_) => NodeFamily::Geometry,
            Self::Path(_) => NodeFamily::Path,
            Self::ColorBrush(_) | Self::LinearGradientBrush(_) | Self::RadialGradientBrush(_) => {
                NodeFamily::Brush
            }
            Self::ColorGradientStop(_) => NodeFamily::GradientStop,
            Self::InsetClip(_) | Self::GeometricClip(_) => NodeFamily::Clip,
            Self::ViewBox(_) => NodeFamily::ViewBox,
            Self::ExpressionAnimation(_) | Self::KeyFrameAnimation(_) => NodeFamily::Animation,
            Self::LinearEasing | Self::CubicBezierEasing(_) | Self::StepEasing(_) => {
                NodeFamily::Easing
            }
            Self::AnimationController(_) => NodeFamily::AnimationController,
            Self::PropertySet(_) => NodeFamily::PropertySet,
            Self::Unrecognized(unrecognized) => unrecognized.family,
        }
    }

    /// Short name of the concrete kind, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ContainerVisual(_) => "ContainerVisual",
            Self::ShapeVisual(_) => "ShapeVisual",
            Self::SpriteVisual(_) => "SpriteVisual",
            Self::ContainerShape(_) => "ContainerShape",
            Self::SpriteShape(_) => "SpriteShape",
            Self::EllipseGeometry(_) => "EllipseGeometry",
            Self::RectangleGeometry(_) => "RectangleGeometry",
            Self::RoundedRectangleGeometry(_) => "RoundedRectangleGeometry",
            Self::PathGeometry(_) => "PathGeometry",
            Self::Path(_) => "Path",
            Self::ColorBrush(_) => "ColorBrush",
            Self::LinearGradientBrush(_) => "LinearGradientBrush",
            Self::RadialGradientBrush(_) => "RadialGradientBrush",
            Self::ColorGradientStop(_) => "ColorGradientStop",
            Self::InsetClip(_) => "InsetClip",
            Self::GeometricClip(_) => "GeometricClip",
            Self::ViewBox(_) => "ViewBox",
            Self::ExpressionAnimation(_) => "ExpressionAnimation",
            Self::KeyFrameAnimation(_) => "KeyFrameAnimation",
            Self::LinearEasing => "LinearEasing",
            Self::CubicBezierEasing(_) => "CubicBezierEasing",
            Self::StepEasing(_) => "StepEasing",
            Self::AnimationController(_) => "AnimationController",
            Self::PropertySet(_) => "PropertySet",
            Self::Unrecognized(_) => "Unrecognized",
        }
    }

    pub fn is_visual(&self) -> bool {
        self.family() == NodeFamily::Visual
    }

    /// Every node this kind refers to, in declaration order.
    pub fn node_references(&self) -> Vec<NodeId> {
        fn visual(v: &VisualProperties, out: &mut Vec<NodeId>) {
            out.extend(v.clip);
        }

        let mut out = Vec::new();
        match self {
            Self::ContainerVisual(n) => {
                visual(&n.visual, &mut out);
                out.extend(&n.children);
            }
            Self::ShapeVisual(n) => {
                visual(&n.visual, &mut out);
                out.extend(&n.children);
                out.extend(&n.shapes);
                out.extend(n.view_box);
            }
            Self::SpriteVisual(n) => {
                visual(&n.visual, &mut out);
                out.extend(&n.children);
                out.extend(n.brush);
            }
            Self::ContainerShape(n) => out.extend(&n.shapes),
            Self::SpriteShape(n) => {
                out.extend(n.geometry);
                out.extend(n.fill_brush);
                out.extend(n.stroke_brush);
            }
            Self::PathGeometry(n) => out.extend(n.path),
            Self::LinearGradientBrush(n) => out.extend(&n.gradient.color_stops),
            Self::RadialGradientBrush(n) => out.extend(&n.gradient.color_stops),
            Self::GeometricClip(n) => out.extend(n.geometry),
            Self::ExpressionAnimation(n) => {
                out.extend(n.reference_parameters.iter().map(|(_, id)| *id));
            }
            Self::KeyFrameAnimation(n) => {
                out.extend(n.reference_parameters.iter().map(|(_, id)| *id));
                for frame in &n.key_frames {
                    if let KeyFrameValue::Path(path) = frame.value {
                        out.push(path);
                    }
                    out.extend(frame.easing);
                }
            }
            Self::AnimationController(n) => out.push(n.target),
            Self::EllipseGeometry(_)
            | Self::RectangleGeometry(_)
            | Self::RoundedRectangleGeometry(_)
            | Self::Path(_)
            | Self::ColorBrush(_)
            | Self::ColorGradientStop(_)
            | Self::InsetClip(_)
            | Self::ViewBox(_)
            | Self::LinearEasing
            | Self::CubicBezierEasing(_)
            | Self::StepEasing(_)
            | Self::PropertySet(_)
            | Self::Unrecognized(_) => {}
        }
        out
    }

    /// Canvas geometry this kind refers to.
    pub fn geometry_reference(&self) -> Option<GeometryId> {
        match self {
            Self::Path(path) => Some(path.geometry),
            _ => None,
        }
    }
}

macro_rules! impl_from_kind {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl From<$variant> for NodeKind {
                fn from(value: $variant) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

impl_from_kind!(
    ContainerVisual,
    ShapeVisual,
    SpriteVisual,
    ContainerShape,
    SpriteShape,
    EllipseGeometry,
    RectangleGeometry,
    RoundedRectangleGeometry,
    PathGeometry,
    ColorBrush,
    LinearGradientBrush,
    RadialGradientBrush,
    ColorGradientStop,
    InsetClip,
    GeometricClip,
    ViewBox,
    ExpressionAnimation,
    KeyFrameAnimation,
    CubicBezierEasing,
    StepEasing,
    AnimationController,
    PropertySet,
);

impl From<PathNode> for NodeKind {
    fn from(value: PathNode) -> Self {
        Self::Path(value)
    }
}

impl From<UnrecognizedNode> for NodeKind {
    fn from(value: UnrecognizedNode) -> Self {
        Self::Unrecognized(value)
    }
}
