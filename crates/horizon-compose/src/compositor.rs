//! The native compositor surface driven by the instantiator.
//!
//! [`Compositor`] is the capability set a native composition API has to
//! provide: factories for each object kind, property setters, ordered
//! collections, key frames, reference parameters, animation start/pause and
//! canvas geometry construction. Native calls are infallible from the
//! instantiator's point of view.

use std::fmt;
use std::time::Duration;

use horizon_compose_graph::{
    Affine2, BorderMode, Color, CombineMode, ExtendMode, FigureLoop, FillRule, LineJoin, Mat4,
    MappingMode, PropertyValue, StrokeCap, Vec2, Vec3, Vec4,
};

/// Kinds of native objects created through [`Compositor::create_object`].
///
/// Paths, companion property sets and animation controllers are obtained
/// through their own entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
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
    ScalarKeyFrameAnimation,
    Vector2KeyFrameAnimation,
    Vector3KeyFrameAnimation,
    Vector4KeyFrameAnimation,
    ColorKeyFrameAnimation,
    BooleanKeyFrameAnimation,
    PathKeyFrameAnimation,
    LinearEasingFunction,
    CubicBezierEasingFunction,
    StepEasingFunction,
    PropertySet,
}

/// Properties written through [`Compositor::set_property`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Comment,
    // Visual
    BorderMode,
    CenterPoint,
    Clip,
    IsVisible,
    Offset,
    Opacity,
    RotationAngleInDegrees,
    RotationAxis,
    Scale,
    Size,
    TransformMatrix,
    ViewBox,
    Brush,
    // Sprite shape
    Geometry,
    FillBrush,
    StrokeBrush,
    StrokeDashArray,
    StrokeDashCap,
    StrokeDashOffset,
    StrokeStartCap,
    StrokeEndCap,
    StrokeLineJoin,
    StrokeMiterLimit,
    StrokeThickness,
    IsStrokeNonScaling,
    // Geometry
    TrimStart,
    TrimEnd,
    TrimOffset,
    Center,
    Radius,
    CornerRadius,
    Path,
    // Brushes
    Color,
    ExtendMode,
    MappingMode,
    StartPoint,
    EndPoint,
    EllipseCenter,
    EllipseRadius,
    GradientOriginOffset,
    // Clips
    LeftInset,
    TopInset,
    RightInset,
    BottomInset,
    // Animations
    Target,
    Expression,
    Duration,
    ControlPoint1,
    ControlPoint2,
    StepCount,
    InitialStep,
    FinalStep,
    IsInitialStepSingleFrame,
    IsFinalStepSingleFrame,
    Progress,
}

impl Property {
    /// The native property name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Comment => "Comment",
            Self::BorderMode => "BorderMode",
            Self::CenterPoint => "CenterPoint",
            Self::Clip => "Clip",
            Self::IsVisible => "IsVisible",
            Self::Offset => "Offset",
            Self::Opacity => "Opacity",
            Self::RotationAngleInDegrees => "RotationAngleInDegrees",
            Self::RotationAxis => "RotationAxis",
            Self::Scale => "Scale",
            Self::Size => "Size",
            Self::TransformMatrix => "TransformMatrix",
            Self::ViewBox => "ViewBox",
            Self::Brush => "Brush",
            Self::Geometry => "Geometry",
            Self::FillBrush => "FillBrush",
            Self::StrokeBrush => "StrokeBrush",
            Self::StrokeDashArray => "StrokeDashArray",
            Self::StrokeDashCap => "StrokeDashCap",
            Self::StrokeDashOffset => "StrokeDashOffset",
            Self::StrokeStartCap => "StrokeStartCap",
            Self::StrokeEndCap => "StrokeEndCap",
            Self::StrokeLineJoin => "StrokeLineJoin",
            Self::StrokeMiterLimit => "StrokeMiterLimit",
            Self::StrokeThickness => "StrokeThickness",
            Self::IsStrokeNonScaling => "IsStrokeNonScaling",
            Self::TrimStart => "TrimStart",
            Self::TrimEnd => "TrimEnd",
            Self::TrimOffset => "TrimOffset",
            Self::Center => "Center",
            Self::Radius => "Radius",
            Self::CornerRadius => "CornerRadius",
            Self::Path => "Path",
            Self::Color => "Color",
            Self::ExtendMode => "ExtendMode",
            Self::MappingMode => "MappingMode",
            Self::StartPoint => "StartPoint",
            Self::EndPoint => "EndPoint",
            Self::EllipseCenter => "EllipseCenter",
            Self::EllipseRadius => "EllipseRadius",
            Self::GradientOriginOffset => "GradientOriginOffset",
            Self::LeftInset => "LeftInset",
            Self::TopInset => "TopInset",
            Self::RightInset => "RightInset",
            Self::BottomInset => "BottomInset",
            Self::Target => "Target",
            Self::Expression => "Expression",
            Self::Duration => "Duration",
            Self::ControlPoint1 => "ControlPoint1",
            Self::ControlPoint2 => "ControlPoint2",
            Self::StepCount => "StepCount",
            Self::InitialStep => "InitialStep",
            Self::FinalStep => "FinalStep",
            Self::IsInitialStepSingleFrame => "IsInitialStepSingleFrame",
            Self::IsFinalStepSingleFrame => "IsFinalStepSingleFrame",
            Self::Progress => "Progress",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value written to a native property. `O` is the native object handle.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<O> {
    Boolean(bool),
    Scalar(f32),
    Int(i32),
    Vector2(Vec2),
    Vector3(Vec3),
    Vector4(Vec4),
    Color(Color),
    Matrix3x2(Affine2),
    Matrix4x4(Mat4),
    ScalarArray(Vec<f32>),
    Duration(Duration),
    String(String),
    BorderMode(BorderMode),
    StrokeCap(StrokeCap),
    LineJoin(LineJoin),
    ExtendMode(ExtendMode),
    MappingMode(MappingMode),
    Object(O),
}

impl<O> From<PropertyValue> for Value<O> {
    fn from(value: PropertyValue) -> Self {
        match value {
            PropertyValue::Boolean(v) => Self::Boolean(v),
            PropertyValue::Scalar(v) => Self::Scalar(v),
            PropertyValue::Vector2(v) => Self::Vector2(v),
            PropertyValue::Vector3(v) => Self::Vector3(v),
            PropertyValue::Vector4(v) => Self::Vector4(v),
            PropertyValue::Color(v) => Self::Color(v),
        }
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl<O> From<$ty> for Value<O> {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

impl_value_from!(
    bool => Boolean,
    f32 => Scalar,
    i32 => Int,
    Vec2 => Vector2,
    Vec3 => Vector3,
    Vec4 => Vector4,
    Color => Color,
    Affine2 => Matrix3x2,
    Mat4 => Matrix4x4,
    Duration => Duration,
    String => String,
    BorderMode => BorderMode,
    StrokeCap => StrokeCap,
    LineJoin => LineJoin,
    ExtendMode => ExtendMode,
    MappingMode => MappingMode,
);

/// Ordered child collections of native objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Child visuals of a visual.
    Children,
    /// Shapes of a shape visual or container shape.
    Shapes,
    /// Color stops of a gradient brush.
    ColorStops,
}

/// What a key frame holds on the native side.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyFrameContent<O> {
    Value(Value<O>),
    Expression(String),
}

/// A key frame inserted with [`Compositor::insert_key_frame`].
#[derive(Debug, Clone, PartialEq)]
pub struct NativeKeyFrame<O> {
    pub progress: f32,
    pub content: KeyFrameContent<O>,
    pub easing: Option<O>,
}

/// A path command with every enumeration resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasPathCommand {
    BeginFigure { start: Vec2 },
    AddLine { end: Vec2 },
    AddCubicBezier {
        control_point1: Vec2,
        control_point2: Vec2,
        end: Vec2,
    },
    EndFigure { figure_loop: FigureLoop },
}

/// A native composition API.
///
/// `Object` is a handle to any native composition object, including
/// animation controllers and property sets; `Geometry` is a handle to a
/// native canvas geometry. Handles are cloned freely, so they should be cheap
/// reference-counted or index handles.
pub trait Compositor {
    type Object: Clone;
    type Geometry: Clone;

    /// Create a new object of the given kind.
    fn create_object(&mut self, kind: ObjectKind) -> Self::Object;

    /// Create a path object wrapping a canvas geometry.
    fn create_path(&mut self, geometry: &Self::Geometry) -> Self::Object;

    /// The property set every native object carries.
    fn property_set(&mut self, owner: &Self::Object) -> Self::Object;

    fn set_property(&mut self, object: &Self::Object, property: Property, value: Value<Self::Object>);

    /// Insert a named value into a property set.
    fn insert_property(&mut self, property_set: &Self::Object, name: &str, value: Value<Self::Object>);

    /// Append `item` to the end of `collection` on `container`.
    fn append(&mut self, container: &Self::Object, collection: Collection, item: &Self::Object);

    fn insert_key_frame(&mut self, animation: &Self::Object, key_frame: NativeKeyFrame<Self::Object>);

    fn set_reference_parameter(&mut self, animation: &Self::Object, name: &str, object: &Self::Object);

    /// Remove every reference parameter from an animation.
    fn clear_parameters(&mut self, animation: &Self::Object);

    /// Start `animation` on `property` of `target`, returning the controller
    /// of the running animation.
    ///
    /// The native side takes a copy of the animation's state, so the
    /// animation object may be reconfigured afterwards.
    fn start_animation(
        &mut self,
        target: &Self::Object,
        property: &str,
        animation: &Self::Object,
    ) -> Self::Object;

    fn pause(&mut self, controller: &Self::Object);

    fn create_ellipse(&mut self, center: Vec2, radius: Vec2) -> Self::Geometry;

    fn create_rounded_rectangle(&mut self, origin: Vec2, size: Vec2, radius: Vec2) -> Self::Geometry;

    fn create_combination(
        &mut self,
        a: &Self::Geometry,
        b: &Self::Geometry,
        matrix: Affine2,
        mode: CombineMode,
    ) -> Self::Geometry;

    fn create_group(&mut self, fill_rule: FillRule, geometries: &[Self::Geometry]) -> Self::Geometry;

    fn create_transformed(&mut self, source: &Self::Geometry, matrix: Affine2) -> Self::Geometry;

    fn create_path_geometry(
        &mut self,
        fill_rule: FillRule,
        commands: &[CanvasPathCommand],
    ) -> Self::Geometry;
}
