//! Materialization of description graphs onto a [`Compositor`].
//!
//! The instantiator walks the graph depth-first from a root visual. Every
//! node produces exactly one native object per call: the object is recorded
//! in the session's memo table *before* its children are visited, and later
//! references to the same node return the recorded object without running its
//! initialization again.
//!
//! Initialization of a node runs in a fixed order:
//!
//! 1. the comment and every property that is set on the node
//! 2. children, appended in source order
//! 3. the node's companion property set
//! 4. the node's animators, each animation fully materialized before it is
//!    started
//!
//! Expression animations are the one exception to memoization when the
//! [`ExpressionAnimationPolicy::Reuse`] policy is active, unless the
//! expression node carries animators or companion values of its own; see the
//! `animation` submodule.

mod animation;
mod geometry;

use horizon_compose_graph::{
    Enumeration, GeometryId, NodeFamily, NodeId, NodeKind, SourceGraph, SourceNode, Tag,
};
use slotmap::SecondaryMap;

use crate::compositor::{Collection, Compositor, ObjectKind, Property, Value};
use crate::config::{ExpressionAnimationPolicy, InstantiatorConfig};
use crate::error::{InstantiationError, InstantiationResult};
use crate::logging::{span_names, targets};

/// Counters collected during one `materialize` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstantiationStats {
    /// Native objects created, paths included.
    pub objects_created: usize,
    /// Native canvas geometries created.
    pub geometries_created: usize,
    /// References answered from the memo tables.
    pub cache_hits: usize,
    pub animations_started: usize,
    pub controllers_paused: usize,
    /// Times the shared expression animation was reconfigured for another
    /// occurrence.
    pub expression_reuses: usize,
}

/// The result of a successful instantiation.
#[derive(Debug, Clone)]
pub struct Materialized<O> {
    /// The native object for the root visual.
    pub root: O,
    pub stats: InstantiationStats,
}

/// Turns description graphs into native object graphs.
///
/// An `Instantiator` only holds configuration; all per-call state lives in a
/// session that is dropped when [`materialize`](Self::materialize) returns.
#[derive(Debug, Clone, Default)]
pub struct Instantiator {
    config: InstantiatorConfig,
}

impl Instantiator {
    pub fn new(config: InstantiatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InstantiatorConfig {
        &self.config
    }

    /// Materialize the graph reachable from `root` on `compositor`.
    ///
    /// `root` must be a visual. On error no object graph is returned; objects
    /// already created on the compositor are simply left unreferenced.
    pub fn materialize<C: Compositor>(
        &self,
        compositor: &mut C,
        graph: &SourceGraph,
        root: NodeId,
    ) -> InstantiationResult<Materialized<C::Object>> {
        let span = tracing::info_span!(target: targets::INSTANTIATOR, span_names::MATERIALIZE, ?root);
        let _guard = span.enter();

        let node = graph
            .node(root)
            .ok_or(InstantiationError::MissingNode { node: root })?;
        if !node.kind().is_visual() {
            return Err(InstantiationError::RootNotVisual {
                node: root,
                kind: node.kind().name(),
            });
        }

        let mut session = Session::new(compositor, graph, self.config.expression_animations);
        match session.object(root) {
            Ok(object) => {
                let stats = session.stats;
                tracing::debug!(
                    target: targets::INSTANTIATOR,
                    objects = stats.objects_created,
                    geometries = stats.geometries_created,
                    cache_hits = stats.cache_hits,
                    animations = stats.animations_started,
                    "materialized graph"
                );
                Ok(Materialized {
                    root: object,
                    stats,
                })
            }
            Err(err) => {
                tracing::warn!(target: targets::INSTANTIATOR, error = %err, "instantiation failed");
                Err(err)
            }
        }
    }
}

/// Materialize `root` with the default configuration and return the root
/// object.
pub fn materialize<C: Compositor>(
    compositor: &mut C,
    graph: &SourceGraph,
    root: NodeId,
) -> InstantiationResult<C::Object> {
    Instantiator::default()
        .materialize(compositor, graph, root)
        .map(|materialized| materialized.root)
}

/// State for one `materialize` call.
struct Session<'a, C: Compositor> {
    compositor: &'a mut C,
    graph: &'a SourceGraph,
    policy: ExpressionAnimationPolicy,
    objects: SecondaryMap<NodeId, C::Object>,
    geometries: SecondaryMap<GeometryId, C::Geometry>,
    /// The shared expression animation under [`ExpressionAnimationPolicy::Reuse`].
    scratch_expression: Option<C::Object>,
    stats: InstantiationStats,
}

impl<'a, C: Compositor> Session<'a, C> {
    fn new(compositor: &'a mut C, graph: &'a SourceGraph, policy: ExpressionAnimationPolicy) -> Self {
        Self {
            compositor,
            graph,
            policy,
            objects: SecondaryMap::new(),
            geometries: SecondaryMap::new(),
            scratch_expression: None,
            stats: InstantiationStats::default(),
        }
    }

    fn node(&self, id: NodeId) -> InstantiationResult<&'a SourceNode> {
        self.graph
            .node(id)
            .ok_or(InstantiationError::MissingNode { node: id })
    }

    fn create(&mut self, kind: ObjectKind) -> C::Object {
        self.stats.objects_created += 1;
        self.compositor.create_object(kind)
    }

    /// The native object for `id`, materializing it on first use.
    fn object(&mut self, id: NodeId) -> InstantiationResult<C::Object> {
        if let Some(object) = self.objects.get(id) {
            self.stats.cache_hits += 1;
            tracing::trace!(target: targets::INSTANTIATOR, ?id, "cache hit");
            return Ok(object.clone());
        }

        let node = self.node(id)?;
        let object = match node.kind() {
            NodeKind::ContainerVisual(_) => self.create(ObjectKind::ContainerVisual),
            NodeKind::ShapeVisual(_) => self.create(ObjectKind::ShapeVisual),
            NodeKind::SpriteVisual(_) => self.create(ObjectKind::SpriteVisual),
            NodeKind::ContainerShape(_) => self.create(ObjectKind::ContainerShape),
            NodeKind::SpriteShape(_) => self.create(ObjectKind::SpriteShape),
            NodeKind::EllipseGeometry(_) => self.create(ObjectKind::EllipseGeometry),
            NodeKind::RectangleGeometry(_) => self.create(ObjectKind::RectangleGeometry),
            NodeKind::RoundedRectangleGeometry(_) => {
                self.create(ObjectKind::RoundedRectangleGeometry)
            }
            NodeKind::PathGeometry(_) => self.create(ObjectKind::PathGeometry),
            NodeKind::Path(path) => {
                let geometry = self.canvas_geometry(path.geometry)?;
                self.stats.objects_created += 1;
                self.compositor.create_path(&geometry)
            }
            NodeKind::ColorBrush(_) => self.create(ObjectKind::ColorBrush),
            NodeKind::LinearGradientBrush(_) => self.create(ObjectKind::LinearGradientBrush),
            NodeKind::RadialGradientBrush(_) => self.create(ObjectKind::RadialGradientBrush),
            NodeKind::ColorGradientStop(_) => self.create(ObjectKind::ColorGradientStop),
            NodeKind::InsetClip(_) => self.create(ObjectKind::InsetClip),
            NodeKind::GeometricClip(_) => self.create(ObjectKind::GeometricClip),
            NodeKind::ViewBox(_) => self.create(ObjectKind::ViewBox),
            NodeKind::ExpressionAnimation(expression) => match self.policy {
                ExpressionAnimationPolicy::Reuse if !self.has_own_animations(node) => {
                    return self.reused_expression_animation(id, node, expression);
                }
                _ => self.create(ObjectKind::ExpressionAnimation),
            },
            NodeKind::KeyFrameAnimation(animation) => {
                self.create(animation::key_frame_object_kind(animation.value_type))
            }
            NodeKind::LinearEasing => self.create(ObjectKind::LinearEasingFunction),
            NodeKind::CubicBezierEasing(_) => self.create(ObjectKind::CubicBezierEasingFunction),
            NodeKind::StepEasing(_) => self.create(ObjectKind::StepEasingFunction),
            NodeKind::AnimationController(controller) => {
                return self.referenced_controller(id, node, controller);
            }
            NodeKind::PropertySet(_) => return self.property_set(id, node),
            NodeKind::Unrecognized(unrecognized) => {
                return Err(InstantiationError::UnrecognizedNode {
                    node: id,
                    family: unrecognized.family,
                    tag: unrecognized.tag,
                });
            }
        };

        // Recorded before initialization so shared references resolve to
        // this object and initialization runs once.
        self.objects.insert(id, object.clone());
        tracing::trace!(target: targets::INSTANTIATOR, ?id, kind = node.kind().name(), "created object");

        self.initialize(id, node, &object)?;
        Ok(object)
    }

    /// The native object for `id`, which must belong to `expected`.
    fn object_of(&mut self, id: NodeId, expected: NodeFamily) -> InstantiationResult<C::Object> {
        let node = self.node(id)?;
        if node.kind().family() != expected {
            return Err(kind_mismatch(id, node, expected));
        }
        self.object(id)
    }

    /// Materialize a property set on a memo miss.
    fn property_set(&mut self, id: NodeId, node: &'a SourceNode) -> InstantiationResult<C::Object> {
        let target = match node.owner() {
            Some(owner) => {
                // Materializing the owner materializes its companion.
                let owner_object = self.object(owner)?;
                if let Some(existing) = self.objects.get(id) {
                    return Ok(existing.clone());
                }
                self.compositor.property_set(&owner_object)
            }
            None => self.create(ObjectKind::PropertySet),
        };

        self.objects.insert(id, target.clone());
        self.initialize(id, node, &target)?;
        Ok(target)
    }

    /// Apply a node's properties, children, companion property set and
    /// animators to its freshly created native object.
    fn initialize(
        &mut self,
        id: NodeId,
        node: &'a SourceNode,
        target: &C::Object,
    ) -> InstantiationResult<()> {
        if let Some(comment) = node.comment() {
            self.compositor
                .set_property(target, Property::Comment, Value::String(comment.to_owned()));
        }

        match node.kind() {
            NodeKind::ContainerVisual(visual) => {
                self.visual_properties(target, &visual.visual)?;
                self.append_all(target, Collection::Children, &visual.children, NodeFamily::Visual)?;
            }
            NodeKind::ShapeVisual(visual) => {
                self.visual_properties(target, &visual.visual)?;
                self.set_object(target, Property::ViewBox, visual.view_box, NodeFamily::ViewBox)?;
                self.append_all(target, Collection::Shapes, &visual.shapes, NodeFamily::Shape)?;
                self.append_all(target, Collection::Children, &visual.children, NodeFamily::Visual)?;
            }
            NodeKind::SpriteVisual(visual) => {
                self.visual_properties(target, &visual.visual)?;
                self.set_object(target, Property::Brush, visual.brush, NodeFamily::Brush)?;
                self.append_all(target, Collection::Children, &visual.children, NodeFamily::Visual)?;
            }
            NodeKind::ContainerShape(shape) => {
                self.shape_properties(target, &shape.shape);
                self.append_all(target, Collection::Shapes, &shape.shapes, NodeFamily::Shape)?;
            }
            NodeKind::SpriteShape(shape) => {
                self.shape_properties(target, &shape.shape);
                self.set_object(target, Property::Geometry, shape.geometry, NodeFamily::Geometry)?;
                self.set_object(target, Property::FillBrush, shape.fill_brush, NodeFamily::Brush)?;
                self.set_object(target, Property::StrokeBrush, shape.stroke_brush, NodeFamily::Brush)?;
                if !shape.stroke_dash_array.is_empty() {
                    self.compositor.set_property(
                        target,
                        Property::StrokeDashArray,
                        Value::ScalarArray(shape.stroke_dash_array.clone()),
                    );
                }
                self.set_tag(target, Property::StrokeDashCap, shape.stroke_dash_cap)?;
                self.set(target, Property::StrokeDashOffset, shape.stroke_dash_offset);
                self.set_tag(target, Property::StrokeStartCap, shape.stroke_start_cap)?;
                self.set_tag(target, Property::StrokeEndCap, shape.stroke_end_cap)?;
                self.set_tag(target, Property::StrokeLineJoin, shape.stroke_line_join)?;
                self.set(target, Property::StrokeMiterLimit, shape.stroke_miter_limit);
                self.set(target, Property::StrokeThickness, shape.stroke_thickness);
                self.set(target, Property::IsStrokeNonScaling, shape.is_stroke_non_scaling);
            }
            NodeKind::EllipseGeometry(geometry) => {
                self.geometry_properties(target, &geometry.geometry);
                self.set(target, Property::Center, geometry.center);
                self.set(target, Property::Radius, geometry.radius);
            }
            NodeKind::RectangleGeometry(geometry) => {
                self.geometry_properties(target, &geometry.geometry);
                self.set(target, Property::Offset, geometry.offset);
                self.set(target, Property::Size, geometry.size);
            }
            NodeKind::RoundedRectangleGeometry(geometry) => {
                self.geometry_properties(target, &geometry.geometry);
                self.set(target, Property::CornerRadius, geometry.corner_radius);
                self.set(target, Property::Offset, geometry.offset);
                self.set(target, Property::Size, geometry.size);
            }
            NodeKind::PathGeometry(geometry) => {
                self.geometry_properties(target, &geometry.geometry);
                self.set_object(target, Property::Path, geometry.path, NodeFamily::Path)?;
            }
            NodeKind::Path(_) => {}
            NodeKind::ColorBrush(brush) => {
                self.set(target, Property::Color, brush.color);
            }
            NodeKind::LinearGradientBrush(brush) => {
                self.gradient_properties(target, &brush.gradient)?;
                self.set(target, Property::StartPoint, brush.start_point);
                self.set(target, Property::EndPoint, brush.end_point);
            }
            NodeKind::RadialGradientBrush(brush) => {
                self.gradient_properties(target, &brush.gradient)?;
                self.set(target, Property::EllipseCenter, brush.ellipse_center);
                self.set(target, Property::EllipseRadius, brush.ellipse_radius);
                self.set(target, Property::GradientOriginOffset, brush.gradient_origin_offset);
            }
            NodeKind::ColorGradientStop(stop) => {
                self.set(target, Property::Color, stop.color);
                self.set(target, Property::Offset, stop.offset);
            }
            NodeKind::InsetClip(clip) => {
                self.set(target, Property::CenterPoint, clip.clip.center_point);
                self.set(target, Property::Scale, clip.clip.scale);
                self.set(target, Property::LeftInset, clip.left_inset);
                self.set(target, Property::TopInset, clip.top_inset);
                self.set(target, Property::RightInset, clip.right_inset);
                self.set(target, Property::BottomInset, clip.bottom_inset);
            }
            NodeKind::GeometricClip(clip) => {
                self.set(target, Property::CenterPoint, clip.clip.center_point);
                self.set(target, Property::Scale, clip.clip.scale);
                self.set_object(target, Property::Geometry, clip.geometry, NodeFamily::Geometry)?;
            }
            NodeKind::ViewBox(view_box) => {
                self.set(target, Property::Offset, view_box.offset);
                self.set(target, Property::Size, view_box.size);
            }
            NodeKind::ExpressionAnimation(expression) => {
                self.expression_animation_properties(target, expression)?;
            }
            NodeKind::KeyFrameAnimation(animation) => {
                self.key_frame_animation_properties(target, animation)?;
            }
            NodeKind::LinearEasing => {}
            NodeKind::CubicBezierEasing(easing) => {
                self.set(target, Property::ControlPoint1, Some(easing.control_point1));
                self.set(target, Property::ControlPoint2, Some(easing.control_point2));
            }
            NodeKind::StepEasing(easing) => {
                self.set(target, Property::StepCount, easing.step_count);
                self.set(target, Property::InitialStep, easing.initial_step);
                self.set(target, Property::FinalStep, easing.final_step);
                self.set(
                    target,
                    Property::IsInitialStepSingleFrame,
                    easing.is_initial_step_single_frame,
                );
                self.set(target, Property::IsFinalStepSingleFrame, easing.is_final_step_single_frame);
            }
            NodeKind::AnimationController(controller) => {
                self.set(target, Property::Progress, controller.progress);
            }
            NodeKind::PropertySet(set) => {
                for (name, value) in &set.values {
                    self.compositor.insert_property(target, name, Value::from(*value));
                }
            }
            NodeKind::Unrecognized(unrecognized) => {
                return Err(InstantiationError::UnrecognizedNode {
                    node: id,
                    family: unrecognized.family,
                    tag: unrecognized.tag,
                });
            }
        }

        // Animators may target values in the property set, so it must exist
        // before they start.
        let companion = node.properties();
        if companion != id {
            self.object(companion)?;
        }

        self.start_animations(target, node.animators())
    }

    fn set<V: Into<Value<C::Object>>>(&mut self, target: &C::Object, property: Property, value: Option<V>) {
        if let Some(value) = value {
            self.compositor.set_property(target, property, value.into());
        }
    }

    fn set_tag<T>(
        &mut self,
        target: &C::Object,
        property: Property,
        value: Option<Tag<T>>,
    ) -> InstantiationResult<()>
    where
        T: Enumeration + Into<Value<C::Object>>,
    {
        if let Some(tag) = value {
            let value = tag.resolve()?;
            self.compositor.set_property(target, property, value.into());
        }
        Ok(())
    }

    fn set_object(
        &mut self,
        target: &C::Object,
        property: Property,
        value: Option<NodeId>,
        family: NodeFamily,
    ) -> InstantiationResult<()> {
        if let Some(id) = value {
            let object = self.object_of(id, family)?;
            self.compositor.set_property(target, property, Value::Object(object));
        }
        Ok(())
    }

    fn append_all(
        &mut self,
        target: &C::Object,
        collection: Collection,
        items: &[NodeId],
        family: NodeFamily,
    ) -> InstantiationResult<()> {
        for &id in items {
            let item = self.object_of(id, family)?;
            self.compositor.append(target, collection, &item);
        }
        Ok(())
    }

    fn visual_properties(
        &mut self,
        target: &C::Object,
        visual: &horizon_compose_graph::VisualProperties,
    ) -> InstantiationResult<()> {
        self.set_tag(target, Property::BorderMode, visual.border_mode)?;
        self.set(target, Property::CenterPoint, visual.center_point);
        self.set_object(target, Property::Clip, visual.clip, NodeFamily::Clip)?;
        self.set(target, Property::IsVisible, visual.is_visible);
        self.set(target, Property::Offset, visual.offset);
        self.set(target, Property::Opacity, visual.opacity);
        self.set(target, Property::RotationAngleInDegrees, visual.rotation_angle_in_degrees);
        self.set(target, Property::RotationAxis, visual.rotation_axis);
        self.set(target, Property::Scale, visual.scale);
        self.set(target, Property::Size, visual.size);
        self.set(target, Property::TransformMatrix, visual.transform_matrix);
        Ok(())
    }

    fn shape_properties(&mut self, target: &C::Object, shape: &horizon_compose_graph::ShapeProperties) {
        self.set(target, Property::CenterPoint, shape.center_point);
        self.set(target, Property::Offset, shape.offset);
        self.set(target, Property::RotationAngleInDegrees, shape.rotation_angle_in_degrees);
        self.set(target, Property::Scale, shape.scale);
        self.set(target, Property::TransformMatrix, shape.transform_matrix);
    }

    fn geometry_properties(
        &mut self,
        target: &C::Object,
        geometry: &horizon_compose_graph::GeometryProperties,
    ) {
        self.set(target, Property::TrimStart, geometry.trim_start);
        self.set(target, Property::TrimEnd, geometry.trim_end);
        self.set(target, Property::TrimOffset, geometry.trim_offset);
    }

    fn gradient_properties(
        &mut self,
        target: &C::Object,
        gradient: &horizon_compose_graph::GradientProperties,
    ) -> InstantiationResult<()> {
        self.append_all(
            target,
            Collection::ColorStops,
            &gradient.color_stops,
            NodeFamily::GradientStop,
        )?;
        self.set_tag(target, Property::ExtendMode, gradient.extend_mode)?;
        self.set_tag(target, Property::MappingMode, gradient.mapping_mode)?;
        self.set(target, Property::TransformMatrix, gradient.transform_matrix);
        Ok(())
    }
}

/// The error for a node found where a node of `expected` was required.
fn kind_mismatch(id: NodeId, node: &SourceNode, expected: NodeFamily) -> InstantiationError {
    match node.kind() {
        NodeKind::Unrecognized(unrecognized) => InstantiationError::UnrecognizedNode {
            node: id,
            family: unrecognized.family,
            tag: unrecognized.tag,
        },
        other => InstantiationError::UnexpectedKind {
            node: id,
            expected,
            found: other.name(),
        },
    }
}
