//! Integration tests for graph instantiation against the recording compositor.

use std::time::Duration;

use horizon_compose::recording::{Call, RecordedId, RecordingCompositor, StartedAnimation};
use horizon_compose::{
    Collection, ExpressionAnimationPolicy, InstantiationError, Instantiator, InstantiatorConfig,
    KeyFrameContent, ObjectKind, Property, Value,
};
use horizon_compose_graph::{
    AnimationController, AnimationValueType, BorderMode, CanvasGeometry, Color, ColorBrush,
    CombineMode, ContainerShape, ContainerVisual, CubicBezierEasing, EllipseGeometry,
    Enumeration, ExpressionAnimation, FigureLoop, GeometricClip, KeyFrameAnimation, KeyFrameValue,
    LineJoin, Node, NodeFamily, NodeId, NodeKind, PathBuilder, PathGeometry, PathNode,
    PropertyValue, ShapeVisual, SourceGraph, SpriteShape, SpriteVisual, StrokeCap, Tag,
    UnrecognizedNode, UnrecognizedTag, Vec2, Vec3, VisualProperties,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

fn instantiator(policy: ExpressionAnimationPolicy) -> Instantiator {
    Instantiator::new(InstantiatorConfig::new().expression_animations(policy))
}

fn run(graph: &SourceGraph, root: NodeId) -> (RecordingCompositor, RecordedId) {
    init_logging();
    let mut compositor = RecordingCompositor::new();
    let materialized = instantiator(ExpressionAnimationPolicy::Reuse)
        .materialize(&mut compositor, graph, root)
        .expect("instantiation succeeds");
    (compositor, materialized.root)
}

fn run_err(graph: &SourceGraph, root: NodeId) -> InstantiationError {
    init_logging();
    let mut compositor = RecordingCompositor::new();
    instantiator(ExpressionAnimationPolicy::Reuse)
        .materialize(&mut compositor, graph, root)
        .expect_err("instantiation fails")
}

fn commented(graph: &mut SourceGraph, comment: &str) -> NodeId {
    graph
        .insert(Node::new(ContainerVisual::default()).with_comment(comment))
        .unwrap()
}

fn container(graph: &mut SourceGraph, children: Vec<NodeId>) -> NodeId {
    graph
        .insert(NodeKind::from(ContainerVisual {
            children,
            ..Default::default()
        }))
        .unwrap()
}

fn shape_visual(graph: &mut SourceGraph, shapes: Vec<NodeId>) -> NodeId {
    graph
        .insert(NodeKind::from(ShapeVisual {
            shapes,
            ..Default::default()
        }))
        .unwrap()
}

fn position(calls: &[Call], predicate: impl Fn(&Call) -> bool) -> usize {
    calls
        .iter()
        .position(predicate)
        .expect("call was recorded")
}

// ---------------------------------------------------------------------------
// Memoization

#[test]
fn test_shared_brush_materialized_once() {
    let mut graph = SourceGraph::new();
    let brush = graph
        .insert(NodeKind::from(ColorBrush {
            color: Some(Color::RED),
        }))
        .unwrap();
    let a = graph
        .insert(NodeKind::from(SpriteVisual {
            brush: Some(brush),
            ..Default::default()
        }))
        .unwrap();
    let b = graph
        .insert(NodeKind::from(SpriteVisual {
            brush: Some(brush),
            ..Default::default()
        }))
        .unwrap();
    let root = container(&mut graph, vec![a, b]);

    let (compositor, root) = run(&graph, root);

    assert_eq!(compositor.count_of(ObjectKind::ColorBrush), 1);
    let children = compositor.object(root).unwrap().items(Collection::Children);
    let brush_a = compositor.object(children[0]).unwrap().object_property(Property::Brush);
    let brush_b = compositor.object(children[1]).unwrap().object_property(Property::Brush);
    assert!(brush_a.is_some());
    assert_eq!(brush_a, brush_b);

    let brush = compositor.object(brush_a.unwrap()).unwrap();
    assert_eq!(brush.write_count(Property::Color), 1);
    assert_eq!(brush.property(Property::Color), Some(&Value::Color(Color::RED)));
}

#[test]
fn test_same_child_twice_appended_twice_created_once() {
    let mut graph = SourceGraph::new();
    let child = commented(&mut graph, "child");
    let root = container(&mut graph, vec![child, child]);

    let (compositor, root) = run(&graph, root);

    let children = compositor.object(root).unwrap().items(Collection::Children);
    assert_eq!(children.len(), 2);
    assert_eq!(children[0], children[1]);
    assert_eq!(compositor.count_of(ObjectKind::ContainerVisual), 2);
    assert_eq!(
        compositor.object(children[0]).unwrap().write_count(Property::Comment),
        1
    );
}

#[test]
fn test_shared_canvas_geometry_built_once() {
    let mut graph = SourceGraph::new();
    let circle = graph
        .insert_geometry(CanvasGeometry::Ellipse {
            center: Vec2::ZERO,
            radius: Vec2::splat(10.0),
        })
        .unwrap();
    let combined = graph
        .insert_geometry(CanvasGeometry::Combination {
            a: circle,
            b: circle,
            matrix: horizon_compose_graph::Affine2::from_translation(Vec2::new(5.0, 0.0)),
            mode: Tag::Known(CombineMode::Xor),
        })
        .unwrap();
    let group = graph
        .insert_geometry(CanvasGeometry::Group {
            fill_rule: horizon_compose_graph::FillRule::Winding,
            geometries: vec![combined, circle],
        })
        .unwrap();
    let path = graph
        .insert(NodeKind::from(PathNode { geometry: group }))
        .unwrap();
    let geometry = graph
        .insert(NodeKind::from(PathGeometry {
            path: Some(path),
            ..Default::default()
        }))
        .unwrap();
    let shape = graph
        .insert(NodeKind::from(SpriteShape {
            geometry: Some(geometry),
            ..Default::default()
        }))
        .unwrap();
    let root = shape_visual(&mut graph, vec![shape]);

    let (compositor, _) = run(&graph, root);

    // Ellipse, combination and group.
    assert_eq!(compositor.geometry_count(), 3);
    let creates: Vec<usize> = compositor
        .calls()
        .iter()
        .enumerate()
        .filter(|(_, call)| matches!(call, Call::CreateGeometry { .. }))
        .map(|(i, _)| i)
        .collect();
    let path_call = position(compositor.calls(), |call| {
        matches!(call, Call::CreatePath { .. })
    });
    assert!(creates.iter().all(|&i| i < path_call));
}

// ---------------------------------------------------------------------------
// Ordering and property writes

#[test]
fn test_children_appended_in_source_order() {
    let mut graph = SourceGraph::new();
    let a = commented(&mut graph, "a");
    let b = commented(&mut graph, "b");
    let c = commented(&mut graph, "c");
    let root = container(&mut graph, vec![c, a, b]);

    let (compositor, root) = run(&graph, root);

    let comments: Vec<&str> = compositor
        .object(root)
        .unwrap()
        .items(Collection::Children)
        .iter()
        .map(|id| compositor.object(*id).unwrap().string(Property::Comment).unwrap())
        .collect();
    assert_eq!(comments, ["c", "a", "b"]);
}

#[test]
fn test_shapes_and_color_stops_in_source_order() {
    let mut graph = SourceGraph::new();
    let stops: Vec<NodeId> = [0.0, 0.5, 1.0]
        .into_iter()
        .map(|offset| {
            graph
                .insert(NodeKind::from(horizon_compose_graph::ColorGradientStop {
                    color: Some(Color::BLUE),
                    offset: Some(offset),
                }))
                .unwrap()
        })
        .collect();
    let brush = graph
        .insert(NodeKind::from(horizon_compose_graph::LinearGradientBrush {
            gradient: horizon_compose_graph::GradientProperties {
                color_stops: stops,
                ..Default::default()
            },
            end_point: Some(Vec2::new(1.0, 0.0)),
            ..Default::default()
        }))
        .unwrap();
    let first = graph
        .insert(
            Node::new(SpriteShape {
                fill_brush: Some(brush),
                ..Default::default()
            })
            .with_comment("first"),
        )
        .unwrap();
    let second = graph
        .insert(Node::new(ContainerShape::default()).with_comment("second"))
        .unwrap();
    let root = shape_visual(&mut graph, vec![first, second]);

    let (compositor, root) = run(&graph, root);

    let shapes = compositor.object(root).unwrap().items(Collection::Shapes);
    assert_eq!(shapes.len(), 2);
    assert_eq!(
        compositor.object(shapes[1]).unwrap().object_kind(),
        Some(ObjectKind::ContainerShape)
    );

    let brush = compositor
        .object(shapes[0])
        .unwrap()
        .object_property(Property::FillBrush)
        .unwrap();
    let offsets: Vec<Option<&Value<RecordedId>>> = compositor
        .object(brush)
        .unwrap()
        .items(Collection::ColorStops)
        .iter()
        .map(|stop| compositor.object(*stop).unwrap().property(Property::Offset))
        .collect();
    assert_eq!(
        offsets,
        [
            Some(&Value::Scalar(0.0)),
            Some(&Value::Scalar(0.5)),
            Some(&Value::Scalar(1.0))
        ]
    );
}

#[test]
fn test_unset_and_zero_offsets() {
    let mut graph = SourceGraph::new();
    let unset = commented(&mut graph, "unset");
    let zero = graph
        .insert(NodeKind::from(ContainerVisual {
            visual: VisualProperties {
                offset: Some(Vec3::ZERO),
                ..Default::default()
            },
            ..Default::default()
        }))
        .unwrap();
    let root = container(&mut graph, vec![unset, zero]);

    let (compositor, root) = run(&graph, root);
    let children = compositor.object(root).unwrap().items(Collection::Children);

    let unset = compositor.object(children[0]).unwrap();
    assert_eq!(unset.write_count(Property::Offset), 0);
    assert_eq!(unset.writes().len(), 1);

    let zero = compositor.object(children[1]).unwrap();
    assert_eq!(zero.property(Property::Offset), Some(&Value::Vector3(Vec3::ZERO)));
}

#[test]
fn test_sprite_shape_stroke_properties() {
    let mut graph = SourceGraph::new();
    let ellipse = graph
        .insert(NodeKind::from(EllipseGeometry {
            radius: Some(Vec2::splat(3.0)),
            ..Default::default()
        }))
        .unwrap();
    let shape = graph
        .insert(NodeKind::from(SpriteShape {
            geometry: Some(ellipse),
            stroke_dash_array: vec![2.0, 1.0],
            stroke_start_cap: Some(Tag::Known(StrokeCap::Round)),
            stroke_line_join: Some(Tag::Known(LineJoin::Bevel)),
            stroke_thickness: Some(0.0),
            ..Default::default()
        }))
        .unwrap();
    let root = shape_visual(&mut graph, vec![shape]);

    let (compositor, root) = run(&graph, root);
    let shape = compositor.object(root).unwrap().items(Collection::Shapes)[0];
    let shape = compositor.object(shape).unwrap();

    assert_eq!(
        shape.property(Property::StrokeDashArray),
        Some(&Value::ScalarArray(vec![2.0, 1.0]))
    );
    assert_eq!(
        shape.property(Property::StrokeStartCap),
        Some(&Value::StrokeCap(StrokeCap::Round))
    );
    assert_eq!(
        shape.property(Property::StrokeLineJoin),
        Some(&Value::LineJoin(LineJoin::Bevel))
    );
    assert_eq!(shape.property(Property::StrokeThickness), Some(&Value::Scalar(0.0)));
    assert_eq!(shape.write_count(Property::StrokeEndCap), 0);
    assert_eq!(shape.write_count(Property::FillBrush), 0);
}

// ---------------------------------------------------------------------------
// Animations

#[test]
fn test_animation_dependencies_exist_before_start() {
    let mut graph = SourceGraph::new();
    let brush = graph
        .insert(Node::new(ColorBrush::default()).with_comment("referenced"))
        .unwrap();
    let easing = graph
        .insert(NodeKind::from(CubicBezierEasing {
            control_point1: Vec2::new(0.4, 0.0),
            control_point2: Vec2::new(0.6, 1.0),
        }))
        .unwrap();
    let fade = graph
        .insert(NodeKind::from(
            KeyFrameAnimation::new(AnimationValueType::Scalar, Duration::from_millis(500))
                .key_frame(0.0, KeyFrameValue::Scalar(0.0), None)
                .key_frame(1.0, KeyFrameValue::Scalar(1.0), Some(easing)),
        ))
        .unwrap();
    let follow = graph
        .insert(NodeKind::from(
            ExpressionAnimation::new("brush.Color.A / 255").with_parameter("brush", brush),
        ))
        .unwrap();
    let root = graph
        .insert(
            Node::new(ContainerVisual::default())
                .animate("Opacity", fade)
                .animate("Scale.X", follow),
        )
        .unwrap();

    let (compositor, root) = run(&graph, root);
    let calls = compositor.calls();
    let started = compositor.started_animations();
    assert_eq!(started.len(), 2);
    assert!(started.iter().all(|s| s.target == root));

    let fade = &started[0];
    assert_eq!(fade.property, "Opacity");
    assert_eq!(fade.snapshot.kind.to_string(), "ScalarKeyFrameAnimation");
    assert_eq!(fade.snapshot.key_frames.len(), 2);
    let easing = fade.snapshot.key_frames[1].easing.unwrap();
    assert_eq!(
        compositor.object(easing).unwrap().object_kind(),
        Some(ObjectKind::CubicBezierEasingFunction)
    );
    assert_eq!(
        fade.snapshot.key_frames[1].content,
        KeyFrameContent::Value(Value::Scalar(1.0))
    );
    let easing_created = position(calls, |call| {
        matches!(call, Call::Create { object, .. } if *object == easing)
    });
    let fade_started = position(calls, |call| {
        matches!(call, Call::StartAnimation { animation, .. } if *animation == fade.animation)
    });
    assert!(easing_created < fade_started);

    let follow = &started[1];
    assert_eq!(follow.property, "Scale.X");
    let (name, brush) = &follow.snapshot.parameters[0];
    assert_eq!(name, "brush");
    assert_eq!(
        compositor.object(*brush).unwrap().string(Property::Comment),
        Some("referenced")
    );
    let brush_created = position(calls, |call| {
        matches!(call, Call::Create { object, .. } if object == brush)
    });
    let follow_started = position(calls, |call| {
        matches!(call, Call::StartAnimation { property, .. } if property == "Scale.X")
    });
    assert!(brush_created < follow_started);
}

#[test]
fn test_property_set_exists_before_node_animations_start() {
    let mut graph = SourceGraph::new();
    let progress = graph
        .insert(NodeKind::from(ExpressionAnimation::new("0.25")))
        .unwrap();
    let opacity = graph
        .insert(NodeKind::from(ExpressionAnimation::new("this.Progress")))
        .unwrap();
    let root = graph
        .insert(
            Node::new(ContainerVisual::default())
                .with_property("Progress", PropertyValue::Scalar(0.0))
                .animate_property("Progress", progress)
                .animate("Opacity", opacity),
        )
        .unwrap();

    let (compositor, root) = run(&graph, root);
    let property_set = compositor.object(root).unwrap().property_set().unwrap();
    assert_eq!(
        compositor.object(property_set).unwrap().named_value("Progress"),
        Some(&Value::Scalar(0.0))
    );

    let started = compositor.started_animations();
    assert_eq!(started.len(), 2);
    assert_eq!(started[0].target, property_set);
    assert_eq!(started[0].property, "Progress");
    assert_eq!(started[1].target, root);
    assert_eq!(started[1].property, "Opacity");
}

#[test]
fn test_paused_controller_paused_right_after_start() {
    let mut graph = SourceGraph::new();
    let target = commented(&mut graph, "target");
    let controller = graph
        .insert(
            Node::new(AnimationController {
                target,
                property: "Opacity".into(),
                is_paused: true,
                progress: Some(0.25),
            })
            .with_comment("progress controller"),
        )
        .unwrap();
    let animation = graph
        .insert(NodeKind::from(ExpressionAnimation::new("0.5")))
        .unwrap();
    let root = graph
        .insert(
            Node::new(ContainerVisual {
                children: vec![target],
                ..Default::default()
            })
            .animate_with_controller("Opacity", animation, controller),
        )
        .unwrap();

    let (compositor, _) = run(&graph, root);
    let calls = compositor.calls();
    let start = position(calls, |call| matches!(call, Call::StartAnimation { .. }));
    let Call::StartAnimation { controller, .. } = &calls[start] else {
        unreachable!()
    };
    assert_eq!(calls[start + 1], Call::Pause {
        controller: *controller
    });

    let controller = compositor.object(*controller).unwrap();
    assert!(controller.is_paused());
    assert_eq!(controller.property(Property::Progress), Some(&Value::Scalar(0.25)));
    assert_eq!(controller.string(Property::Comment), Some("progress controller"));
}

#[test]
fn test_running_controller_not_paused() {
    let mut graph = SourceGraph::new();
    let target = commented(&mut graph, "target");
    let controller = graph
        .insert(NodeKind::from(AnimationController {
            target,
            property: "Opacity".into(),
            is_paused: false,
            progress: None,
        }))
        .unwrap();
    let animation = graph
        .insert(NodeKind::from(ExpressionAnimation::new("0.5")))
        .unwrap();
    let root = graph
        .insert(
            Node::new(ContainerVisual::default())
                .animate_with_controller("Opacity", animation, controller),
        )
        .unwrap();

    let (compositor, _) = run(&graph, root);
    assert!(!compositor.calls().iter().any(|call| matches!(call, Call::Pause { .. })));
}

#[test]
fn test_controller_referenced_by_expression() {
    let mut graph = SourceGraph::new();
    let target = commented(&mut graph, "target");
    let controller = graph
        .insert(NodeKind::from(AnimationController {
            target,
            property: "Opacity".into(),
            is_paused: true,
            progress: None,
        }))
        .unwrap();
    let driven = graph
        .insert(NodeKind::from(ExpressionAnimation::new("0.5")))
        .unwrap();
    let driver = graph
        .insert(
            Node::new(ContainerVisual::default())
                .with_comment("driver")
                .animate_with_controller("Opacity", driven, controller),
        )
        .unwrap();
    let follow = graph
        .insert(NodeKind::from(
            ExpressionAnimation::new("ctl.Progress").with_parameter("ctl", controller),
        ))
        .unwrap();
    let follower = graph
        .insert(Node::new(ContainerVisual::default()).animate("Opacity", follow))
        .unwrap();
    let root = container(&mut graph, vec![follower, driver]);

    let (compositor, _) = run(&graph, root);
    let started: &[StartedAnimation] = compositor.started_animations();
    assert_eq!(started.len(), 2);

    // The driver starts first, while the follower's parameters are resolved.
    assert_eq!(started[0].snapshot.expression.as_deref(), Some("0.5"));
    assert_eq!(started[1].snapshot.expression.as_deref(), Some("ctl.Progress"));
    assert_eq!(
        started[1].snapshot.parameters,
        vec![("ctl".to_string(), started[0].controller)]
    );
    // The controller's target is not part of the rendered tree.
    assert_eq!(compositor.count_of(ObjectKind::ContainerVisual), 3);
}

#[test]
fn test_controller_without_driver_is_an_error() {
    let mut graph = SourceGraph::new();
    let target = commented(&mut graph, "target");
    let controller = graph
        .insert(NodeKind::from(AnimationController {
            target,
            property: "Opacity".into(),
            is_paused: false,
            progress: None,
        }))
        .unwrap();
    let follow = graph
        .insert(NodeKind::from(
            ExpressionAnimation::new("ctl.Progress").with_parameter("ctl", controller),
        ))
        .unwrap();
    let root = graph
        .insert(Node::new(ContainerVisual::default()).animate("Opacity", follow))
        .unwrap();

    assert_eq!(
        run_err(&graph, root),
        InstantiationError::ControllerNotStarted { node: controller }
    );
}

#[test]
fn test_reused_expression_does_not_leak_state() {
    let mut graph = SourceGraph::new();
    let brush = graph
        .insert(NodeKind::from(ColorBrush::default()))
        .unwrap();
    let first = graph
        .insert(
            Node::new(
                ExpressionAnimation::new("brush.Color.A")
                    .with_target("Opacity")
                    .with_parameter("brush", brush),
            )
            .with_comment("first"),
        )
        .unwrap();
    let second = graph
        .insert(NodeKind::from(ExpressionAnimation::new("1.0")))
        .unwrap();
    let a = graph
        .insert(Node::new(ContainerVisual::default()).animate("Opacity", first))
        .unwrap();
    let b = graph
        .insert(Node::new(ContainerVisual::default()).animate("Opacity", second))
        .unwrap();
    let root = container(&mut graph, vec![a, b]);

    let (compositor, _) = run(&graph, root);
    assert_eq!(compositor.count_of(ObjectKind::ExpressionAnimation), 1);

    let started = compositor.started_animations();
    assert_eq!(started.len(), 2);
    assert_eq!(started[0].animation, started[1].animation);

    assert_eq!(started[0].snapshot.comment.as_deref(), Some("first"));
    assert_eq!(started[0].snapshot.target.as_deref(), Some("Opacity"));
    assert_eq!(started[0].snapshot.parameters.len(), 1);

    assert_eq!(started[1].snapshot.expression.as_deref(), Some("1.0"));
    assert_eq!(started[1].snapshot.comment.as_deref(), Some(""));
    assert_eq!(started[1].snapshot.target.as_deref(), Some(""));
    assert!(started[1].snapshot.parameters.is_empty());
}

#[test]
fn test_nested_expression_parameters_resolved_before_reuse() {
    let mut graph = SourceGraph::new();
    let inner = graph
        .insert(NodeKind::from(ExpressionAnimation::new("inner")))
        .unwrap();
    let animated = graph
        .insert(Node::new(ContainerVisual::default()).animate("Opacity", inner))
        .unwrap();
    let outer = graph
        .insert(NodeKind::from(
            ExpressionAnimation::new("outer").with_parameter("v", animated),
        ))
        .unwrap();
    let root = graph
        .insert(Node::new(ContainerVisual::default()).animate("Offset", outer))
        .unwrap();

    let (compositor, root) = run(&graph, root);
    let started = compositor.started_animations();
    assert_eq!(started.len(), 2);
    assert_eq!(started[0].snapshot.expression.as_deref(), Some("inner"));
    assert!(started[0].snapshot.parameters.is_empty());
    assert_eq!(started[1].target, root);
    assert_eq!(started[1].snapshot.expression.as_deref(), Some("outer"));
    assert_eq!(started[1].snapshot.parameters.len(), 1);
}

#[test]
fn test_per_occurrence_expressions_are_memoized() {
    init_logging();
    let mut graph = SourceGraph::new();
    let shared = graph
        .insert(NodeKind::from(ExpressionAnimation::new("1.0")))
        .unwrap();
    let other = graph
        .insert(NodeKind::from(ExpressionAnimation::new("2.0")))
        .unwrap();
    let a = graph
        .insert(Node::new(ContainerVisual::default()).animate("Opacity", shared))
        .unwrap();
    let b = graph
        .insert(
            Node::new(ContainerVisual::default())
                .animate("Opacity", shared)
                .animate("Scale.X", other),
        )
        .unwrap();
    let root = container(&mut graph, vec![a, b]);

    let mut compositor = RecordingCompositor::new();
    let materialized = instantiator(ExpressionAnimationPolicy::PerOccurrence)
        .materialize(&mut compositor, &graph, root)
        .unwrap();

    assert_eq!(compositor.count_of(ObjectKind::ExpressionAnimation), 2);
    assert_eq!(materialized.stats.expression_reuses, 0);
    let started = compositor.started_animations();
    assert_eq!(started[0].animation, started[1].animation);
    assert_ne!(started[1].animation, started[2].animation);
    assert!(
        !compositor
            .calls()
            .iter()
            .any(|call| matches!(call, Call::ClearParameters { .. }))
    );
}

#[test]
fn test_self_animated_expression_starts_its_animators_under_both_policies() {
    init_logging();
    let mut graph = SourceGraph::new();
    let inner = graph
        .insert(NodeKind::from(ExpressionAnimation::new("inner")))
        .unwrap();
    let outer = graph
        .insert(Node::new(ExpressionAnimation::new("outer")).animate("Progress", inner))
        .unwrap();
    let root = graph
        .insert(Node::new(ContainerVisual::default()).animate("Offset", outer))
        .unwrap();

    for policy in [
        ExpressionAnimationPolicy::Reuse,
        ExpressionAnimationPolicy::PerOccurrence,
    ] {
        let mut compositor = RecordingCompositor::new();
        let materialized = instantiator(policy)
            .materialize(&mut compositor, &graph, root)
            .unwrap();

        let started = compositor.started_animations();
        let expressions: Vec<_> = started
            .iter()
            .map(|started| started.snapshot.expression.as_deref())
            .collect();
        assert_eq!(expressions, vec![Some("inner"), Some("outer")], "{policy:?}");
        assert_eq!(started[0].target, started[1].animation, "{policy:?}");
        assert_eq!(started[0].property, "Progress");
        assert_eq!(started[1].target, materialized.root);
        assert_ne!(started[0].animation, started[1].animation, "{policy:?}");
    }
}

#[test]
fn test_expression_with_companion_values_is_not_shared() {
    let mut graph = SourceGraph::new();
    let plain = graph
        .insert(NodeKind::from(ExpressionAnimation::new("1.0")))
        .unwrap();
    let valued = graph
        .insert(
            Node::new(ExpressionAnimation::new("this.Scale"))
                .with_property("Scale", PropertyValue::Scalar(3.0)),
        )
        .unwrap();
    let a = graph
        .insert(Node::new(ContainerVisual::default()).animate("Opacity", plain))
        .unwrap();
    let b = graph
        .insert(Node::new(ContainerVisual::default()).animate("Opacity", valued))
        .unwrap();
    let root = container(&mut graph, vec![a, b]);

    let (compositor, _) = run(&graph, root);

    assert_eq!(compositor.count_of(ObjectKind::ExpressionAnimation), 2);
    let started = compositor.started_animations();
    assert_ne!(started[0].animation, started[1].animation);
    let property_set = compositor
        .object(started[1].animation)
        .unwrap()
        .property_set()
        .expect("companion materialized");
    assert_eq!(
        compositor.object(property_set).unwrap().named_value("Scale"),
        Some(&Value::Scalar(3.0))
    );
}

#[test]
fn test_standalone_property_set_keeps_declared_properties() {
    let mut graph = SourceGraph::new();
    let animation = graph
        .insert(NodeKind::from(ExpressionAnimation::new("2.0")))
        .unwrap();
    let set = graph
        .insert(
            Node::new(horizon_compose_graph::PropertySet::default())
                .with_property("Scale", PropertyValue::Scalar(1.0))
                .animate_property("Scale", animation),
        )
        .unwrap();
    let reader = graph
        .insert(NodeKind::from(
            ExpressionAnimation::new("set.Scale").with_parameter("set", set),
        ))
        .unwrap();
    let root = graph
        .insert(Node::new(ContainerVisual::default()).animate("Opacity", reader))
        .unwrap();

    let (compositor, _) = run(&graph, root);

    let started = compositor.started_animations();
    assert_eq!(started.len(), 2);
    let set_object = started[1].snapshot.parameters[0].1;
    assert_eq!(started[0].target, set_object);
    assert_eq!(started[0].property, "Scale");
    assert_eq!(
        compositor.object(set_object).unwrap().named_value("Scale"),
        Some(&Value::Scalar(1.0))
    );
}

// ---------------------------------------------------------------------------
// Unknown kinds and values

fn unrecognized(graph: &mut SourceGraph, family: NodeFamily, tag: u32) -> NodeId {
    graph
        .insert(NodeKind::from(UnrecognizedNode { family, tag }))
        .unwrap()
}

#[test]
fn test_unrecognized_visual_kind() {
    let mut graph = SourceGraph::new();
    let child = unrecognized(&mut graph, NodeFamily::Visual, 42);
    let root = container(&mut graph, vec![child]);
    assert_eq!(
        run_err(&graph, root),
        InstantiationError::UnrecognizedNode {
            node: child,
            family: NodeFamily::Visual,
            tag: 42
        }
    );
}

#[test]
fn test_unrecognized_animation_kind() {
    let mut graph = SourceGraph::new();
    let animation = unrecognized(&mut graph, NodeFamily::Animation, 7);
    let root = graph
        .insert(Node::new(ContainerVisual::default()).animate("Opacity", animation))
        .unwrap();
    assert!(matches!(
        run_err(&graph, root),
        InstantiationError::UnrecognizedNode {
            family: NodeFamily::Animation,
            tag: 7,
            ..
        }
    ));
}

#[test]
fn test_unrecognized_easing_kind() {
    let mut graph = SourceGraph::new();
    let easing = unrecognized(&mut graph, NodeFamily::Easing, 3);
    let animation = graph
        .insert(NodeKind::from(
            KeyFrameAnimation::new(AnimationValueType::Scalar, Duration::from_secs(1))
                .key_frame(0.0, KeyFrameValue::Scalar(0.0), Some(easing)),
        ))
        .unwrap();
    let root = graph
        .insert(Node::new(ContainerVisual::default()).animate("Opacity", animation))
        .unwrap();
    assert_eq!(
        run_err(&graph, root),
        InstantiationError::UnrecognizedNode {
            node: easing,
            family: NodeFamily::Easing,
            tag: 3
        }
    );
}

#[test]
fn test_unrecognized_clip_kind() {
    let mut graph = SourceGraph::new();
    let clip = unrecognized(&mut graph, NodeFamily::Clip, 5);
    let root = graph
        .insert(NodeKind::from(ContainerVisual {
            visual: VisualProperties {
                clip: Some(clip),
                ..Default::default()
            },
            ..Default::default()
        }))
        .unwrap();
    assert!(matches!(
        run_err(&graph, root),
        InstantiationError::UnrecognizedNode {
            family: NodeFamily::Clip,
            ..
        }
    ));
}

#[test]
fn test_unrecognized_geometry_kind() {
    let mut graph = SourceGraph::new();
    let geometry = unrecognized(&mut graph, NodeFamily::Geometry, 11);
    let clip = graph
        .insert(NodeKind::from(GeometricClip {
            geometry: Some(geometry),
            ..Default::default()
        }))
        .unwrap();
    let root = graph
        .insert(NodeKind::from(ContainerVisual {
            visual: VisualProperties {
                clip: Some(clip),
                ..Default::default()
            },
            ..Default::default()
        }))
        .unwrap();
    assert!(matches!(
        run_err(&graph, root),
        InstantiationError::UnrecognizedNode {
            family: NodeFamily::Geometry,
            tag: 11,
            ..
        }
    ));
}

#[test]
fn test_unrecognized_canvas_geometry_kind() {
    let mut graph = SourceGraph::new();
    let canvas = graph
        .insert_geometry(CanvasGeometry::Unrecognized { tag: 9 })
        .unwrap();
    let path = graph
        .insert(NodeKind::from(PathNode { geometry: canvas }))
        .unwrap();
    let geometry = graph
        .insert(NodeKind::from(PathGeometry {
            path: Some(path),
            ..Default::default()
        }))
        .unwrap();
    let shape = graph
        .insert(NodeKind::from(SpriteShape {
            geometry: Some(geometry),
            ..Default::default()
        }))
        .unwrap();
    let root = shape_visual(&mut graph, vec![shape]);
    assert_eq!(
        run_err(&graph, root),
        InstantiationError::UnrecognizedGeometry {
            geometry: canvas,
            tag: 9
        }
    );
}

fn path_shape(graph: &mut SourceGraph, canvas: CanvasGeometry) -> NodeId {
    let canvas = graph.insert_geometry(canvas).unwrap();
    let path = graph
        .insert(NodeKind::from(PathNode { geometry: canvas }))
        .unwrap();
    let geometry = graph
        .insert(NodeKind::from(PathGeometry {
            path: Some(path),
            ..Default::default()
        }))
        .unwrap();
    let shape = graph
        .insert(NodeKind::from(SpriteShape {
            geometry: Some(geometry),
            ..Default::default()
        }))
        .unwrap();
    shape_visual(graph, vec![shape])
}

#[test]
fn test_unrecognized_combine_mode() {
    let mut graph = SourceGraph::new();
    let a = graph
        .insert_geometry(CanvasGeometry::Ellipse {
            center: Vec2::ZERO,
            radius: Vec2::ONE,
        })
        .unwrap();
    let root = path_shape(
        &mut graph,
        CanvasGeometry::Combination {
            a,
            b: a,
            matrix: horizon_compose_graph::Affine2::IDENTITY,
            mode: Tag::Unrecognized(17),
        },
    );
    assert_eq!(
        run_err(&graph, root),
        InstantiationError::UnrecognizedTag(UnrecognizedTag {
            enumeration: CombineMode::NAME,
            tag: 17
        })
    );
}

#[test]
fn test_unrecognized_figure_loop() {
    let mut graph = SourceGraph::new();
    let root = path_shape(
        &mut graph,
        PathBuilder::new()
            .begin_figure(Vec2::ZERO)
            .line_to(Vec2::new(1.0, 0.0))
            .end_figure(Tag::Unrecognized(2))
            .build(),
    );
    assert_eq!(
        run_err(&graph, root),
        InstantiationError::UnrecognizedTag(UnrecognizedTag {
            enumeration: FigureLoop::NAME,
            tag: 2
        })
    );
}

#[test]
fn test_unrecognized_stroke_cap_and_line_join() {
    for (shape, enumeration) in [
        (
            SpriteShape {
                stroke_end_cap: Some(Tag::Unrecognized(8)),
                ..Default::default()
            },
            StrokeCap::NAME,
        ),
        (
            SpriteShape {
                stroke_line_join: Some(Tag::Unrecognized(8)),
                ..Default::default()
            },
            LineJoin::NAME,
        ),
    ] {
        let mut graph = SourceGraph::new();
        let shape = graph.insert(NodeKind::from(shape)).unwrap();
        let root = shape_visual(&mut graph, vec![shape]);
        assert_eq!(
            run_err(&graph, root),
            InstantiationError::UnrecognizedTag(UnrecognizedTag { enumeration, tag: 8 })
        );
    }
}

#[test]
fn test_unrecognized_border_mode() {
    let mut graph = SourceGraph::new();
    let root = graph
        .insert(NodeKind::from(ContainerVisual {
            visual: VisualProperties {
                border_mode: Some(Tag::Unrecognized(4)),
                ..Default::default()
            },
            ..Default::default()
        }))
        .unwrap();
    assert_eq!(
        run_err(&graph, root),
        InstantiationError::UnrecognizedTag(UnrecognizedTag {
            enumeration: BorderMode::NAME,
            tag: 4
        })
    );
}

#[test]
fn test_wrong_family_reference() {
    let mut graph = SourceGraph::new();
    let not_a_brush = graph
        .insert(NodeKind::from(EllipseGeometry::default()))
        .unwrap();
    let root = graph
        .insert(NodeKind::from(SpriteVisual {
            brush: Some(not_a_brush),
            ..Default::default()
        }))
        .unwrap();
    assert_eq!(
        run_err(&graph, root),
        InstantiationError::UnexpectedKind {
            node: not_a_brush,
            expected: NodeFamily::Brush,
            found: "EllipseGeometry"
        }
    );
}

// ---------------------------------------------------------------------------
// Roots

#[test]
fn test_root_must_be_visual() {
    let mut graph = SourceGraph::new();
    let brush = graph
        .insert(NodeKind::from(ColorBrush::default()))
        .unwrap();
    assert_eq!(
        run_err(&graph, brush),
        InstantiationError::RootNotVisual {
            node: brush,
            kind: "ColorBrush"
        }
    );
}

#[test]
fn test_root_from_another_graph() {
    let mut other = SourceGraph::new();
    let _ = other.insert(NodeKind::from(ColorBrush::default())).unwrap();
    let foreign = container(&mut other, Vec::new());

    let graph = SourceGraph::new();
    assert_eq!(
        run_err(&graph, foreign),
        InstantiationError::MissingNode { node: foreign }
    );
}

// ---------------------------------------------------------------------------
// End to end

#[test]
fn test_single_sprite_scene() {
    for shape_count in [1, 2] {
        let mut graph = SourceGraph::new();
        let ellipse = graph
            .insert(NodeKind::from(EllipseGeometry {
                radius: Some(Vec2::new(5.0, 5.0)),
                ..Default::default()
            }))
            .unwrap();
        let red = graph
            .insert(NodeKind::from(ColorBrush {
                color: Some(Color::RED),
            }))
            .unwrap();
        let shapes: Vec<NodeId> = (0..shape_count)
            .map(|_| {
                graph
                    .insert(NodeKind::from(SpriteShape {
                        geometry: Some(ellipse),
                        fill_brush: Some(red),
                        ..Default::default()
                    }))
                    .unwrap()
            })
            .collect();
        let visual = shape_visual(&mut graph, shapes);
        let root = container(&mut graph, vec![visual]);

        let (compositor, root) = run(&graph, root);

        assert_eq!(compositor.count_of(ObjectKind::ContainerVisual), 1);
        assert_eq!(compositor.count_of(ObjectKind::ShapeVisual), 1);
        assert_eq!(compositor.count_of(ObjectKind::SpriteShape), shape_count);
        assert_eq!(compositor.count_of(ObjectKind::EllipseGeometry), 1);
        assert_eq!(compositor.count_of(ObjectKind::ColorBrush), 1);

        let visual = compositor.object(root).unwrap().items(Collection::Children)[0];
        for shape in compositor.object(visual).unwrap().items(Collection::Shapes) {
            let shape = compositor.object(*shape).unwrap();
            let geometry = shape.object_property(Property::Geometry).unwrap();
            assert_eq!(
                compositor.object(geometry).unwrap().property(Property::Radius),
                Some(&Value::Vector2(Vec2::new(5.0, 5.0)))
            );
            let brush = shape.object_property(Property::FillBrush).unwrap();
            assert_eq!(
                compositor.object(brush).unwrap().property(Property::Color),
                Some(&Value::Color(Color::RED))
            );
        }
    }
}

#[test]
fn test_ellipse_scene() {
    let mut graph = SourceGraph::new();
    let ellipse = graph
        .insert(NodeKind::from(EllipseGeometry {
            center: Some(Vec2::new(50.0, 50.0)),
            radius: Some(Vec2::splat(25.0)),
            ..Default::default()
        }))
        .unwrap();
    let red = graph
        .insert(NodeKind::from(ColorBrush {
            color: Some(Color::RED),
        }))
        .unwrap();
    let pulse = graph
        .insert(NodeKind::from(
            KeyFrameAnimation::new(AnimationValueType::Vector2, Duration::from_secs(2))
                .key_frame(0.0, KeyFrameValue::Vector2(Vec2::splat(25.0)), None)
                .key_frame(1.0, KeyFrameValue::Vector2(Vec2::splat(40.0)), None),
        ))
        .unwrap();
    let radius = graph
        .insert(Node::new(EllipseGeometry::default()).animate("Radius", pulse))
        .unwrap();
    let circle = graph
        .insert(
            Node::new(SpriteShape {
                geometry: Some(ellipse),
                fill_brush: Some(red),
                ..Default::default()
            })
            .with_comment("circle"),
        )
        .unwrap();
    let ring = graph
        .insert(
            Node::new(SpriteShape {
                geometry: Some(radius),
                stroke_brush: Some(red),
                stroke_thickness: Some(2.0),
                ..Default::default()
            })
            .with_comment("ring"),
        )
        .unwrap();
    let shapes = graph
        .insert(
            Node::new(ShapeVisual {
                shapes: vec![circle, ring],
                visual: VisualProperties {
                    size: Some(Vec2::splat(100.0)),
                    ..Default::default()
                },
                ..Default::default()
            })
            .with_comment("shapes"),
        )
        .unwrap();
    let root = graph
        .insert(
            Node::new(ContainerVisual {
                children: vec![shapes],
                ..Default::default()
            })
            .with_comment("root"),
        )
        .unwrap();

    let (compositor, root) = run(&graph, root);

    assert_eq!(compositor.count_of(ObjectKind::ColorBrush), 1);
    assert_eq!(compositor.count_of(ObjectKind::EllipseGeometry), 2);
    assert_eq!(compositor.count_of(ObjectKind::Vector2KeyFrameAnimation), 1);
    assert_eq!(compositor.started_animations().len(), 1);
    assert_eq!(compositor.started_animations()[0].property, "Radius");

    let tree = compositor.format_tree(root);
    assert_eq!(
        tree,
        "ContainerVisual \"root\"\n\
         \u{2514}\u{2500}\u{2500} ShapeVisual \"shapes\"\n    \
         \u{251c}\u{2500}\u{2500} SpriteShape \"circle\"\n    \
         \u{2514}\u{2500}\u{2500} SpriteShape \"ring\"\n"
    );
}

#[test]
fn test_default_entry_point() {
    let mut graph = SourceGraph::new();
    let root = commented(&mut graph, "root");
    let mut compositor = RecordingCompositor::new();
    let object = horizon_compose::materialize(&mut compositor, &graph, root).unwrap();
    assert_eq!(
        compositor.object(object).unwrap().string(Property::Comment),
        Some("root")
    );
}
