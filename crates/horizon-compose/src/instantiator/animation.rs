//! Animations, animation controllers and the shared expression animation.
//!
//! Under [`ExpressionAnimationPolicy::Reuse`](crate::ExpressionAnimationPolicy::Reuse)
//! every expression animation occurrence reconfigures one scratch object
//! owned by the session. Each reconfiguration clears every parameter and
//! rewrites comment, target and expression, and it happens only after all of
//! the occurrence's reference parameters are materialized: materializing a
//! parameter can start other expression animations, which would otherwise
//! overwrite the scratch object between configuration and start.
//!
//! An expression node that has animators, or a companion property set with
//! values or animators, is always materialized as its own memoized object:
//! the scratch object never gets a companion and never has animations
//! started on it.

use horizon_compose_graph::{
    AnimationController, AnimationValueType, Animator, ExpressionAnimation, KeyFrameAnimation,
    KeyFrameValue, NodeFamily, NodeId, NodeKind, SourceNode,
};

use super::{Session, kind_mismatch};
use crate::compositor::{Compositor, KeyFrameContent, NativeKeyFrame, ObjectKind, Property, Value};
use crate::error::{InstantiationError, InstantiationResult};
use crate::logging::targets;

pub(super) fn key_frame_object_kind(value_type: AnimationValueType) -> ObjectKind {
    match value_type {
        AnimationValueType::Scalar => ObjectKind::ScalarKeyFrameAnimation,
        AnimationValueType::Vector2 => ObjectKind::Vector2KeyFrameAnimation,
        AnimationValueType::Vector3 => ObjectKind::Vector3KeyFrameAnimation,
        AnimationValueType::Vector4 => ObjectKind::Vector4KeyFrameAnimation,
        AnimationValueType::Color => ObjectKind::ColorKeyFrameAnimation,
        AnimationValueType::Boolean => ObjectKind::BooleanKeyFrameAnimation,
        AnimationValueType::Path => ObjectKind::PathKeyFrameAnimation,
    }
}

impl<'a, C: Compositor> Session<'a, C> {
    /// Start every animator on `target`, in declaration order.
    pub(super) fn start_animations(
        &mut self,
        target: &C::Object,
        animators: &'a [Animator],
    ) -> InstantiationResult<()> {
        for animator in animators {
            let animation = self.object_of(animator.animation, NodeFamily::Animation)?;
            let controller = self
                .compositor
                .start_animation(target, &animator.property, &animation);
            self.stats.animations_started += 1;
            tracing::debug!(
                target: targets::ANIMATION,
                property = %animator.property,
                animation = ?animator.animation,
                "started animation"
            );

            if let Some(controller_id) = animator.controller {
                self.bind_controller(controller_id, controller)?;
            }
        }
        Ok(())
    }

    /// Pause a freshly started animation if its controller says so, and
    /// register the controller object on first sight.
    fn bind_controller(&mut self, id: NodeId, controller: C::Object) -> InstantiationResult<()> {
        let node = self.node(id)?;
        let NodeKind::AnimationController(source) = node.kind() else {
            return Err(kind_mismatch(id, node, NodeFamily::AnimationController));
        };

        if source.is_paused {
            self.compositor.pause(&controller);
            self.stats.controllers_paused += 1;
            tracing::debug!(target: targets::ANIMATION, ?id, "paused animation controller");
        }

        if !self.objects.contains_key(id) {
            self.objects.insert(id, controller.clone());
            self.initialize(id, node, &controller)?;
        }
        Ok(())
    }

    /// A controller reached through a reference rather than an animator.
    ///
    /// The controller object only exists once its animation has started, so
    /// materialize the node that drives it, which starts its animators.
    pub(super) fn referenced_controller(
        &mut self,
        id: NodeId,
        node: &'a SourceNode,
        controller: &AnimationController,
    ) -> InstantiationResult<C::Object> {
        self.object(node.driver().unwrap_or(controller.target))?;
        self.objects
            .get(id)
            .cloned()
            .ok_or(InstantiationError::ControllerNotStarted { node: id })
    }

    fn reference_parameters(
        &mut self,
        parameters: &'a [(String, NodeId)],
    ) -> InstantiationResult<Vec<(&'a str, C::Object)>> {
        parameters
            .iter()
            .map(|(name, id)| Ok((name.as_str(), self.object(*id)?)))
            .collect()
    }

    /// Whether an expression node animates itself or its companion property
    /// set, which rules out the shared scratch object.
    pub(super) fn has_own_animations(&self, node: &SourceNode) -> bool {
        if !node.animators().is_empty() {
            return true;
        }
        self.graph.node(node.properties()).is_some_and(|companion| {
            !companion.animators().is_empty()
                || matches!(companion.kind(), NodeKind::PropertySet(set) if !set.values.is_empty())
        })
    }

    /// Configure the shared expression animation for one occurrence.
    pub(super) fn reused_expression_animation(
        &mut self,
        id: NodeId,
        node: &'a SourceNode,
        expression: &'a ExpressionAnimation,
    ) -> InstantiationResult<C::Object> {
        let parameters = self.reference_parameters(&expression.reference_parameters)?;

        let animation = if let Some(animation) = self.scratch_expression.clone() {
            self.stats.expression_reuses += 1;
            animation
        } else {
            let animation = self.create(ObjectKind::ExpressionAnimation);
            self.scratch_expression = Some(animation.clone());
            animation
        };

        self.compositor.clear_parameters(&animation);
        self.compositor.set_property(
            &animation,
            Property::Comment,
            Value::String(node.comment().unwrap_or_default().to_owned()),
        );
        self.compositor.set_property(
            &animation,
            Property::Target,
            Value::String(expression.target.clone().unwrap_or_default()),
        );
        self.compositor.set_property(
            &animation,
            Property::Expression,
            Value::String(expression.expression.clone()),
        );
        for (name, object) in &parameters {
            self.compositor.set_reference_parameter(&animation, name, object);
        }

        tracing::trace!(target: targets::ANIMATION, ?id, "reconfigured shared expression animation");
        Ok(animation)
    }

    /// Properties of a memoized expression animation.
    pub(super) fn expression_animation_properties(
        &mut self,
        target: &C::Object,
        expression: &'a ExpressionAnimation,
    ) -> InstantiationResult<()> {
        let parameters = self.reference_parameters(&expression.reference_parameters)?;
        self.set(target, Property::Target, expression.target.clone());
        self.compositor.set_property(
            target,
            Property::Expression,
            Value::String(expression.expression.clone()),
        );
        for (name, object) in &parameters {
            self.compositor.set_reference_parameter(target, name, object);
        }
        Ok(())
    }

    pub(super) fn key_frame_animation_properties(
        &mut self,
        target: &C::Object,
        animation: &'a KeyFrameAnimation,
    ) -> InstantiationResult<()> {
        self.set(target, Property::Target, animation.target.clone());
        self.compositor
            .set_property(target, Property::Duration, Value::Duration(animation.duration));

        let parameters = self.reference_parameters(&animation.reference_parameters)?;
        for (name, object) in &parameters {
            self.compositor.set_reference_parameter(target, name, object);
        }

        for frame in &animation.key_frames {
            let easing = frame
                .easing
                .map(|easing| self.object_of(easing, NodeFamily::Easing))
                .transpose()?;
            let content = match &frame.value {
                KeyFrameValue::Scalar(v) => KeyFrameContent::Value(Value::Scalar(*v)),
                KeyFrameValue::Vector2(v) => KeyFrameContent::Value(Value::Vector2(*v)),
                KeyFrameValue::Vector3(v) => KeyFrameContent::Value(Value::Vector3(*v)),
                KeyFrameValue::Vector4(v) => KeyFrameContent::Value(Value::Vector4(*v)),
                KeyFrameValue::Color(v) => KeyFrameContent::Value(Value::Color(*v)),
                KeyFrameValue::Boolean(v) => KeyFrameContent::Value(Value::Boolean(*v)),
                KeyFrameValue::Path(path) => {
                    KeyFrameContent::Value(Value::Object(self.object_of(*path, NodeFamily::Path)?))
                }
                KeyFrameValue::Expression(expression) => {
                    KeyFrameContent::Expression(expression.clone())
                }
            };
            self.compositor.insert_key_frame(
                target,
                NativeKeyFrame {
                    progress: frame.progress,
                    content,
                    easing,
                },
            );
        }
        Ok(())
    }
}
