//! An in-memory compositor that records every call.
//!
//! [`RecordingCompositor`] implements [`Compositor`] without any native
//! backend. It keeps a log of calls, the ordered property writes of every
//! object, collections, key frames and reference parameters, and a snapshot
//! of each animation taken at the moment it is started. It is used for
//! headless validation of description graphs and as the test double for the
//! instantiator.
//!
//! # Example
//!
//! ```
//! use horizon_compose::recording::RecordingCompositor;
//! use horizon_compose::{materialize, ObjectKind, Property, Value};
//! use horizon_compose_graph::{ContainerVisual, NodeKind, SourceGraph, Vec3};
//!
//! let mut graph = SourceGraph::new();
//! let root = graph.insert(NodeKind::from(ContainerVisual {
//!     visual: horizon_compose_graph::VisualProperties {
//!         offset: Some(Vec3::new(1.0, 2.0, 0.0)),
//!         ..Default::default()
//!     },
//!     ..Default::default()
//! }))?;
//!
//! let mut compositor = RecordingCompositor::new();
//! let visual = materialize(&mut compositor, &graph, root)?;
//!
//! let recorded = compositor.object(visual).unwrap();
//! assert_eq!(recorded.object_kind(), Some(ObjectKind::ContainerVisual));
//! assert_eq!(
//!     recorded.property(Property::Offset),
//!     Some(&Value::Vector3(Vec3::new(1.0, 2.0, 0.0)))
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::HashMap;
use std::fmt;

use horizon_compose_graph::{Affine2, CombineMode, FillRule, Vec2};
use slotmap::{SlotMap, new_key_type};

use crate::compositor::{
    CanvasPathCommand, Collection, Compositor, NativeKeyFrame, ObjectKind, Property, Value,
};

new_key_type! {
    /// Handle of an object in a [`RecordingCompositor`].
    pub struct RecordedId;
}

/// Handle of a canvas geometry in a [`RecordingCompositor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(usize);

/// What a recorded object is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedKind {
    /// Created with [`Compositor::create_object`].
    Object(ObjectKind),
    /// Created with [`Compositor::create_path`].
    Path(GeometryHandle),
    /// The property set carried by `owner`.
    PropertySet { owner: RecordedId },
    /// Returned by [`Compositor::start_animation`].
    Controller { target: RecordedId },
}

impl fmt::Display for RecordedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(kind) => write!(f, "{kind:?}"),
            Self::Path(_) => f.write_str("Path"),
            Self::PropertySet { .. } => f.write_str("PropertySet"),
            Self::Controller { .. } => f.write_str("AnimationController"),
        }
    }
}

/// The recorded state of one object.
#[derive(Debug, Clone)]
pub struct RecordedObject {
    kind: RecordedKind,
    writes: Vec<(Property, Value<RecordedId>)>,
    named: Vec<(String, Value<RecordedId>)>,
    collections: HashMap<Collection, Vec<RecordedId>>,
    key_frames: Vec<NativeKeyFrame<RecordedId>>,
    parameters: Vec<(String, RecordedId)>,
    property_set: Option<RecordedId>,
    paused: bool,
}

impl RecordedObject {
    fn new(kind: RecordedKind) -> Self {
        Self {
            kind,
            writes: Vec::new(),
            named: Vec::new(),
            collections: HashMap::new(),
            key_frames: Vec::new(),
            parameters: Vec::new(),
            property_set: None,
            paused: false,
        }
    }

    pub fn kind(&self) -> RecordedKind {
        self.kind
    }

    /// The object kind, for objects created with `create_object`.
    pub fn object_kind(&self) -> Option<ObjectKind> {
        match self.kind {
            RecordedKind::Object(kind) => Some(kind),
            _ => None,
        }
    }

    /// The last value written to `property`, if it was ever written.
    pub fn property(&self, property: Property) -> Option<&Value<RecordedId>> {
        self.writes
            .iter()
            .rev()
            .find(|(p, _)| *p == property)
            .map(|(_, value)| value)
    }

    /// How many times `property` was written.
    pub fn write_count(&self, property: Property) -> usize {
        self.writes.iter().filter(|(p, _)| *p == property).count()
    }

    /// Every property write, in order.
    pub fn writes(&self) -> &[(Property, Value<RecordedId>)] {
        &self.writes
    }

    /// The last string written to `property`.
    pub fn string(&self, property: Property) -> Option<&str> {
        match self.property(property) {
            Some(Value::String(text)) => Some(text),
            _ => None,
        }
    }

    /// The object last written to `property`.
    pub fn object_property(&self, property: Property) -> Option<RecordedId> {
        match self.property(property) {
            Some(Value::Object(id)) => Some(*id),
            _ => None,
        }
    }

    /// A named value inserted into this property set.
    pub fn named_value(&self, name: &str) -> Option<&Value<RecordedId>> {
        self.named
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Items appended to `collection`, in order.
    pub fn items(&self, collection: Collection) -> &[RecordedId] {
        self.collections
            .get(&collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn key_frames(&self) -> &[NativeKeyFrame<RecordedId>] {
        &self.key_frames
    }

    /// Current reference parameters.
    pub fn parameters(&self) -> &[(String, RecordedId)] {
        &self.parameters
    }

    /// The property set fetched for this object, if any.
    pub fn property_set(&self) -> Option<RecordedId> {
        self.property_set
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

/// The state of an animation at the moment it was started.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSnapshot {
    pub kind: RecordedKind,
    pub comment: Option<String>,
    pub target: Option<String>,
    pub expression: Option<String>,
    pub parameters: Vec<(String, RecordedId)>,
    pub key_frames: Vec<NativeKeyFrame<RecordedId>>,
}

/// One call to [`Compositor::start_animation`].
#[derive(Debug, Clone, PartialEq)]
pub struct StartedAnimation {
    pub target: RecordedId,
    pub property: String,
    pub animation: RecordedId,
    pub controller: RecordedId,
    pub snapshot: AnimationSnapshot,
}

/// A recorded canvas geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedGeometry {
    Ellipse {
        center: Vec2,
        radius: Vec2,
    },
    RoundedRectangle {
        origin: Vec2,
        size: Vec2,
        radius: Vec2,
    },
    Combination {
        a: GeometryHandle,
        b: GeometryHandle,
        matrix: Affine2,
        mode: CombineMode,
    },
    Group {
        fill_rule: FillRule,
        members: Vec<GeometryHandle>,
    },
    Transformed {
        source: GeometryHandle,
        matrix: Affine2,
    },
    Path {
        fill_rule: FillRule,
        commands: Vec<CanvasPathCommand>,
    },
}

/// One recorded compositor call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create {
        object: RecordedId,
        kind: ObjectKind,
    },
    CreatePath {
        object: RecordedId,
        geometry: GeometryHandle,
    },
    FetchPropertySet {
        owner: RecordedId,
        property_set: RecordedId,
    },
    SetProperty {
        object: RecordedId,
        property: Property,
    },
    InsertProperty {
        property_set: RecordedId,
        name: String,
    },
    Append {
        container: RecordedId,
        collection: Collection,
        item: RecordedId,
    },
    InsertKeyFrame {
        animation: RecordedId,
    },
    SetReferenceParameter {
        animation: RecordedId,
        name: String,
        object: RecordedId,
    },
    ClearParameters {
        animation: RecordedId,
    },
    StartAnimation {
        target: RecordedId,
        property: String,
        animation: RecordedId,
        controller: RecordedId,
    },
    Pause {
        controller: RecordedId,
    },
    CreateGeometry {
        geometry: GeometryHandle,
    },
}

/// A [`Compositor`] that records instead of rendering.
#[derive(Debug, Default)]
pub struct RecordingCompositor {
    objects: SlotMap<RecordedId, RecordedObject>,
    geometries: Vec<RecordedGeometry>,
    calls: Vec<Call>,
    started: Vec<StartedAnimation>,
}

impl RecordingCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(&self, id: RecordedId) -> Option<&RecordedObject> {
        self.objects.get(id)
    }

    pub fn geometry(&self, handle: GeometryHandle) -> Option<&RecordedGeometry> {
        self.geometries.get(handle.0)
    }

    /// Every call, in order.
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Every started animation, in start order.
    pub fn started_animations(&self) -> &[StartedAnimation] {
        &self.started
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of objects created with `kind`.
    pub fn count_of(&self, kind: ObjectKind) -> usize {
        self.objects
            .values()
            .filter(|object| object.kind == RecordedKind::Object(kind))
            .count()
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    /// Render the visual/shape tree below `root` as indented text.
    pub fn format_tree(&self, root: RecordedId) -> String {
        let mut output = String::new();
        self.format_subtree_into(root, "", None, &mut output);
        output
    }

    fn format_subtree_into(
        &self,
        id: RecordedId,
        prefix: &str,
        is_last: Option<bool>,
        output: &mut String,
    ) {
        let Some(object) = self.objects.get(id) else {
            output.push_str(&format!("{prefix}(missing {id:?})\n"));
            return;
        };

        let connector = match is_last {
            None => "",
            Some(true) => "\u{2514}\u{2500}\u{2500} ",
            Some(false) => "\u{251c}\u{2500}\u{2500} ",
        };
        output.push_str(prefix);
        output.push_str(connector);
        output.push_str(&object.kind.to_string());
        if let Some(comment) = object.string(Property::Comment) {
            output.push_str(&format!(" \"{comment}\""));
        }
        output.push('\n');

        let child_prefix = match is_last {
            None => prefix.to_string(),
            Some(true) => format!("{prefix}    "),
            Some(false) => format!("{prefix}\u{2502}   "),
        };
        let children: Vec<RecordedId> = object
            .items(Collection::Shapes)
            .iter()
            .chain(object.items(Collection::Children))
            .copied()
            .collect();
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.format_subtree_into(child, &child_prefix, Some(i + 1 == count), output);
        }
    }

    fn insert(&mut self, kind: RecordedKind) -> RecordedId {
        self.objects.insert(RecordedObject::new(kind))
    }

    fn push_geometry(&mut self, geometry: RecordedGeometry) -> GeometryHandle {
        let handle = GeometryHandle(self.geometries.len());
        self.geometries.push(geometry);
        self.calls.push(Call::CreateGeometry { geometry: handle });
        handle
    }

    fn snapshot(&self, animation: RecordedId) -> Option<AnimationSnapshot> {
        let object = self.objects.get(animation)?;
        Some(AnimationSnapshot {
            kind: object.kind,
            comment: object.string(Property::Comment).map(str::to_owned),
            target: object.string(Property::Target).map(str::to_owned),
            expression: object.string(Property::Expression).map(str::to_owned),
            parameters: object.parameters.clone(),
            key_frames: object.key_frames.clone(),
        })
    }
}

impl Compositor for RecordingCompositor {
    type Object = RecordedId;
    type Geometry = GeometryHandle;

    fn create_object(&mut self, kind: ObjectKind) -> RecordedId {
        let object = self.insert(RecordedKind::Object(kind));
        self.calls.push(Call::Create { object, kind });
        object
    }

    fn create_path(&mut self, geometry: &GeometryHandle) -> RecordedId {
        let object = self.insert(RecordedKind::Path(*geometry));
        self.calls.push(Call::CreatePath {
            object,
            geometry: *geometry,
        });
        object
    }

    fn property_set(&mut self, owner: &RecordedId) -> RecordedId {
        let existing = self.objects.get(*owner).and_then(|object| object.property_set);
        let property_set = match existing {
            Some(property_set) => property_set,
            None => {
                let property_set = self.insert(RecordedKind::PropertySet { owner: *owner });
                if let Some(object) = self.objects.get_mut(*owner) {
                    object.property_set = Some(property_set);
                }
                property_set
            }
        };
        self.calls.push(Call::FetchPropertySet {
            owner: *owner,
            property_set,
        });
        property_set
    }

    fn set_property(&mut self, object: &RecordedId, property: Property, value: Value<RecordedId>) {
        if let Some(recorded) = self.objects.get_mut(*object) {
            recorded.writes.push((property, value));
        }
        self.calls.push(Call::SetProperty {
            object: *object,
            property,
        });
    }

    fn insert_property(&mut self, property_set: &RecordedId, name: &str, value: Value<RecordedId>) {
        if let Some(recorded) = self.objects.get_mut(*property_set) {
            recorded.named.push((name.to_owned(), value));
        }
        self.calls.push(Call::InsertProperty {
            property_set: *property_set,
            name: name.to_owned(),
        });
    }

    fn append(&mut self, container: &RecordedId, collection: Collection, item: &RecordedId) {
        if let Some(recorded) = self.objects.get_mut(*container) {
            recorded.collections.entry(collection).or_default().push(*item);
        }
        self.calls.push(Call::Append {
            container: *container,
            collection,
            item: *item,
        });
    }

    fn insert_key_frame(&mut self, animation: &RecordedId, key_frame: NativeKeyFrame<RecordedId>) {
        if let Some(recorded) = self.objects.get_mut(*animation) {
            recorded.key_frames.push(key_frame);
        }
        self.calls.push(Call::InsertKeyFrame {
            animation: *animation,
        });
    }

    fn set_reference_parameter(&mut self, animation: &RecordedId, name: &str, object: &RecordedId) {
        if let Some(recorded) = self.objects.get_mut(*animation) {
            match recorded.parameters.iter_mut().find(|(n, _)| n == name) {
                Some(parameter) => parameter.1 = *object,
                None => recorded.parameters.push((name.to_owned(), *object)),
            }
        }
        self.calls.push(Call::SetReferenceParameter {
            animation: *animation,
            name: name.to_owned(),
            object: *object,
        });
    }

    fn clear_parameters(&mut self, animation: &RecordedId) {
        if let Some(recorded) = self.objects.get_mut(*animation) {
            recorded.parameters.clear();
        }
        self.calls.push(Call::ClearParameters {
            animation: *animation,
        });
    }

    fn start_animation(
        &mut self,
        target: &RecordedId,
        property: &str,
        animation: &RecordedId,
    ) -> RecordedId {
        let controller = self.insert(RecordedKind::Controller { target: *target });
        if let Some(snapshot) = self.snapshot(*animation) {
            self.started.push(StartedAnimation {
                target: *target,
                property: property.to_owned(),
                animation: *animation,
                controller,
                snapshot,
            });
        }
        self.calls.push(Call::StartAnimation {
            target: *target,
            property: property.to_owned(),
            animation: *animation,
            controller,
        });
        controller
    }

    fn pause(&mut self, controller: &RecordedId) {
        if let Some(recorded) = self.objects.get_mut(*controller) {
            recorded.paused = true;
        }
        self.calls.push(Call::Pause {
            controller: *controller,
        });
    }

    fn create_ellipse(&mut self, center: Vec2, radius: Vec2) -> GeometryHandle {
        self.push_geometry(RecordedGeometry::Ellipse { center, radius })
    }

    fn create_rounded_rectangle(&mut self, origin: Vec2, size: Vec2, radius: Vec2) -> GeometryHandle {
        self.push_geometry(RecordedGeometry::RoundedRectangle {
            origin,
            size,
            radius,
        })
    }

    fn create_combination(
        &mut self,
        a: &GeometryHandle,
        b: &GeometryHandle,
        matrix: Affine2,
        mode: CombineMode,
    ) -> GeometryHandle {
        self.push_geometry(RecordedGeometry::Combination {
            a: *a,
            b: *b,
            matrix,
            mode,
        })
    }

    fn create_group(&mut self, fill_rule: FillRule, geometries: &[GeometryHandle]) -> GeometryHandle {
        self.push_geometry(RecordedGeometry::Group {
            fill_rule,
            members: geometries.to_vec(),
        })
    }

    fn create_transformed(&mut self, source: &GeometryHandle, matrix: Affine2) -> GeometryHandle {
        self.push_geometry(RecordedGeometry::Transformed {
            source: *source,
            matrix,
        })
    }

    fn create_path_geometry(
        &mut self,
        fill_rule: FillRule,
        commands: &[CanvasPathCommand],
    ) -> GeometryHandle {
        self.push_geometry(RecordedGeometry::Path {
            fill_rule,
            commands: commands.to_vec(),
        })
    }
}
