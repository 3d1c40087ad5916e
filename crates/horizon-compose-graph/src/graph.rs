//! Arena storage for description graphs.

use slotmap::SlotMap;

use crate::canvas::{CanvasGeometry, GeometryId};
use crate::error::{GraphError, GraphResult};
use crate::logging::targets;
use crate::node::{Node, NodeId, NodeKind, PropertySet, SourceNode};

/// An immutable-once-inserted description graph.
///
/// Nodes and canvas geometries live in arenas keyed by [`NodeId`] and
/// [`GeometryId`]. Insertion validates every reference against the nodes
/// already present, so a node can only point at nodes inserted before it and
/// the graph is acyclic by construction. There is no way to mutate a node
/// after insertion.
///
/// Inserting any node other than a property set also inserts its companion
/// property set, reachable through [`SourceNode::properties`].
#[derive(Debug, Clone, Default)]
pub struct SourceGraph {
    nodes: SlotMap<NodeId, SourceNode>,
    geometries: SlotMap<GeometryId, CanvasGeometry>,
}

static_assertions::assert_impl_all!(SourceGraph: Send, Sync);

impl SourceGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node and return its identity.
    pub fn insert(&mut self, node: impl Into<Node>) -> GraphResult<NodeId> {
        let node = node.into();
        self.check_references(&node)?;

        let Node {
            kind,
            comment,
            animators,
            properties,
        } = node;

        if let NodeKind::PropertySet(mut set) = kind {
            // A property set is its own companion: its bag merges into it.
            set.values.extend(properties.values);
            let mut animators = animators;
            animators.extend(properties.animators);
            let id = self.nodes.insert_with_key(|id| SourceNode {
                kind: NodeKind::PropertySet(set),
                comment,
                animators,
                properties: id,
                owner: None,
                driver: None,
            });
            self.record_drivers(id);
            tracing::trace!(target: targets::GRAPH, ?id, "inserted property set");
            return Ok(id);
        }

        let name = kind.name();
        let companion = self.nodes.insert_with_key(|ps| SourceNode {
            kind: NodeKind::PropertySet(PropertySet {
                values: properties.values,
            }),
            comment: None,
            animators: properties.animators,
            properties: ps,
            owner: None,
            driver: None,
        });
        let id = self.nodes.insert(SourceNode {
            kind,
            comment,
            animators,
            properties: companion,
            owner: None,
            driver: None,
        });
        if let Some(ps) = self.nodes.get_mut(companion) {
            ps.owner = Some(id);
        }
        self.record_drivers(companion);
        self.record_drivers(id);
        tracing::trace!(target: targets::GRAPH, ?id, kind = name, "inserted node");
        Ok(id)
    }

    /// Insert a canvas geometry and return its identity.
    pub fn insert_geometry(&mut self, geometry: CanvasGeometry) -> GraphResult<GeometryId> {
        for operand in geometry.operands() {
            self.check_geometry(operand)?;
        }
        Ok(self.geometries.insert(geometry))
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&SourceNode> {
        self.nodes.get(id)
    }

    /// Look up a canvas geometry.
    pub fn geometry(&self, id: GeometryId) -> Option<&CanvasGeometry> {
        self.geometries.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes, companion property sets included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    /// Iterate over all nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SourceNode)> {
        self.nodes.iter()
    }

    fn check_references(&self, node: &Node) -> GraphResult<()> {
        for id in node.kind.node_references() {
            self.check_node(id)?;
        }
        if let Some(geometry) = node.kind.geometry_reference() {
            self.check_geometry(geometry)?;
        }
        for animator in node.animators.iter().chain(&node.properties.animators) {
            self.check_node(animator.animation)?;
            if let Some(controller) = animator.controller {
                self.check_node(controller)?;
            }
        }
        Ok(())
    }

    /// Mark `id` as the driver of every controller its animators use, unless
    /// the controller already has one.
    fn record_drivers(&mut self, id: NodeId) {
        let controllers: Vec<NodeId> = self
            .nodes
            .get(id)
            .map(|node| node.animators.iter().filter_map(|a| a.controller).collect())
            .unwrap_or_default();
        for controller in controllers {
            if let Some(node) = self.nodes.get_mut(controller) {
                node.driver.get_or_insert(id);
            }
        }
    }

    fn check_node(&self, node: NodeId) -> GraphResult<()> {
        if self.nodes.contains_key(node) {
            Ok(())
        } else {
            Err(GraphError::DanglingNode { node })
        }
    }

    fn check_geometry(&self, geometry: GeometryId) -> GraphResult<()> {
        if self.geometries.contains_key(geometry) {
            Ok(())
        } else {
            Err(GraphError::DanglingGeometry { geometry })
        }
    }
}
