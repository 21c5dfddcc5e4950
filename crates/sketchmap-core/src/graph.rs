//! The mind-map graph model.
//!
//! A [`Graph`] is an insertion-ordered set of [`Node`]s plus a list of
//! directed [`Edge`]s between them. Insertion order matters: every consumer
//! (layout, export) walks nodes in that order, which is what makes layouts
//! reproducible.
//!
//! # Invariants
//!
//! - Node identifiers are unique.
//! - Every edge references two existing, distinct nodes. Offending edges are
//!   dropped with a warning instead of failing the whole graph.
//! - At most one edge joins any two nodes, in either direction.
//! - Cycles are allowed; all traversals here are iterative with visited sets.

use std::{collections::HashSet, fmt};

use indexmap::IndexMap;
use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::{geometry::Point, identifier::Id};

/// Label given to nodes that have no recognizable text attached.
pub const UNTITLED_LABEL: &str = "Untitled";

/// Structural role of a node in the mind map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The designated central concept.
    Root,
    /// A non-root node with at least one outgoing edge.
    Branch,
    /// A non-root node without outgoing edges.
    #[default]
    Leaf,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Root => "root",
            Self::Branch => "branch",
            Self::Leaf => "leaf",
        };
        f.write_str(name)
    }
}

/// A concept in the mind map.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: Id,
    label: String,
    role: Role,
    position: Option<Point>,
}

impl Node {
    /// Creates an unpositioned leaf node. Blank labels become [`UNTITLED_LABEL`].
    pub fn new(id: Id, label: impl Into<String>) -> Self {
        let label = label.into();
        let label = if label.trim().is_empty() {
            UNTITLED_LABEL.to_string()
        } else {
            label
        };
        Self {
            id,
            label,
            role: Role::default(),
            position: None,
        }
    }

    /// Sets the role (builder style).
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Sets the position (builder style).
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    /// Returns the node identifier.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Returns the display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the structural role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Position assigned by the layout engine, `None` before layout
    pub fn position(&self) -> Option<Point> {
        self.position
    }
}

/// A directed relation between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    source: Id,
    target: Id,
}

impl Edge {
    /// Creates an edge from `source` to `target`.
    pub fn new(source: Id, target: Id) -> Self {
        Self { source, target }
    }

    /// Returns the source node identifier.
    pub fn source(&self) -> Id {
        self.source
    }

    /// Returns the target node identifier.
    pub fn target(&self) -> Id {
        self.target
    }

    /// Whether this edge joins `a` and `b`, in either direction.
    pub fn joins(&self, a: Id, b: Id) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// Why an edge was not added to a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRejection {
    SelfLoop,
    UnknownSource,
    UnknownTarget,
    Duplicate,
}

/// Mind-map graph: ordered nodes and directed edges.
///
/// # Examples
///
/// ```
/// # use sketchmap_core::graph::{Graph, Node};
/// # use sketchmap_core::identifier::Id;
/// let mut graph = Graph::new();
/// graph.add_node(Node::new(Id::new("a"), "Main Idea"));
/// graph.add_node(Node::new(Id::new("b"), "Subtopic"));
///
/// assert!(graph.add_edge(Id::new("a"), Id::new("b")).is_ok());
/// // Dangling references are rejected, not fatal
/// assert!(graph.add_edge(Id::new("a"), Id::new("zzz")).is_err());
/// assert_eq!(graph.edge_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    nodes: IndexMap<Id, Node>,
    edges: Vec<Edge>,
}

impl Graph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node. Returns `false` and keeps the existing node when the id is taken.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.nodes.contains_key(&node.id) {
            warn!(node_id:% = node.id; "Ignoring node with duplicate identifier");
            return false;
        }
        self.nodes.insert(node.id, node);
        true
    }

    /// Adds an edge, enforcing referential integrity, no self-loops and no duplicates.
    ///
    /// Edges are drawn undirected, so an edge that reverses an existing one
    /// is a duplicate as well.
    ///
    /// # Errors
    ///
    /// Returns the [`EdgeRejection`] reason when the edge is not added. The
    /// graph is left unchanged in that case.
    pub fn add_edge(&mut self, source: Id, target: Id) -> Result<(), EdgeRejection> {
        let rejection = if source == target {
            Some(EdgeRejection::SelfLoop)
        } else if !self.nodes.contains_key(&source) {
            Some(EdgeRejection::UnknownSource)
        } else if !self.nodes.contains_key(&target) {
            Some(EdgeRejection::UnknownTarget)
        } else if self.edges.iter().any(|edge| edge.joins(source, target)) {
            Some(EdgeRejection::Duplicate)
        } else {
            None
        };

        match rejection {
            Some(EdgeRejection::Duplicate) => {
                trace!(source:% = source, target:% = target; "Collapsing duplicate edge");
                Err(EdgeRejection::Duplicate)
            }
            Some(reason) => {
                warn!(source:% = source, target:% = target, reason:? = reason; "Dropping invalid edge");
                Err(reason)
            }
            None => {
                self.edges.push(Edge::new(source, target));
                Ok(())
            }
        }
    }

    /// Iterates nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Looks up a node by identifier.
    pub fn node(&self, id: Id) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Position of a node in insertion order
    pub fn node_index(&self, id: Id) -> Option<usize> {
        self.nodes.get_index_of(&id)
    }

    /// Whether a node with this identifier exists.
    pub fn contains_node(&self, id: Id) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges as pairs of node indices, in edge order
    pub fn edge_indices(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges.iter().filter_map(|edge| {
            Some((self.node_index(edge.source)?, self.node_index(edge.target)?))
        })
    }

    /// Number of edges leaving `id`.
    pub fn out_degree(&self, id: Id) -> usize {
        self.edges.iter().filter(|edge| edge.source == id).count()
    }

    /// Number of edges entering `id`.
    pub fn in_degree(&self, id: Id) -> usize {
        self.edges.iter().filter(|edge| edge.target == id).count()
    }

    /// The node designated as root, if any
    pub fn root(&self) -> Option<&Node> {
        self.nodes.values().find(|node| node.role == Role::Root)
    }

    /// Marks `root` as the root and derives every other node's role from its out-degree.
    ///
    /// Unknown `root` ids leave the graph without a root.
    pub fn assign_roles(&mut self, root: Option<Id>) {
        let out_degrees: Vec<usize> = self
            .nodes
            .keys()
            .map(|&id| self.out_degree(id))
            .collect();

        for (node, out_degree) in self.nodes.values_mut().zip(out_degrees) {
            node.role = if Some(node.id) == root {
                Role::Root
            } else if out_degree > 0 {
                Role::Branch
            } else {
                Role::Leaf
            };
        }
    }

    /// Whether every node carries a position
    pub fn is_positioned(&self) -> bool {
        self.nodes.values().all(|node| node.position.is_some())
    }

    /// Writes positions in node insertion order.
    ///
    /// Only the layout engine calls this; the graph is read-only afterwards.
    /// Extra positions are ignored and missing ones leave nodes untouched.
    pub fn apply_positions(&mut self, positions: &[Point]) {
        debug_assert_eq!(positions.len(), self.nodes.len());
        for (node, &position) in self.nodes.values_mut().zip(positions) {
            node.position = Some(position);
        }
    }

    /// Weakly connected components, each listed in node insertion order.
    ///
    /// Components are ordered by their first node. Cycles are harmless: the
    /// walk is an explicit-stack search with a visited set.
    pub fn components(&self) -> Vec<Vec<Id>> {
        let count = self.nodes.len();
        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); count];
        for (source, target) in self.edge_indices() {
            adjacency[source].push(target);
            adjacency[target].push(source);
        }

        let mut visited: HashSet<usize> = HashSet::with_capacity(count);
        let mut components = Vec::new();

        for start in 0..count {
            if !visited.insert(start) {
                continue;
            }
            let mut members = vec![start];
            let mut stack = vec![start];
            while let Some(current) = stack.pop() {
                for &next in &adjacency[current] {
                    if visited.insert(next) {
                        members.push(next);
                        stack.push(next);
                    }
                }
            }
            members.sort_unstable();
            components.push(
                members
                    .into_iter()
                    .filter_map(|idx| self.nodes.get_index(idx).map(|(id, _)| *id))
                    .collect(),
            );
        }

        components
    }

    /// Structural equality with positions compared up to `epsilon`.
    ///
    /// Node order, identifiers, labels, roles and edges must match exactly.
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        if self.edges != other.edges || self.nodes.len() != other.nodes.len() {
            return false;
        }
        self.nodes
            .values()
            .zip(other.nodes.values())
            .all(|(a, b)| {
                a.id == b.id
                    && a.label == b.label
                    && a.role == b.role
                    && match (a.position, b.position) {
                        (None, None) => true,
                        (Some(p), Some(q)) => {
                            (p.x() - q.x()).abs() <= epsilon && (p.y() - q.y()).abs() <= epsilon
                        }
                        _ => false,
                    }
            })
    }
}
