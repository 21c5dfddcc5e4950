//! Structured dump: the canonical round-trip format.
//!
//! ```text
//! { "nodes": [{ "id": "1", "label": "Main", "x": 300.0, "y": 200.0, "role": "root" }],
//!   "edges": [{ "source": "1", "target": "2" }] }
//! ```
//!
//! `role` is optional when reading. Importing a dump rebuilds a [`Graph`]
//! equal to the exported one; edges that reference unknown nodes are dropped
//! and duplicate edges collapse, including reversed ones.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use sketchmap_core::{
    geometry::Point,
    graph::{Graph, Node, Role},
    identifier::Id,
};

use super::{Error, Exporter, node_positions};

/// One node of the dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpNode {
    pub id: Id,
    pub label: String,
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// One edge of the dump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DumpEdge {
    pub source: Id,
    pub target: Id,
}

/// A positioned graph in serializable form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dump {
    pub nodes: Vec<DumpNode>,
    pub edges: Vec<DumpEdge>,
}

impl Dump {
    /// Captures a fully positioned graph.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] when a node has no position.
    pub fn from_graph(graph: &Graph) -> Result<Self, Error> {
        let positions = node_positions(graph)?;
        let nodes = graph
            .nodes()
            .zip(positions)
            .map(|(node, position)| DumpNode {
                id: node.id(),
                label: node.label().to_string(),
                x: position.x(),
                y: position.y(),
                role: Some(node.role()),
            })
            .collect();
        let edges = graph
            .edges()
            .iter()
            .map(|edge| DumpEdge {
                source: edge.source(),
                target: edge.target(),
            })
            .collect();
        Ok(Self { nodes, edges })
    }

    /// Rebuilds the graph.
    ///
    /// Roles are taken as given when every node has one. Otherwise they are
    /// inferred: the node marked root, else the first node without incoming
    /// edges, else the first node, becomes the root.
    pub fn into_graph(self) -> Graph {
        let mut graph = Graph::new();
        let all_roles = self.nodes.iter().all(|node| node.role.is_some());
        let marked_root = self
            .nodes
            .iter()
            .find(|node| node.role == Some(Role::Root))
            .map(|node| node.id);

        for node in self.nodes {
            let mut rebuilt =
                Node::new(node.id, node.label).with_position(Point::new(node.x, node.y));
            if let Some(role) = node.role.filter(|_| all_roles) {
                rebuilt = rebuilt.with_role(role);
            }
            graph.add_node(rebuilt);
        }

        let mut dropped = 0usize;
        for edge in self.edges {
            if graph.add_edge(edge.source, edge.target).is_err() {
                dropped += 1;
            }
        }

        if !all_roles {
            let root = marked_root.or_else(|| {
                graph
                    .nodes()
                    .find(|node| graph.in_degree(node.id()) == 0)
                    .or_else(|| graph.nodes().next())
                    .map(|node| node.id())
            });
            graph.assign_roles(root);
        }

        if dropped > 0 {
            warn!(dropped; "Dropped dangling or duplicate edges from dump");
        }
        debug!(nodes = graph.node_count(), edges = graph.edge_count(); "Dump imported");
        graph
    }

    /// Parses a JSON dump.
    ///
    /// # Errors
    ///
    /// Returns the parse error for malformed JSON or a mismatched schema.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(Error::Json)
    }
}

/// Writes the structured dump as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct DumpExporter;

impl Exporter for DumpExporter {
    fn export(&self, graph: &Graph) -> Result<Vec<u8>, Error> {
        info!("Exporting structured dump");
        Ok(Dump::from_graph(graph)?.to_json()?.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> Graph {
        let mut graph = Graph::new();
        graph.add_node(Node::new(Id::new("1"), "Main").with_position(Point::new(300.25, 200.0)));
        graph.add_node(Node::new(Id::new("2"), "Side").with_position(Point::new(180.5, 123.456)));
        graph.add_node(Node::new(Id::new("3"), "Untitled").with_position(Point::new(0.1, -7.3)));
        graph.add_edge(Id::new("1"), Id::new("2")).unwrap();
        graph.add_edge(Id::new("2"), Id::new("3")).unwrap();
        graph.assign_roles(Some(Id::new("1")));
        graph
    }

    #[test]
    fn test_round_trip() {
        let graph = sample_graph();
        let json = String::from_utf8(DumpExporter.export(&graph).unwrap()).unwrap();
        let restored = Dump::from_json(&json).unwrap().into_graph();

        assert!(restored.approx_eq(&graph, 1e-4));
        assert_eq!(restored, graph);
    }

    #[test]
    fn test_schema_field_names() {
        let json = Dump::from_graph(&sample_graph()).unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let node = &value["nodes"][0];
        assert_eq!(node["id"], "1");
        assert_eq!(node["label"], "Main");
        assert_eq!(node["x"], 300.25);
        assert_eq!(node["role"], "root");
        assert_eq!(value["edges"][1]["source"], "2");
        assert_eq!(value["edges"][1]["target"], "3");
    }

    #[test]
    fn test_import_without_roles_infers_them() {
        let json = r#"{
            "nodes": [
                {"id": "a", "label": "A", "x": 0, "y": 0},
                {"id": "b", "label": "B", "x": 10, "y": 0},
                {"id": "c", "label": "", "x": 20, "y": 0}
            ],
            "edges": [{"source": "b", "target": "a"}, {"source": "a", "target": "c"}]
        }"#;
        let graph = Dump::from_json(json).unwrap().into_graph();

        assert_eq!(graph.root().unwrap().id(), "b");
        assert_eq!(graph.node(Id::new("a")).unwrap().role(), Role::Branch);
        assert_eq!(graph.node(Id::new("c")).unwrap().role(), Role::Leaf);
        assert_eq!(graph.node(Id::new("c")).unwrap().label(), "Untitled");
    }

    #[test]
    fn test_import_drops_dangling_and_duplicate_edges() {
        let json = r#"{
            "nodes": [
                {"id": "1", "label": "A", "x": 0, "y": 0},
                {"id": "2", "label": "B", "x": 10, "y": 0}
            ],
            "edges": [
                {"source": "1", "target": "2"},
                {"source": "1", "target": "2"},
                {"source": "1", "target": "9"},
                {"source": "2", "target": "2"}
            ]
        }"#;
        let graph = Dump::from_json(json).unwrap().into_graph();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.root().unwrap().id(), "1");
    }

    #[test]
    fn test_import_collapses_reversed_edges() {
        let json = r#"{
            "nodes": [
                {"id": "a", "label": "A", "x": 0, "y": 0},
                {"id": "b", "label": "B", "x": 10, "y": 0}
            ],
            "edges": [{"source": "a", "target": "b"}, {"source": "b", "target": "a"}]
        }"#;
        let graph = Dump::from_json(json).unwrap().into_graph();

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges()[0].source(), "a");
        assert_eq!(graph.root().unwrap().id(), "a");
        assert_eq!(graph.node(Id::new("b")).unwrap().role(), Role::Leaf);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Dump::from_json("{\"nodes\": 3}").is_err());
        assert!(Dump::from_json("not json").is_err());
    }
}
