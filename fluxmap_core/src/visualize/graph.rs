//! Arena style graph of nodes keyed by id and edges referring to them by id
use indexmap::{IndexMap, IndexSet};
use thiserror::Error;
use tracing::warn;

use crate::metabolic_model::reaction::Direction;
use crate::visualize::direction::GroupDirection;

/// Style of every node, nodes are always drawn filled
pub const NODE_STYLE: &str = "filled";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeShape {
    Ellipse,
    Box,
}

impl NodeShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeShape::Ellipse => "ellipse",
            NodeShape::Box => "box",
        }
    }
}

/// Arrow style of an edge
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeDirection {
    Forward,
    Back,
    Both,
}

impl EdgeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeDirection::Forward => "forward",
            EdgeDirection::Back => "back",
            EdgeDirection::Both => "both",
        }
    }
}

impl From<Direction> for EdgeDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Forward => EdgeDirection::Forward,
            Direction::Reverse => EdgeDirection::Back,
            Direction::Both => EdgeDirection::Both,
        }
    }
}

impl From<GroupDirection> for EdgeDirection {
    fn from(direction: GroupDirection) -> Self {
        match direction {
            GroupDirection::Forward => EdgeDirection::Forward,
            GroupDirection::Back => EdgeDirection::Back,
            GroupDirection::Both => EdgeDirection::Both,
        }
    }
}

/// A compound or reaction node
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// Unique within one graph
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
    pub style: String,
    pub fillcolor: String,
    /// Id of the compound or reaction the node stands for, before splitting
    pub edge_id: Option<String>,
}

impl Node {
    pub fn new(id: String, label: String, shape: NodeShape, fillcolor: &str) -> Node {
        Node {
            id,
            label,
            shape,
            style: NODE_STYLE.to_string(),
            fillcolor: fillcolor.to_string(),
            edge_id: None,
        }
    }

    pub fn with_edge_id(mut self, edge_id: &str) -> Node {
        self.edge_id = Some(edge_id.to_string());
        self
    }
}

/// Drawing attributes of an edge
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeAttributes {
    pub dir: EdgeDirection,
    pub penwidth: Option<f64>,
    /// Drawn dotted when no flux runs along the edge
    pub dotted: bool,
}

impl EdgeAttributes {
    pub fn new(dir: EdgeDirection) -> EdgeAttributes {
        EdgeAttributes {
            dir,
            penwidth: None,
            dotted: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub attributes: EdgeAttributes,
    /// Reaction an edge between two compounds stands for
    pub reaction: Option<String>,
}

impl Edge {
    pub fn new(source: &str, target: &str, attributes: EdgeAttributes) -> Edge {
        Edge {
            source: source.to_string(),
            target: target.to_string(),
            attributes,
            reaction: None,
        }
    }

    pub fn with_reaction(mut self, reaction: &str) -> Edge {
        self.reaction = Some(reaction.to_string());
        self
    }
}

/// Directed graph owning its nodes, edges only hold node ids
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: IndexMap<String, Node>,
    edges: Vec<Edge>,
    edge_keys: IndexSet<(String, String, Option<String>)>,
    collisions: IndexSet<String>,
}

impl Graph {
    pub fn new() -> Graph {
        Graph::default()
    }

    /// Add a node, returns false and keeps the existing node if the id is taken
    ///
    /// A dropped node whose attributes differ from the kept one is logged and its id
    /// recorded in [`Graph::collisions`].
    pub fn add_node(&mut self, node: Node) -> bool {
        if let Some(existing) = self.nodes.get(&node.id) {
            if existing != &node {
                warn!(
                    node = %node.id,
                    kept = %existing.label,
                    dropped = %node.label,
                    "Node id already taken by a different node"
                );
                self.collisions.insert(node.id);
            }
            return false;
        }
        self.nodes.insert(node.id.clone(), node);
        true
    }

    /// Add an edge between two nodes already in the graph
    ///
    /// An edge repeating the endpoints and reaction of an existing edge is dropped.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        for end in [&edge.source, &edge.target] {
            if !self.nodes.contains_key(end) {
                return Err(GraphError::MissingNode {
                    source_id: edge.source.clone(),
                    target_id: edge.target.clone(),
                    missing: end.clone(),
                });
            }
        }
        let key = (edge.source.clone(), edge.target.clone(), edge.reaction.clone());
        if self.edge_keys.insert(key) {
            self.edges.push(edge);
        }
        Ok(())
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Nodes sorted by id
    pub fn sorted_nodes(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.nodes.values().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    /// Edges in insertion order
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Ids where a different node was dropped because the id was taken
    pub fn collisions(&self) -> impl Iterator<Item = &str> {
        self.collisions.iter().map(|id| id.as_str())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges leaving the node with id `id`
    pub fn edges_from<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source == id)
    }

    /// Edges entering the node with id `id`
    pub fn edges_to<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.target == id)
    }
}

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Edge {source_id} -> {target_id} refers to missing node {missing}")]
    MissingNode {
        source_id: String,
        target_id: String,
        missing: String,
    },
}
