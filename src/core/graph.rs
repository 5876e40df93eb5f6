// src/core/graph.rs
use std::collections::{HashMap, VecDeque};
use serde::{Deserialize, Serialize};

use super::{Element, Layer, Relationship};

/// Node in the model graph, one per element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub element_type: String,
    pub layer: Layer,
}

impl From<&Element> for GraphNode {
    fn from(element: &Element) -> Self {
        Self {
            id: element.id.clone(),
            name: element.name.clone(),
            element_type: element.element_type.clone(),
            layer: element.layer,
        }
    }
}

/// Edge in the model graph, one per relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub relationship_id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<&Relationship> for GraphEdge {
    fn from(relationship: &Relationship) -> Self {
        Self {
            relationship_id: relationship.id.clone(),
            source: relationship.source.clone(),
            target: relationship.target.clone(),
            kind: relationship.relationship_type.clone(),
        }
    }
}

/// Directed graph of elements and relationships.
///
/// Edges are stored per relationship, so several relationships between the same
/// ordered pair stay distinct. Neighbor counting and reachability run on a derived
/// simple-graph view in which such parallel edges collapse into one.
#[derive(Debug, Clone, Default)]
pub struct ModelGraph {
    nodes: Vec<GraphNode>,
    node_index: HashMap<String, usize>,
    edges: Vec<GraphEdge>,
    /// Distinct successors per node, in first-seen order
    adjacency_list: Vec<Vec<usize>>,
    /// Distinct predecessors per node, in first-seen order
    reverse_adjacency: Vec<Vec<usize>>,
}

/// Same-layer slice of the graph handed to visualization consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSubgraph {
    pub layer: Layer,
    pub nodes: Vec<GraphNode>,
    /// Only edges whose endpoints both sit in `layer`
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    /// Edges left after collapsing parallel relationships
    pub distinct_pairs: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
}

impl ModelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.node_index.clear();
        self.edges.clear();
        self.adjacency_list.clear();
        self.reverse_adjacency.clear();
    }

    /// Add a node. Re-adding an existing id replaces its attributes.
    pub fn add_node(&mut self, node: GraphNode) {
        if let Some(&index) = self.node_index.get(&node.id) {
            self.nodes[index] = node;
            return;
        }

        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        self.adjacency_list.push(Vec::new());
        self.reverse_adjacency.push(Vec::new());
    }

    /// Add an edge between two existing nodes. Returns false if an endpoint is missing.
    pub fn add_edge(&mut self, edge: GraphEdge) -> bool {
        let (Some(&source), Some(&target)) =
            (self.node_index.get(&edge.source), self.node_index.get(&edge.target))
        else {
            return false;
        };

        if !self.adjacency_list[source].contains(&target) {
            self.adjacency_list[source].push(target);
            self.reverse_adjacency[target].push(source);
        }
        self.edges.push(edge);
        true
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Distinct nodes this node has an edge to
    pub fn successors(&self, id: &str) -> Vec<&GraphNode> {
        self.node_index
            .get(id)
            .map(|&i| self.adjacency_list[i].iter().map(|&j| &self.nodes[j]).collect())
            .unwrap_or_default()
    }

    /// Distinct nodes with an edge to this node
    pub fn predecessors(&self, id: &str) -> Vec<&GraphNode> {
        self.node_index
            .get(id)
            .map(|&i| self.reverse_adjacency[i].iter().map(|&j| &self.nodes[j]).collect())
            .unwrap_or_default()
    }

    /// Successors followed by predecessors. A node that is both appears twice.
    pub fn neighbors(&self, id: &str) -> Vec<&GraphNode> {
        let mut neighbors = self.successors(id);
        neighbors.extend(self.predecessors(id));
        neighbors
    }

    pub fn neighbor_count(&self, id: &str) -> usize {
        self.in_degree(id) + self.out_degree(id)
    }

    pub fn in_degree(&self, id: &str) -> usize {
        self.node_index
            .get(id)
            .map_or(0, |&i| self.reverse_adjacency[i].len())
    }

    pub fn out_degree(&self, id: &str) -> usize {
        self.node_index
            .get(id)
            .map_or(0, |&i| self.adjacency_list[i].len())
    }

    /// All relationships from `source` to `target`, in insertion order
    pub fn edges_between(&self, source: &str, target: &str) -> Vec<&GraphEdge> {
        self.edges
            .iter()
            .filter(|e| e.source == source && e.target == target)
            .collect()
    }

    /// Whether a directed path leads from `from` to `to`. A node always reaches itself.
    pub fn has_path(&self, from: &str, to: &str) -> bool {
        let (Some(&start), Some(&goal)) = (self.node_index.get(from), self.node_index.get(to))
        else {
            return false;
        };

        let mut visited = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([start]);
        visited[start] = true;

        while let Some(current) = queue.pop_front() {
            if current == goal {
                return true;
            }
            for &next in &self.adjacency_list[current] {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }

        false
    }

    /// Nodes of one layer plus the edges that stay inside it
    pub fn layer_subgraph(&self, layer: Layer) -> LayerSubgraph {
        let in_layer = |id: &str| self.node(id).is_some_and(|n| n.layer == layer);

        LayerSubgraph {
            layer,
            nodes: self.nodes.iter().filter(|n| n.layer == layer).cloned().collect(),
            edges: self
                .edges
                .iter()
                .filter(|e| in_layer(&e.source) && in_layer(&e.target))
                .cloned()
                .collect(),
        }
    }

    /// One subgraph per named layer, in layer order
    pub fn layer_subgraphs(&self) -> Vec<LayerSubgraph> {
        Layer::NAMED.iter().map(|&layer| self.layer_subgraph(layer)).collect()
    }

    pub fn get_statistics(&self) -> GraphStats {
        GraphStats {
            total_nodes: self.nodes.len(),
            total_edges: self.edges.len(),
            distinct_pairs: self.adjacency_list.iter().map(Vec::len).sum(),
            max_in_degree: self.reverse_adjacency.iter().map(Vec::len).max().unwrap_or(0),
            max_out_degree: self.adjacency_list.iter().map(Vec::len).max().unwrap_or(0),
        }
    }
}
