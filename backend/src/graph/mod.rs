//! Transaction multigraph
//!
//! Nodes and edges are kept in insertion order (the order the synthesizer
//! created them). Anything that must be order-independent, such as hashing
//! or cycle detection, works from sorted views instead.
//!
//! # Invariants
//!
//! - Node IDs are unique
//! - Every edge references existing nodes (enforced by `add_edge`)
//! - Parallel edges between the same pair are allowed (multigraph)

pub mod scc;

use crate::models::{NodeRole, TransactionEdge, TransactionNode};
use crate::orchestrator::ForgeError;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub use scc::SccFinder;

/// Directed multigraph of synthetic transfers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionGraph {
    nodes: Vec<TransactionNode>,
    edges: Vec<TransactionEdge>,

    /// Node ID → position in `nodes`
    #[serde(skip)]
    index: BTreeMap<String, usize>,
}

impl TransactionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node
    ///
    /// # Errors
    /// `MalformedGraph` if a node with the same ID already exists
    pub fn add_node(&mut self, node: TransactionNode) -> Result<(), ForgeError> {
        if self.index.contains_key(node.id()) {
            return Err(ForgeError::MalformedGraph(format!(
                "duplicate node id {}",
                node.id()
            )));
        }
        self.index.insert(node.id().to_string(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Add an edge
    ///
    /// # Errors
    /// `MalformedGraph` if either endpoint is unknown
    pub fn add_edge(&mut self, edge: TransactionEdge) -> Result<(), ForgeError> {
        for endpoint in [edge.source_id(), edge.dest_id()] {
            if !self.index.contains_key(endpoint) {
                return Err(ForgeError::MalformedGraph(format!(
                    "edge {} references unknown node {}",
                    edge.id(),
                    endpoint
                )));
            }
        }
        self.edges.push(edge);
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&TransactionNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut TransactionNode> {
        self.nodes.iter_mut()
    }

    pub fn nodes(&self) -> &[TransactionNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[TransactionEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn out_edges<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a TransactionEdge> + 'a {
        self.edges.iter().filter(move |e| e.source_id() == id)
    }

    pub fn in_edges<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a TransactionEdge> + 'a {
        self.edges.iter().filter(move |e| e.dest_id() == id)
    }

    /// Total value received by a node
    pub fn inflow(&self, id: &str) -> i64 {
        self.in_edges(id).map(|e| e.amount()).sum()
    }

    /// Nodes with the given role, in insertion order
    pub fn nodes_with_role(&self, role: NodeRole) -> impl Iterator<Item = &TransactionNode> {
        self.nodes.iter().filter(move |n| n.role() == role)
    }

    /// Nodes sorted by ID
    pub fn sorted_nodes(&self) -> Vec<&TransactionNode> {
        let mut nodes: Vec<&TransactionNode> = self.nodes.iter().collect();
        nodes.sort_by(|a, b| a.id().cmp(b.id()));
        nodes
    }

    /// Edges sorted by (source, destination, timestamp, id)
    pub fn sorted_edges(&self) -> Vec<&TransactionEdge> {
        let mut edges: Vec<&TransactionEdge> = self.edges.iter().collect();
        edges.sort_by(|a, b| a.canonical_key().cmp(&b.canonical_key()));
        edges
    }

    /// Edges in causal order: by timestamp, ties broken by canonical key
    pub fn chronological_edges(&self) -> Vec<&TransactionEdge> {
        let mut edges: Vec<&TransactionEdge> = self.edges.iter().collect();
        edges.sort_by(|a, b| {
            a.timestamp()
                .cmp(&b.timestamp())
                .then_with(|| a.canonical_key().cmp(&b.canonical_key()))
        });
        edges
    }

    /// True if any directed cycle exists
    pub fn has_cycle(&self) -> bool {
        !SccFinder::find_cyclic_components(self).is_empty()
    }

    /// Topological order of node IDs (Kahn's algorithm, smallest ID first)
    ///
    /// Returns `None` when the graph contains a cycle.
    pub fn topological_order(&self) -> Option<Vec<String>> {
        let mut in_degree: BTreeMap<&str, usize> =
            self.nodes.iter().map(|n| (n.id(), 0)).collect();
        let mut successors: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

        for edge in &self.edges {
            *in_degree.entry(edge.dest_id()).or_insert(0) += 1;
            successors
                .entry(edge.source_id())
                .or_default()
                .push(edge.dest_id());
        }

        let mut ready: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(&id, _)| id)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(id) = ready.pop_first() {
            order.push(id.to_string());
            for &next in successors.get(id).map(Vec::as_slice).unwrap_or(&[]) {
                if let Some(deg) = in_degree.get_mut(next) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.insert(next);
                    }
                }
            }
        }

        (order.len() == self.nodes.len()).then_some(order)
    }

    /// Check structural invariants
    ///
    /// # Errors
    /// `MalformedGraph` if the graph is empty, an edge is dangling, or a
    /// cycle exists while `allow_cycles` is false
    pub fn validate(&self, allow_cycles: bool) -> Result<(), ForgeError> {
        if self.nodes.is_empty() || self.edges.is_empty() {
            return Err(ForgeError::MalformedGraph("graph is empty".to_string()));
        }

        for edge in &self.edges {
            if self.node(edge.source_id()).is_none() || self.node(edge.dest_id()).is_none() {
                return Err(ForgeError::MalformedGraph(format!(
                    "edge {} is dangling",
                    edge.id()
                )));
            }
        }

        if !allow_cycles {
            if let Some(cycle) = SccFinder::find_cyclic_components(self).first() {
                return Err(ForgeError::MalformedGraph(format!(
                    "unexpected cycle through {}",
                    cycle.iter().cloned().collect::<Vec<_>>().join(", ")
                )));
            }
        }

        Ok(())
    }
}
