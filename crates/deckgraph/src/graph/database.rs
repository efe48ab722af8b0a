//! Card graph storage
//!
//! Stores card nodes and co-occurrence edges. The graph is undirected and
//! simple: an edge is keyed by its canonical [`CardPair`], so `(a, b)` and
//! `(b, a)` are the same edge, and self-loops cannot be expressed.

use anyhow::{bail, Result};
use std::collections::{HashMap, HashSet};
use tracing::trace;

use crate::core::{CardId, CardPair, Database, EdgeData, NodeData};

/// Weighted undirected card graph
///
/// Nodes and edges keep insertion order for deterministic iteration.
#[derive(Debug, Clone, Default)]
pub struct CardGraph {
    nodes: Vec<NodeData>,
    index: HashMap<CardId, usize>,
    edges: Vec<EdgeData>,
    edge_keys: HashSet<CardPair>,
}

impl CardGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of a node in insertion order
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Edges as `(source index, target index, weight)`
    pub fn indexed_edges(&self) -> impl Iterator<Item = (usize, usize, u64)> + '_ {
        self.edges.iter().filter_map(|edge| {
            let a = self.node_index(edge.source().as_str())?;
            let b = self.node_index(edge.target().as_str())?;
            Some((a, b, edge.weight))
        })
    }

    /// Sum of all edge weights
    pub fn total_weight(&self) -> u64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// Number of edges touching a node
    pub fn degree(&self, id: &str) -> usize {
        self.edges.iter().filter(|e| e.pair.contains(id)).count()
    }

    /// Nodes without any edge
    pub fn isolated_nodes(&self) -> Vec<&CardId> {
        let mut touched = vec![false; self.nodes.len()];
        for (a, b, _) in self.indexed_edges() {
            touched[a] = true;
            touched[b] = true;
        }
        self.nodes
            .iter()
            .zip(touched)
            .filter(|(_, t)| !t)
            .map(|(n, _)| &n.id)
            .collect()
    }
}

impl Database for CardGraph {
    type Node = NodeData;
    type Edge = EdgeData;

    fn add_node(&mut self, node: NodeData) -> Result<()> {
        if self.index.contains_key(&node.id) {
            bail!("Duplicate node: {}", node.id);
        }
        trace!(id = %node.id, total = node.stats.total, "Adding node");
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    fn add_edge(&mut self, edge: EdgeData) -> Result<()> {
        if !self.has_node(edge.source().as_str()) || !self.has_node(edge.target().as_str()) {
            bail!("Edge {} references a missing node", edge.pair);
        }
        if !self.edge_keys.insert(edge.pair.clone()) {
            bail!("Duplicate edge: {}", edge.pair);
        }
        self.edges.push(edge);
        Ok(())
    }

    fn get_node(&self, id: &str) -> Option<&NodeData> {
        self.node_index(id).map(|i| &self.nodes[i])
    }

    fn nodes(&self) -> impl Iterator<Item = &NodeData> {
        self.nodes.iter()
    }

    fn edges(&self) -> impl Iterator<Item = &EdgeData> {
        self.edges.iter()
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.edges.clear();
        self.edge_keys.clear();
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
