//! Renderer-independent graph export
//!
//! [`GraphExport`] is the serializable contract between the graph stages and
//! the renderers. Community colours and layout coordinates are optional and
//! only present when those stages ran.

use serde::Serialize;
use std::collections::HashMap;

use crate::core::{Database, DeckGraphError};
use crate::graph::{CardGraph, CommunityAssignment, LayoutResult};

/// Colours cycled through by community label
pub const COMMUNITY_COLORS: [&str; 12] = [
    "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#f032e6",
    "#bcf60c", "#fabebe", "#008080", "#e6beff",
];

/// Colour of edges that cross community boundaries
pub const CROSS_COMMUNITY_COLOR: &str = "#555555";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportNode {
    pub id: String,
    pub label: String,
    /// HTML tooltip
    pub title: String,
    pub size: f64,
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportEdge {
    pub source: String,
    pub target: String,
    pub weight: u64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Nodes and edges ready for rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphExport {
    pub nodes: Vec<ExportNode>,
    pub edges: Vec<ExportEdge>,
    /// Number of communities, when detection ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communities: Option<usize>,
}

impl GraphExport {
    /// Export the graph in its own node and edge order
    pub fn from_graph(graph: &CardGraph) -> Self {
        let nodes = graph
            .nodes()
            .map(|node| ExportNode {
                id: node.id.to_string(),
                label: node.label.clone(),
                title: node.title.clone(),
                size: node.size,
                total: node.stats.total,
                color: None,
                community: None,
                x: None,
                y: None,
            })
            .collect();
        let edges = graph
            .edges()
            .map(|edge| ExportEdge {
                source: edge.source().to_string(),
                target: edge.target().to_string(),
                weight: edge.weight,
                title: edge.title.clone(),
                color: None,
            })
            .collect();
        Self {
            nodes,
            edges,
            communities: None,
        }
    }

    /// Colour nodes by community; edges inside a community share its colour
    pub fn with_communities(mut self, assignment: &CommunityAssignment) -> Result<Self, DeckGraphError> {
        if assignment.labels.len() != self.nodes.len() {
            return Err(DeckGraphError::render_error(format!(
                "community labels cover {} nodes, graph has {}",
                assignment.labels.len(),
                self.nodes.len()
            )));
        }

        for (node, &label) in self.nodes.iter_mut().zip(&assignment.labels) {
            node.community = Some(label);
            node.color = Some(community_color(label).to_string());
        }

        let community_of: HashMap<&str, usize> = self
            .nodes
            .iter()
            .zip(&assignment.labels)
            .map(|(node, &label)| (node.id.as_str(), label))
            .collect();
        for edge in self.edges.iter_mut() {
            let color = match (
                community_of.get(edge.source.as_str()),
                community_of.get(edge.target.as_str()),
            ) {
                (Some(a), Some(b)) if a == b => community_color(*a),
                _ => CROSS_COMMUNITY_COLOR,
            };
            edge.color = Some(color.to_string());
        }

        self.communities = Some(assignment.count);
        Ok(self)
    }

    /// Attach layout coordinates
    pub fn with_layout(mut self, layout: &LayoutResult) -> Result<Self, DeckGraphError> {
        if layout.len() != self.nodes.len() {
            return Err(DeckGraphError::render_error(format!(
                "layout covers {} nodes, graph has {}",
                layout.len(),
                self.nodes.len()
            )));
        }
        for (node, position) in self.nodes.iter_mut().zip(&layout.positions) {
            node.x = Some(position.x);
            node.y = Some(position.y);
        }
        Ok(self)
    }

    pub fn has_positions(&self) -> bool {
        !self.nodes.is_empty() && self.nodes.iter().all(|n| n.x.is_some() && n.y.is_some())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

pub fn community_color(label: usize) -> &'static str {
    COMMUNITY_COLORS[label % COMMUNITY_COLORS.len()]
}
