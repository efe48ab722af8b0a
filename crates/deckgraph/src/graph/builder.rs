//! Projection of aggregated counts into a card graph
//!
//! Every played card becomes a node (optionally capped to the most played
//! ones); every pair whose co-occurrence count reaches the threshold and
//! whose endpoints are both nodes becomes an edge.

use anyhow::Result;
use std::collections::HashMap;
use tracing::{debug, info, span, Level};

use super::CardGraph;
use crate::aggregate::{Aggregation, CoOccurrenceCounter};
use crate::catalog::CardCatalog;
use crate::core::{
    CardId, CardStatistics, Database, DeckGraphConfig, DeckGraphError, EdgeData, NodeData,
};

/// Co-occurrence count an edge needs by default
pub const DEFAULT_EDGE_THRESHOLD: u64 = 30;

/// Builds a [`CardGraph`] from aggregated statistics
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    threshold: u64,
    max_nodes: Option<usize>,
    min_size: f64,
    max_size: f64,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_EDGE_THRESHOLD,
            max_nodes: None,
            min_size: 10.0,
            max_size: 60.0,
        }
    }
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &DeckGraphConfig) -> Self {
        Self {
            threshold: config.edge_threshold,
            max_nodes: config.max_nodes,
            min_size: config.min_node_size,
            max_size: config.max_node_size,
        }
    }

    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: Option<usize>) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_size_range(mut self, min_size: f64, max_size: f64) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Build the graph for an aggregation
    pub fn build(&self, aggregation: &Aggregation, catalog: &dyn CardCatalog) -> Result<CardGraph> {
        self.build_from_parts(aggregation.statistics(), aggregation.co_occurrence(), catalog)
    }

    /// Build the graph from raw statistics and co-occurrence counts
    ///
    /// Output order is deterministic: nodes sorted by id, edges by pair.
    /// Fails when the size range is empty or not finite.
    pub fn build_from_parts(
        &self,
        stats: &HashMap<CardId, CardStatistics>,
        co_occurrence: &CoOccurrenceCounter,
        catalog: &dyn CardCatalog,
    ) -> Result<CardGraph> {
        let build_span = span!(
            Level::INFO,
            "build_graph",
            threshold = self.threshold,
            max_nodes = ?self.max_nodes
        );
        let _enter = build_span.enter();

        self.check_size_range()?;

        let selected = self.select_nodes(stats);
        let max_total = selected.iter().map(|(_, s)| s.total).max().unwrap_or(0);

        let mut graph = CardGraph::new();
        for (id, card_stats) in &selected {
            let label = catalog
                .name(id.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| id.to_string());
            let size = self.node_size(card_stats.total, max_total);
            graph.add_node(NodeData::new((*id).clone(), label, **card_stats).with_size(size))?;
        }
        debug!(node_count = graph.node_count(), "Added nodes");

        let mut edges: Vec<_> = co_occurrence
            .iter()
            .filter(|(pair, weight)| {
                *weight >= self.threshold
                    && graph.has_node(pair.first().as_str())
                    && graph.has_node(pair.second().as_str())
            })
            .collect();
        edges.sort_by(|a, b| a.0.cmp(b.0));

        for (pair, weight) in edges {
            graph.add_edge(EdgeData::new(pair.clone(), weight))?;
        }

        info!(
            node_count = graph.node_count(),
            edge_count = graph.edge_count(),
            total_weight = graph.total_weight(),
            "Graph built"
        );
        Ok(graph)
    }

    /// Played cards to include, sorted by id
    fn select_nodes<'a>(
        &self,
        stats: &'a HashMap<CardId, CardStatistics>,
    ) -> Vec<(&'a CardId, &'a CardStatistics)> {
        let mut played: Vec<_> = stats.iter().filter(|(_, s)| s.total > 0).collect();

        if let Some(limit) = self.max_nodes {
            if played.len() > limit {
                played.sort_by(|(a_id, a), (b_id, b)| {
                    b.total.cmp(&a.total).then_with(|| a_id.cmp(b_id))
                });
                played.truncate(limit);
                debug!(limit, "Capped node count");
            }
        }

        played.sort_by(|(a, _), (b, _)| a.cmp(b));
        played
    }

    fn check_size_range(&self) -> Result<(), DeckGraphError> {
        if self.min_size.is_finite() && self.max_size.is_finite() && self.min_size <= self.max_size {
            Ok(())
        } else {
            Err(DeckGraphError::config_error(format!(
                "invalid node size range {}..{}",
                self.min_size, self.max_size
            )))
        }
    }

    /// Clamped linear map from play count to rendering size
    fn node_size(&self, total: u64, max_total: u64) -> f64 {
        if max_total == 0 {
            return self.min_size;
        }
        let ratio = total as f64 / max_total as f64;
        (self.min_size + (self.max_size - self.min_size) * ratio).clamp(self.min_size, self.max_size)
    }
}
