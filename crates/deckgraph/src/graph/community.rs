//! Community detection by modularity optimisation
//!
//! [`Louvain`] alternates two phases until nothing moves:
//!
//! 1. **Local moving**: visit nodes in a seeded random order and move each
//!    one into the neighbouring community with the best modularity gain.
//! 2. **Aggregation**: collapse every community into a single node whose
//!    self-loop carries the internal weight, then repeat on the smaller graph.
//!
//! The same graph and seed always produce the same partition.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, span, Level};

use super::CardGraph;
use crate::core::{Database, DeckGraphConfig, DeckGraphError};

/// Gains at or below this are treated as no improvement
const MIN_GAIN: f64 = 1e-7;

/// Community label for every node of a graph
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommunityAssignment {
    /// Label per node, indexed like the graph's nodes
    ///
    /// Labels are dense and numbered in order of first appearance, so the
    /// first node is always in community 0.
    pub labels: Vec<usize>,
    /// Number of distinct communities
    pub count: usize,
    /// Modularity of the partition
    pub modularity: f64,
}

impl CommunityAssignment {
    /// Number of nodes in each community, indexed by label
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.count];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Louvain community detection
#[derive(Debug, Clone)]
pub struct Louvain {
    seed: u64,
    max_passes: usize,
    max_sweeps: usize,
}

impl Default for Louvain {
    fn default() -> Self {
        Self {
            seed: 42,
            max_passes: 10,
            max_sweeps: 100,
        }
    }
}

impl Louvain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &DeckGraphConfig) -> Self {
        Self {
            seed: config.seed,
            max_passes: config.community_passes,
            max_sweeps: config.community_sweeps,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Cap on local-moving/aggregation rounds
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Cap on node sweeps within one local-moving phase
    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps;
        self
    }

    /// Partition the graph into communities
    pub fn detect(&self, graph: &CardGraph) -> Result<CommunityAssignment, DeckGraphError> {
        if self.max_passes == 0 || self.max_sweeps == 0 {
            return Err(DeckGraphError::community_error(
                "at least one pass and one sweep are required".to_string(),
            ));
        }

        let detect_span = span!(Level::INFO, "detect_communities", seed = self.seed);
        let _enter = detect_span.enter();

        let node_count = graph.node_count();
        let edges: Vec<(usize, usize, f64)> = graph
            .indexed_edges()
            .map(|(a, b, w)| (a, b, w as f64))
            .collect();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut membership: Vec<usize> = (0..node_count).collect();
        let mut level = WorkingGraph::new(node_count, edges.iter().copied(), vec![0.0; node_count]);

        for pass in 0..self.max_passes {
            let (local, moved, sweeps) = level.move_nodes(&mut rng, self.max_sweeps);
            if !moved {
                break;
            }
            let (renumbered, count) = renumber(&local);
            for slot in membership.iter_mut() {
                *slot = renumbered[*slot];
            }
            level = level.aggregate(&renumbered, count);
            debug!(pass, sweeps, communities = count, "Louvain pass complete");
        }

        let (labels, count) = renumber(&membership);
        let modularity = indexed_modularity(node_count, &edges, &labels);
        info!(communities = count, modularity, "Community detection complete");

        Ok(CommunityAssignment {
            labels,
            count,
            modularity,
        })
    }
}

/// Modularity of a labelling of the graph's nodes
///
/// `labels` must hold one entry per node in graph order. A graph without
/// edges has modularity 0.
pub fn modularity(graph: &CardGraph, labels: &[usize]) -> Result<f64, DeckGraphError> {
    if labels.len() != graph.node_count() {
        return Err(DeckGraphError::community_error(format!(
            "expected {} labels, got {}",
            graph.node_count(),
            labels.len()
        )));
    }
    let edges: Vec<(usize, usize, f64)> = graph
        .indexed_edges()
        .map(|(a, b, w)| (a, b, w as f64))
        .collect();
    Ok(indexed_modularity(labels.len(), &edges, labels))
}

fn indexed_modularity(node_count: usize, edges: &[(usize, usize, f64)], labels: &[usize]) -> f64 {
    let mut degree = vec![0.0; node_count];
    let mut internal: HashMap<usize, f64> = HashMap::new();
    let mut two_m = 0.0;

    for &(a, b, w) in edges {
        degree[a] += w;
        degree[b] += w;
        two_m += 2.0 * w;
        if labels[a] == labels[b] {
            *internal.entry(labels[a]).or_default() += 2.0 * w;
        }
    }
    if two_m <= 0.0 {
        return 0.0;
    }

    let mut totals: HashMap<usize, f64> = HashMap::new();
    for (node, &label) in labels.iter().enumerate() {
        *totals.entry(label).or_default() += degree[node];
    }

    totals
        .iter()
        .map(|(label, tot)| {
            let inside = internal.get(label).copied().unwrap_or(0.0);
            inside / two_m - (tot / two_m).powi(2)
        })
        .sum()
}

/// Dense relabelling in order of first appearance
fn renumber(labels: &[usize]) -> (Vec<usize>, usize) {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    let renumbered = labels
        .iter()
        .map(|label| {
            let next = mapping.len();
            *mapping.entry(*label).or_insert(next)
        })
        .collect();
    (renumbered, mapping.len())
}

/// Graph being optimised at the current level
///
/// Node `i` of an aggregated level stands for a whole community of the level
/// below; `loops[i]` is the weight of the edges inside it.
struct WorkingGraph {
    adjacency: Vec<Vec<(usize, f64)>>,
    loops: Vec<f64>,
    degree: Vec<f64>,
}

impl WorkingGraph {
    fn new(
        node_count: usize,
        edges: impl Iterator<Item = (usize, usize, f64)>,
        loops: Vec<f64>,
    ) -> Self {
        let mut adjacency = vec![Vec::new(); node_count];
        for (a, b, w) in edges {
            adjacency[a].push((b, w));
            adjacency[b].push((a, w));
        }
        let degree = adjacency
            .iter()
            .zip(&loops)
            .map(|(neighbours, self_loop)| {
                neighbours.iter().map(|(_, w)| w).sum::<f64>() + 2.0 * self_loop
            })
            .collect();
        Self {
            adjacency,
            loops,
            degree,
        }
    }

    fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Local moving phase, at most `max_sweeps` sweeps over the nodes
    ///
    /// Returns the community per node, whether any node changed community,
    /// and the number of sweeps made.
    fn move_nodes(&self, rng: &mut StdRng, max_sweeps: usize) -> (Vec<usize>, bool, usize) {
        let n = self.len();
        let mut community: Vec<usize> = (0..n).collect();
        let two_m: f64 = self.degree.iter().sum();
        if two_m <= 0.0 {
            return (community, false, 0);
        }

        let mut totals = self.degree.clone();
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);

        let mut link_weight = vec![0.0; n];
        let mut seen = vec![false; n];
        let mut candidates = Vec::new();
        let mut moved_any = false;
        let mut sweeps = 0;

        while sweeps < max_sweeps {
            sweeps += 1;
            let mut moved = false;
            for &node in &order {
                let current = community[node];
                let k = self.degree[node];

                for &(other, w) in &self.adjacency[node] {
                    let c = community[other];
                    if !seen[c] {
                        seen[c] = true;
                        candidates.push(c);
                    }
                    link_weight[c] += w;
                }

                totals[current] -= k;
                let mut best = current;
                let mut best_gain = link_weight[current] - totals[current] * k / two_m;
                for &c in &candidates {
                    let gain = link_weight[c] - totals[c] * k / two_m;
                    if gain > best_gain + MIN_GAIN {
                        best = c;
                        best_gain = gain;
                    }
                }
                totals[best] += k;

                if best != current {
                    community[node] = best;
                    moved = true;
                }

                for &c in &candidates {
                    link_weight[c] = 0.0;
                    seen[c] = false;
                }
                candidates.clear();
            }
            if !moved {
                break;
            }
            moved_any = true;
        }

        (community, moved_any, sweeps)
    }

    /// Collapse each community into one node
    fn aggregate(&self, community: &[usize], count: usize) -> WorkingGraph {
        let mut loops = vec![0.0; count];
        let mut weights: BTreeMap<(usize, usize), f64> = BTreeMap::new();

        for node in 0..self.len() {
            let c = community[node];
            loops[c] += self.loops[node];
            for &(other, w) in &self.adjacency[node] {
                if node >= other {
                    continue;
                }
                let d = community[other];
                if c == d {
                    loops[c] += w;
                } else {
                    *weights.entry((c.min(d), c.max(d))).or_default() += w;
                }
            }
        }

        WorkingGraph::new(
            count,
            weights.into_iter().map(|((a, b), w)| (a, b, w)),
            loops,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardPair, CardStatistics, EdgeData, NodeData};

    fn graph(node_count: usize, edges: &[(usize, usize, u64)]) -> CardGraph {
        let mut graph = CardGraph::new();
        for i in 0..node_count {
            let id = format!("{}", 10 + i);
            graph
                .add_node(NodeData::new(id.as_str().into(), id.clone(), CardStatistics::default()))
                .unwrap();
        }
        for &(a, b, w) in edges {
            let pair = CardPair::new(
                format!("{}", 10 + a).into(),
                format!("{}", 10 + b).into(),
            )
            .unwrap();
            graph.add_edge(EdgeData::new(pair, w)).unwrap();
        }
        graph
    }

    fn two_cliques() -> CardGraph {
        let mut edges = Vec::new();
        for base in [0, 4] {
            for i in 0..4 {
                for j in (i + 1)..4 {
                    edges.push((base + i, base + j, 10));
                }
            }
        }
        edges.push((3, 4, 1));
        graph(8, &edges)
    }

    #[test]
    fn test_two_cliques_split() {
        let result = Louvain::new().detect(&two_cliques()).unwrap();
        assert_eq!(result.count, 2);
        assert!(result.labels[..4].iter().all(|&l| l == result.labels[0]));
        assert!(result.labels[4..].iter().all(|&l| l == result.labels[4]));
        assert_ne!(result.labels[0], result.labels[4]);
        assert!(result.modularity > 0.3);
        assert_eq!(result.sizes(), vec![4, 4]);
    }

    #[test]
    fn test_labels_in_first_appearance_order() {
        let result = Louvain::new().detect(&two_cliques()).unwrap();
        assert_eq!(result.labels[0], 0);
        assert_eq!(result.labels[7], 1);
    }

    #[test]
    fn test_same_seed_same_partition() {
        let graph = two_cliques();
        let a = Louvain::new().with_seed(7).detect(&graph).unwrap();
        let b = Louvain::new().with_seed(7).detect(&graph).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_graph() {
        let result = Louvain::new().detect(&CardGraph::new()).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.count, 0);
        assert_eq!(result.modularity, 0.0);
    }

    #[test]
    fn test_isolated_nodes_stay_apart() {
        let result = Louvain::new().detect(&graph(3, &[])).unwrap();
        assert_eq!(result.labels, vec![0, 1, 2]);
        assert_eq!(result.modularity, 0.0);
    }

    #[test]
    fn test_zero_passes_rejected() {
        let err = Louvain::new().with_max_passes(0).detect(&two_cliques());
        assert!(matches!(err, Err(DeckGraphError::CommunityError { .. })));
    }

    #[test]
    fn test_zero_sweeps_rejected() {
        let err = Louvain::new().with_max_sweeps(0).detect(&two_cliques());
        assert!(matches!(err, Err(DeckGraphError::CommunityError { .. })));
    }

    #[test]
    fn test_sweeps_are_capped() {
        let graph = two_cliques();
        let edges: Vec<(usize, usize, f64)> =
            graph.indexed_edges().map(|(a, b, w)| (a, b, w as f64)).collect();
        let level = WorkingGraph::new(8, edges.into_iter(), vec![0.0; 8]);

        let (community, moved, sweeps) = level.move_nodes(&mut StdRng::seed_from_u64(42), 1);
        assert!(moved);
        assert_eq!(sweeps, 1);
        assert_eq!(community.len(), 8);

        let (_, _, sweeps) = level.move_nodes(&mut StdRng::seed_from_u64(42), 100);
        assert!((2..=100).contains(&sweeps));

        let result = Louvain::new().with_max_sweeps(1).detect(&graph).unwrap();
        assert_eq!(result.labels.len(), 8);
        assert!((1..=8).contains(&result.count));
    }

    #[test]
    fn test_modularity_of_single_community_is_zero() {
        let graph = two_cliques();
        let q = modularity(&graph, &[0; 8]).unwrap();
        assert!(q.abs() < 1e-12);
    }

    #[test]
    fn test_modularity_of_split() {
        let graph = two_cliques();
        let q = modularity(&graph, &[0, 0, 0, 0, 1, 1, 1, 1]).unwrap();
        // 2 * (120/242 - (121/242)^2)
        assert!((q - 0.491_735).abs() < 1e-4);
    }

    #[test]
    fn test_modularity_label_count_mismatch() {
        assert!(modularity(&two_cliques(), &[0, 1]).is_err());
    }
}
