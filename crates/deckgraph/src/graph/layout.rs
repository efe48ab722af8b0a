//! Force-directed layout (Fruchterman–Reingold)
//!
//! Every node repels every other node with force `k² / d`; every edge pulls
//! its endpoints together with force `d² / k` scaled by the edge weight
//! relative to the heaviest edge. Displacements are capped by a temperature
//! that cools linearly to zero, so the layout always terminates.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, span, Level};

use super::CardGraph;
use crate::core::{CardId, Database, DeckGraphConfig, DeckGraphError, LayoutAlgorithm};

const MIN_DISTANCE: f64 = 0.01;

/// Position of one node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub id: CardId,
    pub x: f64,
    pub y: f64,
}

/// Axis-aligned box around every position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LayoutBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl LayoutBounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Output of [`ForceLayout`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutResult {
    /// One entry per node, in graph order
    pub positions: Vec<Position>,
    pub bounds: LayoutBounds,
    /// Iterations actually run
    pub iterations: usize,
}

impl LayoutResult {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn get(&self, id: &str) -> Option<&Position> {
        self.positions.iter().find(|p| p.id.as_str() == id)
    }
}

/// Fruchterman–Reingold layout with a seeded initial placement
#[derive(Debug, Clone)]
pub struct ForceLayout {
    seed: u64,
    iterations: usize,
    width: f64,
    height: f64,
}

impl Default for ForceLayout {
    fn default() -> Self {
        Self {
            seed: 42,
            iterations: 300,
            width: 1000.0,
            height: 1000.0,
        }
    }
}

impl ForceLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &DeckGraphConfig) -> Self {
        Self::new()
            .with_seed(config.seed)
            .with_iterations(config.layout_iterations)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    fn initial_positions(&self, n: usize) -> Vec<(f64, f64)> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let (half_w, half_h) = (self.width / 2.0, self.height / 2.0);
        (0..n)
            .map(|_| (rng.gen_range(-half_w..half_w), rng.gen_range(-half_h..half_h)))
            .collect()
    }
}

impl LayoutAlgorithm<CardGraph> for ForceLayout {
    type Output = LayoutResult;

    fn layout(&self, graph: &CardGraph) -> Result<LayoutResult> {
        if self.iterations == 0 {
            return Err(DeckGraphError::layout_error("iterations must be at least 1".to_string()).into());
        }
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(DeckGraphError::layout_error(format!(
                "invalid frame {}x{}",
                self.width, self.height
            ))
            .into());
        }

        let layout_span = span!(
            Level::INFO,
            "layout",
            algorithm = self.name(),
            nodes = graph.node_count()
        );
        let _enter = layout_span.enter();

        let n = graph.node_count();
        if n == 0 {
            return Ok(LayoutResult::default());
        }

        let mut pos = if n == 1 {
            vec![(0.0, 0.0)]
        } else {
            self.initial_positions(n)
        };

        let edges: Vec<(usize, usize, u64)> = graph.indexed_edges().collect();
        let max_weight = edges.iter().map(|e| e.2).max().unwrap_or(1).max(1) as f64;
        let k = (self.width * self.height / n as f64).sqrt();
        let initial_temperature = self.width / 10.0;

        let mut iterations = 0;
        for iteration in 0..self.iterations {
            let temperature = initial_temperature * (1.0 - iteration as f64 / self.iterations as f64);

            let mut disp: Vec<(f64, f64)> = (0..n)
                .map(|i| {
                    let (xi, yi) = pos[i];
                    pos.iter().enumerate().filter(|(j, _)| *j != i).fold(
                        (0.0, 0.0),
                        |(dx, dy), (_, &(xj, yj))| {
                            let (ddx, ddy) = (xi - xj, yi - yj);
                            let dist = (ddx * ddx + ddy * ddy).sqrt().max(MIN_DISTANCE);
                            let force = k * k / dist;
                            (dx + ddx / dist * force, dy + ddy / dist * force)
                        },
                    )
                })
                .collect();

            for &(a, b, weight) in &edges {
                let (ddx, ddy) = (pos[a].0 - pos[b].0, pos[a].1 - pos[b].1);
                let dist = (ddx * ddx + ddy * ddy).sqrt().max(MIN_DISTANCE);
                let force = dist * dist / k * (weight as f64 / max_weight);
                let (fx, fy) = (ddx / dist * force, ddy / dist * force);
                disp[a].0 -= fx;
                disp[a].1 -= fy;
                disp[b].0 += fx;
                disp[b].1 += fy;
            }

            let mut largest_step: f64 = 0.0;
            for (p, (dx, dy)) in pos.iter_mut().zip(&disp) {
                let length = (dx * dx + dy * dy).sqrt();
                if length > 0.0 {
                    let step = length.min(temperature);
                    p.0 += dx / length * step;
                    p.1 += dy / length * step;
                    largest_step = largest_step.max(step);
                }
            }

            iterations = iteration + 1;
            if largest_step < MIN_DISTANCE {
                debug!(iteration, "Layout converged");
                break;
            }
        }

        if pos.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(DeckGraphError::layout_error("layout diverged".to_string()).into());
        }

        let positions: Vec<Position> = graph
            .nodes()
            .zip(&pos)
            .map(|(node, &(x, y))| Position {
                id: node.id.clone(),
                x,
                y,
            })
            .collect();

        let bounds = positions.iter().fold(
            LayoutBounds {
                min_x: f64::INFINITY,
                min_y: f64::INFINITY,
                max_x: f64::NEG_INFINITY,
                max_y: f64::NEG_INFINITY,
            },
            |b, p| LayoutBounds {
                min_x: b.min_x.min(p.x),
                min_y: b.min_y.min(p.y),
                max_x: b.max_x.max(p.x),
                max_y: b.max_y.max(p.y),
            },
        );

        debug!(iterations, width = bounds.width(), height = bounds.height(), "Layout complete");
        Ok(LayoutResult {
            positions,
            bounds,
            iterations,
        })
    }

    fn name(&self) -> &'static str {
        "fruchterman-reingold"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardPair, CardStatistics, EdgeData, NodeData};

    fn graph(ids: &[&str], edges: &[(&str, &str, u64)]) -> CardGraph {
        let mut graph = CardGraph::new();
        for id in ids {
            graph
                .add_node(NodeData::new((*id).into(), *id, CardStatistics::default()))
                .unwrap();
        }
        for (a, b, w) in edges {
            let pair = CardPair::new((*a).into(), (*b).into()).unwrap();
            graph.add_edge(EdgeData::new(pair, *w)).unwrap();
        }
        graph
    }

    fn distance(a: &Position, b: &Position) -> f64 {
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    #[test]
    fn test_empty_graph() {
        let result = ForceLayout::new().layout(&CardGraph::new()).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn test_single_node_stays_at_origin() {
        let result = ForceLayout::new().layout(&graph(&["1"], &[])).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.positions[0].x, 0.0);
        assert_eq!(result.positions[0].y, 0.0);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let g = graph(&["1", "2", "3", "4"], &[("1", "2", 5), ("2", "3", 1), ("3", "4", 2)]);
        let a = ForceLayout::new().with_seed(3).layout(&g).unwrap();
        let b = ForceLayout::new().with_seed(3).layout(&g).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_positions_finite_and_inside_bounds() {
        let g = graph(
            &["1", "2", "3", "4", "5"],
            &[("1", "2", 40), ("1", "3", 35), ("4", "5", 31)],
        );
        let result = ForceLayout::new().with_iterations(50).layout(&g).unwrap();
        assert_eq!(result.len(), 5);
        for p in &result.positions {
            assert!(p.x.is_finite() && p.y.is_finite());
            assert!(p.x >= result.bounds.min_x && p.x <= result.bounds.max_x);
            assert!(p.y >= result.bounds.min_y && p.y <= result.bounds.max_y);
        }
        assert!(result.iterations <= 50);
    }

    #[test]
    fn test_connected_nodes_end_up_closer() {
        let g = graph(&["1", "2", "3"], &[("1", "2", 10)]);
        let result = ForceLayout::new().layout(&g).unwrap();
        let (a, b, c) = (
            result.get("1").unwrap(),
            result.get("2").unwrap(),
            result.get("3").unwrap(),
        );
        assert!(distance(a, b) < distance(a, c));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let g = graph(&["1", "2"], &[]);
        assert!(ForceLayout::new().with_iterations(0).layout(&g).is_err());
    }
}
