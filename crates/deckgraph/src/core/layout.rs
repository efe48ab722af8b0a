//! Core layout trait for graph positioning
//!
//! This trait defines the interface for placing graph nodes in a 2D
//! coordinate system.

use anyhow::Result;

use super::Database;

/// Core trait for layout algorithms
///
/// # Example
/// ```
/// use deckgraph::core::LayoutAlgorithm;
/// use deckgraph::graph::{CardGraph, ForceLayout};
///
/// let graph = CardGraph::new();
/// let layout = ForceLayout::new();
/// let positions = layout.layout(&graph).unwrap();
/// assert!(positions.is_empty());
/// ```
pub trait LayoutAlgorithm<D: Database>: Send + Sync {
    /// The output type of this layout algorithm
    type Output;

    /// Arrange elements in the database using this layout algorithm
    fn layout(&self, database: &D) -> Result<Self::Output>;

    /// Get the name of this layout algorithm
    fn name(&self) -> &'static str;

    /// Get the version of this layout algorithm
    fn version(&self) -> &'static str;
}
