//! Deckgraph - Card co-occurrence graphs from YDK deck lists
//!
//! A library for parsing a corpus of deck files, counting how often cards
//! are played and played together, and rendering the result as an
//! interactive graph.
//!
//! # Quick Start
//!
//! ```rust
//! use deckgraph::aggregate_texts;
//!
//! let aggregation = aggregate_texts(&["#main\n1\n2\n", "#main\n1\n2\n3\n"]);
//! assert_eq!(aggregation.deck_count(), 2);
//! assert_eq!(aggregation.co_occurrence().get(&"1".into(), &"2".into()), 2);
//! ```
//!
//! # Advanced Usage
//!
//! For more control, use the individual components:
//!
//! ```rust
//! use deckgraph::prelude::*;
//!
//! let deck = YdkParser::new().parse_str("#main\n1\n1\n2\n#extra\n3\n!side\n4\n");
//! let aggregation = Aggregation::from_deck(&deck);
//!
//! let graph = GraphBuilder::new()
//!     .with_threshold(1)
//!     .build(&aggregation, &InMemoryCatalog::empty())
//!     .unwrap();
//! assert_eq!(graph.node_count(), 4);
//! assert_eq!(graph.edge_count(), 6);
//!
//! let export = GraphExport::from_graph(&graph);
//! let html = HtmlRenderer::new().render(&export).unwrap();
//! assert!(html.contains("vis.Network"));
//! ```

pub mod aggregate;
pub mod catalog;
pub mod core;
pub mod deck;
pub mod graph;
pub mod orchestrator;
pub mod render;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::aggregate::{Aggregation, AggregationEngine, CoOccurrenceCounter};
    pub use crate::catalog::{CardCatalog, CardInfo, CatalogLoader, InMemoryCatalog, UsageReport};
    pub use crate::core::{
        CardId, CardPair, CardStatistics, Database, DeckGraphConfig, DeckGraphError, DeckSection,
        EdgeData, FetchPolicy, LayoutAlgorithm, NodeData, OutputFormat, Parser, Renderer,
    };
    pub use crate::deck::{ParsedDeck, YdkParser};
    pub use crate::graph::{CardGraph, CommunityAssignment, ForceLayout, GraphBuilder, Louvain};
    pub use crate::orchestrator::{Orchestrator, PipelineOutput};
    pub use crate::render::{GraphExport, HtmlRenderer, JsonRenderer};
}

/// Parse the text of one deck file
///
/// Never fails: unrecognised lines are skipped.
///
/// # Example
/// ```rust
/// use deckgraph::{parse_deck, DeckSection};
///
/// let deck = parse_deck("#main\n89631139\n!side\n14558127\n");
/// assert_eq!(deck.section(DeckSection::Main).len(), 1);
/// assert_eq!(deck.section(DeckSection::Side).len(), 1);
/// ```
pub fn parse_deck(input: &str) -> deck::ParsedDeck {
    deck::YdkParser::new().parse_str(input)
}

/// Parse and aggregate several deck texts on the current thread
pub fn aggregate_texts(inputs: &[&str]) -> aggregate::Aggregation {
    inputs.iter().fold(aggregate::Aggregation::new(), |mut acc, input| {
        acc.add_deck(&parse_deck(input));
        acc
    })
}

/// Run the whole pipeline for a configuration and write the artifact
///
/// Returns the pipeline output so callers can report on it.
pub fn run(config: DeckGraphConfig) -> anyhow::Result<orchestrator::PipelineOutput> {
    let orchestrator = orchestrator::Orchestrator::new(config)?;
    let output = orchestrator.run()?;
    orchestrator.write(&output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deck_reference_example() {
        let deck = parse_deck("#main\n1\n1\n2\n#extra\n3\n!side\n4\n");
        assert_eq!(deck.card_count(), 5);
        assert_eq!(deck.section(DeckSection::Extra), &[CardId::new("3")]);
    }

    #[test]
    fn test_aggregate_texts() {
        let aggregation = aggregate_texts(&["#main\n1\n2\n", "#main\n1\n2\n3\n"]);
        let pairs = aggregation.co_occurrence();
        assert_eq!(pairs.get(&"1".into(), &"2".into()), 2);
        assert_eq!(pairs.get(&"1".into(), &"3".into()), 1);
        assert_eq!(pairs.get(&"2".into(), &"3".into()), 1);
    }

    #[test]
    fn test_run_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("deck.ydk"), "#main\n1\n2\n").unwrap();
        let config = DeckGraphConfig {
            deck_dir: dir.path().to_path_buf(),
            use_catalog: false,
            output: dir.path().join("graph.html"),
            ..DeckGraphConfig::default()
        };
        let output = run(config).unwrap();
        assert_eq!(output.graph.node_count(), 2);
        assert_eq!(output.graph.edge_count(), 0);
        let page = std::fs::read_to_string(dir.path().join("graph.html")).unwrap();
        assert!(page.contains("<!DOCTYPE html>"));
    }
}
