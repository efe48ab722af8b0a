//! Core parser trait for deck markup
//!
//! This trait defines the interface for parsing deck-list text into a
//! structured target.

use anyhow::Result;

/// Core trait for parsers
///
/// A parser reads one input document and records what it finds into the
/// provided target. Parsers are shared across worker threads, so they must be
/// `Send + Sync` and keep no per-input state.
///
/// # Example
/// ```
/// use deckgraph::core::Parser;
/// use deckgraph::deck::{ParsedDeck, YdkParser};
///
/// let parser = YdkParser::new();
/// let mut deck = ParsedDeck::new();
/// parser.parse("#main\n89631139\n", &mut deck).unwrap();
/// assert_eq!(deck.card_count(), 1);
/// ```
pub trait Parser<T>: Send + Sync {
    /// Parse input into the provided target
    fn parse(&self, input: &str, target: &mut T) -> Result<()>;

    /// Get the name of this parser
    fn name(&self) -> &'static str;

    /// Get the version of this parser
    fn version(&self) -> &'static str;

    /// Check if the input looks like something this parser understands
    fn can_parse(&self, input: &str) -> bool;
}
