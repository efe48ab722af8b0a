//! Core type definitions for deck processing
//!
//! This module contains the fundamental types used throughout deckgraph:
//! card identifiers, deck sections, per-card statistics, canonical card
//! pairs, and the node/edge records stored in the card graph.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Opaque card identifier as it appears in a deck file
///
/// No validation is performed beyond what the deck parser already checks.
/// Identifiers order lexicographically, which is the ordering used to
/// canonicalize card pairs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CardId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for CardId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The three partitions of a deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckSection {
    /// Main deck: `#main`
    Main,
    /// Extra deck: `#extra`
    Extra,
    /// Side deck: `!side`
    Side,
}

impl DeckSection {
    /// All sections in file order
    pub const ALL: [DeckSection; 3] = [DeckSection::Main, DeckSection::Extra, DeckSection::Side];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeckSection::Main => "main",
            DeckSection::Extra => "extra",
            DeckSection::Side => "side",
        }
    }

    /// Find the section named somewhere inside a marker line
    ///
    /// Matching is case-insensitive and checks `main`, `extra`, then `side`,
    /// so the first keyword in that order wins.
    pub fn from_marker_text(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|section| lower.contains(section.as_str()))
    }
}

impl fmt::Display for DeckSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeckSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "main" => Ok(DeckSection::Main),
            "extra" => Ok(DeckSection::Extra),
            "side" => Ok(DeckSection::Side),
            _ => Err(format!("Unknown deck section: {}", s)),
        }
    }
}

/// Usage counters for a single card across the corpus
///
/// Every occurrence is counted, duplicates included. `total` always equals
/// `main + extra + side`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardStatistics {
    pub total: u64,
    pub main: u64,
    pub extra: u64,
    pub side: u64,
}

impl CardStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of the card in `section`
    pub fn record(&mut self, section: DeckSection) {
        self.record_many(section, 1);
    }

    /// Record `count` occurrences of the card in `section`
    pub fn record_many(&mut self, section: DeckSection, count: u64) {
        self.total += count;
        match section {
            DeckSection::Main => self.main += count,
            DeckSection::Extra => self.extra += count,
            DeckSection::Side => self.side += count,
        }
    }

    /// Occurrences in a single section
    pub fn count(&self, section: DeckSection) -> u64 {
        match section {
            DeckSection::Main => self.main,
            DeckSection::Extra => self.extra,
            DeckSection::Side => self.side,
        }
    }

    /// Add another set of counters into this one
    pub fn merge(&mut self, other: &CardStatistics) {
        self.total += other.total;
        self.main += other.main;
        self.extra += other.extra;
        self.side += other.side;
    }
}

/// Unordered pair of distinct cards, stored with `first < second`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardPair {
    first: CardId,
    second: CardId,
}

impl CardPair {
    /// Build the canonical pair for two cards
    ///
    /// Returns `None` when both ids are the same card, since the graph never
    /// carries self-loops.
    pub fn new(a: CardId, b: CardId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { first: a, second: b }),
            std::cmp::Ordering::Greater => Some(Self { first: b, second: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn first(&self) -> &CardId {
        &self.first
    }

    pub fn second(&self) -> &CardId {
        &self.second
    }

    /// Check whether `id` is one of the two endpoints
    pub fn contains(&self, id: &str) -> bool {
        self.first.as_str() == id || self.second.as_str() == id
    }
}

impl fmt::Display for CardPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

/// A card node in the graph
#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub id: CardId,
    /// Display label, the catalog name when available
    pub label: String,
    /// Tooltip text shown by the renderer
    pub title: String,
    pub stats: CardStatistics,
    /// Rendering size derived from the total play count
    pub size: f64,
}

impl NodeData {
    pub fn new(id: CardId, label: impl Into<String>, stats: CardStatistics) -> Self {
        let label = label.into();
        let title = node_title(&label, &stats);
        Self {
            id,
            label,
            title,
            stats,
            size: 0.0,
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }
}

/// A weighted co-occurrence edge in the graph
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeData {
    pub pair: CardPair,
    /// Number of decks that contain both endpoints
    pub weight: u64,
    /// Tooltip text shown by the renderer
    pub title: String,
}

impl EdgeData {
    pub fn new(pair: CardPair, weight: u64) -> Self {
        Self {
            pair,
            weight,
            title: format!("Co-occurrence in decks: {}", weight),
        }
    }

    pub fn source(&self) -> &CardId {
        self.pair.first()
    }

    pub fn target(&self) -> &CardId {
        self.pair.second()
    }
}

fn node_title(label: &str, stats: &CardStatistics) -> String {
    format!(
        "<b>{}</b><br>Total appearances: {}<br>Main: {} &nbsp;&nbsp; Extra: {} &nbsp;&nbsp; Side: {}",
        escape_html(label),
        stats.total,
        stats.main,
        stats.extra,
        stats.side
    )
}

/// Escape text for inclusion in HTML markup
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
