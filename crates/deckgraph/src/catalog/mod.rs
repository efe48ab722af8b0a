//! Card catalog: reference metadata keyed by card id
//!
//! The pipeline only needs display names, so everything goes through the
//! [`CardCatalog`] trait. [`CatalogLoader`] provides the on-disk cache
//! backed by a [`CatalogSource`] (HTTP by default).

mod cache;
mod source;

pub use cache::CatalogLoader;
pub use source::{CatalogSource, HttpCatalogSource};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::aggregate::Aggregation;
use crate::core::CardId;

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardInfo {
    pub id: u64,
    pub name: String,
    /// Remaining fields of the entry, kept verbatim
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl CardInfo {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            attributes: serde_json::Map::new(),
        }
    }

    /// Card type line such as "Effect Monster", when present
    pub fn card_type(&self) -> Option<&str> {
        self.attributes.get("type").and_then(|v| v.as_str())
    }
}

/// Top-level shape of the catalog document: `{"data": [...]}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub data: Vec<CardInfo>,
}

/// Read-only lookup of card metadata
///
/// Shared by reference with worker threads, hence `Send + Sync`.
pub trait CardCatalog: Send + Sync {
    /// Look up a card by its stringified id
    fn get(&self, id: &str) -> Option<&CardInfo>;

    /// Number of cards in the catalog
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every card id known to the catalog
    fn ids(&self) -> Box<dyn Iterator<Item = &str> + '_>;

    /// Display name, if the card is known
    fn name(&self, id: &str) -> Option<&str> {
        self.get(id).map(|card| card.name.as_str())
    }
}

/// Catalog held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    cards: HashMap<String, CardInfo>,
}

impl InMemoryCatalog {
    /// Catalog with no cards; every label falls back to the raw id
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: impl IntoIterator<Item = CardInfo>) -> Self {
        let cards = cards
            .into_iter()
            .map(|card| (card.id.to_string(), card))
            .collect();
        Self { cards }
    }

    pub fn from_document(document: CatalogDocument) -> Self {
        Self::from_cards(document.data)
    }

    pub fn insert(&mut self, card: CardInfo) {
        self.cards.insert(card.id.to_string(), card);
    }
}

impl CardCatalog for InMemoryCatalog {
    fn get(&self, id: &str) -> Option<&CardInfo> {
        self.cards.get(id)
    }

    fn len(&self) -> usize {
        self.cards.len()
    }

    fn ids(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.cards.keys().map(|k| k.as_str()))
    }
}

/// Catalog coverage of an aggregated corpus
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageReport {
    /// Cards in the catalog
    pub catalog_size: usize,
    /// Catalog cards that never appeared in any deck, sorted
    pub unused: Vec<CardId>,
    /// Played cards the catalog does not know, sorted
    pub unknown: Vec<CardId>,
}

impl UsageReport {
    /// Compare the catalog against the cards seen in the corpus
    pub fn new(catalog: &dyn CardCatalog, aggregation: &Aggregation) -> Self {
        let stats = aggregation.statistics();

        let mut unused: Vec<CardId> = catalog
            .ids()
            .filter(|id| !stats.contains_key(*id))
            .map(CardId::from)
            .collect();
        unused.sort();

        let mut unknown: Vec<CardId> = stats
            .keys()
            .filter(|id| catalog.get(id.as_str()).is_none())
            .cloned()
            .collect();
        unknown.sort();

        Self {
            catalog_size: catalog.len(),
            unused,
            unknown,
        }
    }

    pub fn unused_count(&self) -> usize {
        self.unused.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::YdkParser;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::from_cards([
            CardInfo::new(1, "One"),
            CardInfo::new(2, "Two"),
            CardInfo::new(3, "Three"),
        ])
    }

    #[test]
    fn test_lookup_by_string_id() {
        let catalog = catalog();
        assert_eq!(catalog.name("2"), Some("Two"));
        assert!(catalog.get("9").is_none());
        assert_eq!(catalog.len(), 3);
        assert!(!catalog.is_empty());
        assert!(InMemoryCatalog::empty().is_empty());
    }

    #[test]
    fn test_document_decoding_keeps_attributes() {
        let json = r#"{"data":[{"id":89631139,"name":"Blue-Eyes White Dragon","type":"Normal Monster","atk":3000}]}"#;
        let doc: CatalogDocument = serde_json::from_str(json).unwrap();
        let catalog = InMemoryCatalog::from_document(doc);
        let card = catalog.get("89631139").unwrap();
        assert_eq!(card.name, "Blue-Eyes White Dragon");
        assert_eq!(card.card_type(), Some("Normal Monster"));
        assert_eq!(card.attributes.get("atk").and_then(|v| v.as_u64()), Some(3000));
    }

    #[test]
    fn test_document_without_data_is_empty() {
        let doc: CatalogDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.data.is_empty());
    }

    #[test]
    fn test_usage_report() {
        let deck = YdkParser::new().parse_str("#main\n1\n4\n");
        let agg = Aggregation::from_deck(&deck);
        let report = UsageReport::new(&catalog(), &agg);

        assert_eq!(report.catalog_size, 3);
        let unused: Vec<&str> = report.unused.iter().map(|c| c.as_str()).collect();
        assert_eq!(unused, vec!["2", "3"]);
        assert_eq!(report.unknown, vec![CardId::new("4")]);
        assert_eq!(report.unused_count(), 2);
    }
}
