//! Card usage and co-occurrence aggregation
//!
//! An [`Aggregation`] is a purely additive summary of a set of decks. Two
//! aggregations over disjoint deck sets merge by element-wise summation, and
//! merging is commutative and associative, so partial results can be built
//! independently on worker threads and reduced once at the end.

mod engine;

pub use engine::AggregationEngine;

use std::collections::HashMap;

use crate::core::{CardId, CardPair, CardStatistics};
use crate::deck::ParsedDeck;

/// Deck counts per unordered card pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoOccurrenceCounter {
    counts: HashMap<CardPair, u64>,
}

impl CoOccurrenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to a pair
    pub fn add(&mut self, pair: CardPair, amount: u64) {
        *self.counts.entry(pair).or_insert(0) += amount;
    }

    /// Count for two cards in either order; 0 when never seen together
    pub fn get(&self, a: &CardId, b: &CardId) -> u64 {
        CardPair::new(a.clone(), b.clone())
            .and_then(|pair| self.counts.get(&pair).copied())
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CardPair, u64)> {
        self.counts.iter().map(|(pair, count)| (pair, *count))
    }

    /// Number of distinct pairs
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Largest count of any pair
    pub fn max_count(&self) -> u64 {
        self.counts.values().copied().max().unwrap_or(0)
    }

    /// Number of pairs whose count reaches `threshold`
    pub fn count_at_least(&self, threshold: u64) -> usize {
        self.counts.values().filter(|&&c| c >= threshold).count()
    }

    /// Add every count of `other` into this counter
    pub fn merge(&mut self, other: CoOccurrenceCounter) {
        if self.counts.len() < other.counts.len() {
            let mine = std::mem::replace(&mut self.counts, other.counts);
            for (pair, count) in mine {
                *self.counts.entry(pair).or_insert(0) += count;
            }
        } else {
            for (pair, count) in other.counts {
                *self.counts.entry(pair).or_insert(0) += count;
            }
        }
    }
}

/// Statistics and co-occurrence counts over a set of decks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    stats: HashMap<CardId, CardStatistics>,
    co_occurrence: CoOccurrenceCounter,
    decks: usize,
    failed_files: usize,
}

impl Aggregation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregation of a single deck
    pub fn from_deck(deck: &ParsedDeck) -> Self {
        let mut aggregation = Self::new();
        aggregation.add_deck(deck);
        aggregation
    }

    /// Aggregation standing for one file that could not be read
    pub fn failed_file() -> Self {
        Self {
            failed_files: 1,
            ..Self::default()
        }
    }

    /// Fold one deck into the counters
    ///
    /// Every occurrence increments the card's statistics. Each unordered pair
    /// of distinct cards present in the deck gains exactly 1, however many
    /// copies of either card the deck holds.
    pub fn add_deck(&mut self, deck: &ParsedDeck) {
        self.decks += 1;

        for (section, cards) in deck.sections() {
            for card in cards {
                match self.stats.get_mut(card) {
                    Some(stats) => stats.record(section),
                    None => {
                        let mut stats = CardStatistics::new();
                        stats.record(section);
                        self.stats.insert(card.clone(), stats);
                    }
                }
            }
        }

        let unique: Vec<&CardId> = deck.unique_cards().into_iter().collect();
        for (i, a) in unique.iter().enumerate() {
            for b in &unique[i + 1..] {
                if let Some(pair) = CardPair::new((*a).clone(), (*b).clone()) {
                    self.co_occurrence.add(pair, 1);
                }
            }
        }
    }

    /// Combine two partial aggregations
    pub fn merge(mut self, other: Aggregation) -> Aggregation {
        if self.stats.len() < other.stats.len() {
            return other.merge(self);
        }
        for (card, stats) in other.stats {
            self.stats.entry(card).or_default().merge(&stats);
        }
        self.co_occurrence.merge(other.co_occurrence);
        self.decks += other.decks;
        self.failed_files += other.failed_files;
        self
    }

    /// Per-card statistics for every card seen at least once
    pub fn statistics(&self) -> &HashMap<CardId, CardStatistics> {
        &self.stats
    }

    pub fn card_stats(&self, id: &str) -> Option<&CardStatistics> {
        self.stats.get(id)
    }

    pub fn co_occurrence(&self) -> &CoOccurrenceCounter {
        &self.co_occurrence
    }

    /// Decks that were read, including empty ones
    pub fn deck_count(&self) -> usize {
        self.decks
    }

    pub fn failed_files(&self) -> usize {
        self.failed_files
    }

    /// Distinct cards seen
    pub fn card_count(&self) -> usize {
        self.stats.len()
    }

    /// Cards sorted by total plays, most played first, ties by id
    pub fn most_played(&self) -> Vec<(&CardId, &CardStatistics)> {
        let mut cards: Vec<_> = self.stats.iter().collect();
        cards.sort_by(|(a_id, a), (b_id, b)| b.total.cmp(&a.total).then_with(|| a_id.cmp(b_id)));
        cards
    }
}
