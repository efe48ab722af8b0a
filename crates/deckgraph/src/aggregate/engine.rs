//! Parallel aggregation over deck files
//!
//! Each file is parsed and aggregated on its own by a rayon worker; the
//! per-file partials are combined with `reduce`. No counter is shared
//! between workers.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, span, Level};

use super::Aggregation;
use crate::core::DeckGraphError;
use crate::deck::{load_deck, ParsedDeck, YdkParser};

/// Builds an [`Aggregation`] from many decks
#[derive(Debug, Clone, Default)]
pub struct AggregationEngine {
    parser: YdkParser,
    workers: usize,
}

impl AggregationEngine {
    /// Engine using rayon's global pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with a dedicated pool of `workers` threads (0 means default)
    pub fn with_workers(workers: usize) -> Self {
        Self {
            parser: YdkParser::new(),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Parse and aggregate every file
    ///
    /// Unreadable files are logged and counted in
    /// [`Aggregation::failed_files`]; they never abort the batch.
    pub fn aggregate_files(&self, paths: &[PathBuf]) -> Result<Aggregation, DeckGraphError> {
        let aggregate_span = span!(
            Level::INFO,
            "aggregate_files",
            file_count = paths.len(),
            workers = self.workers
        );
        let _enter = aggregate_span.enter();
        let start = Instant::now();

        let aggregation = self.run(|| {
            paths
                .par_iter()
                .map(|path| match load_deck(&self.parser, path) {
                    Some(deck) => Aggregation::from_deck(&deck),
                    None => Aggregation::failed_file(),
                })
                .reduce(Aggregation::new, Aggregation::merge)
        })?;

        info!(
            decks = aggregation.deck_count(),
            failed_files = aggregation.failed_files(),
            cards = aggregation.card_count(),
            pairs = aggregation.co_occurrence().len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Aggregation completed"
        );
        Ok(aggregation)
    }

    /// Aggregate decks that are already parsed
    pub fn aggregate_decks(&self, decks: &[ParsedDeck]) -> Result<Aggregation, DeckGraphError> {
        let aggregation = self.run(|| {
            decks
                .par_iter()
                .map(Aggregation::from_deck)
                .reduce(Aggregation::new, Aggregation::merge)
        })?;
        debug!(
            decks = aggregation.deck_count(),
            cards = aggregation.card_count(),
            "Aggregated parsed decks"
        );
        Ok(aggregation)
    }

    fn run<F>(&self, job: F) -> Result<Aggregation, DeckGraphError>
    where
        F: FnOnce() -> Aggregation + Send,
    {
        if self.workers == 0 {
            return Ok(job());
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("deckgraph-worker-{}", i))
            .build()
            .map_err(|e| DeckGraphError::worker_pool(e.to_string()))?;
        Ok(pool.install(job))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CardId;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_aggregate_files_skips_unreadable() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.ydk");
        let b = dir.path().join("b.ydk");
        fs::write(&a, "#main\n1\n2\n").unwrap();
        fs::write(&b, "#main\n2\n3\n").unwrap();
        let missing = dir.path().join("missing.ydk");

        let engine = AggregationEngine::with_workers(2);
        let agg = engine.aggregate_files(&[a, missing, b]).unwrap();

        assert_eq!(agg.deck_count(), 2);
        assert_eq!(agg.failed_files(), 1);
        assert_eq!(agg.card_stats("2").unwrap().total, 2);
        assert_eq!(
            agg.co_occurrence().get(&CardId::new("1"), &CardId::new("2")),
            1
        );
        assert_eq!(
            agg.co_occurrence().get(&CardId::new("1"), &CardId::new("3")),
            0
        );
    }

    #[test]
    fn test_worker_count_does_not_change_result() {
        let parser = YdkParser::new();
        let decks: Vec<ParsedDeck> = (0..40)
            .map(|i| {
                parser.parse_str(&format!(
                    "#main\n{}\n{}\n100\n#extra\n{}\n",
                    i % 7,
                    i % 5,
                    200 + i % 3
                ))
            })
            .collect();

        let serial = AggregationEngine::with_workers(1).aggregate_decks(&decks).unwrap();
        let parallel = AggregationEngine::with_workers(4).aggregate_decks(&decks).unwrap();
        let global = AggregationEngine::new().aggregate_decks(&decks).unwrap();

        assert_eq!(serial, parallel);
        assert_eq!(serial, global);
        assert_eq!(serial.deck_count(), 40);
        assert_eq!(serial.card_stats("100").unwrap().main, 40);
    }

    #[test]
    fn test_no_files() {
        let agg = AggregationEngine::new().aggregate_files(&[]).unwrap();
        assert_eq!(agg, Aggregation::new());
    }
}
