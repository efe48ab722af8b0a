//! End-to-end pipeline tests
//!
//! Decks are written to temporary directories and run through discovery,
//! aggregation, graph construction and rendering.

use deckgraph::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &[u8]) {
    fs::write(dir.join(name), content).unwrap();
}

fn config(dir: &Path) -> DeckGraphConfig {
    DeckGraphConfig {
        deck_dir: dir.to_path_buf(),
        use_catalog: false,
        edge_threshold: 1,
        output: dir.join("graph.html"),
        ..DeckGraphConfig::default()
    }
}

// =============================================================================
// Aggregation
// =============================================================================

mod aggregation {
    use super::*;

    #[test]
    fn test_reference_deck_counts() {
        let dir = tempdir().unwrap();
        write(dir.path(), "ref.ydk", b"#main\n1\n1\n2\n#extra\n3\n!side\n4\n");

        let (files, agg) = Orchestrator::new(config(dir.path())).unwrap().aggregate().unwrap();
        assert_eq!(files, 1);

        let stats = |id: &str| *agg.card_stats(id).unwrap();
        assert_eq!(stats("1"), CardStatistics { total: 2, main: 2, extra: 0, side: 0 });
        assert_eq!(stats("2"), CardStatistics { total: 1, main: 1, extra: 0, side: 0 });
        assert_eq!(stats("3"), CardStatistics { total: 1, main: 0, extra: 1, side: 0 });
        assert_eq!(stats("4"), CardStatistics { total: 1, main: 0, extra: 0, side: 1 });

        let pairs = agg.co_occurrence();
        assert_eq!(pairs.len(), 6);
        assert!(pairs.iter().all(|(_, count)| count == 1));
    }

    #[test]
    fn test_pair_counts_across_decks() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.ydk", b"#main\n10\n20\n");
        write(dir.path(), "b.ydk", b"#main\n10\n20\n30\n");

        let (_, agg) = Orchestrator::new(config(dir.path())).unwrap().aggregate().unwrap();
        let pairs = agg.co_occurrence();
        assert_eq!(pairs.get(&"10".into(), &"20".into()), 2);
        assert_eq!(pairs.get(&"10".into(), &"30".into()), 1);
        assert_eq!(pairs.get(&"20".into(), &"30".into()), 1);
    }

    #[test]
    fn test_worker_count_does_not_change_result() {
        let dir = tempdir().unwrap();
        for i in 0..12 {
            let body = format!("#main\n{}\n{}\n1\n#extra\n{}\n", i, i + 1, i % 3 + 100);
            write(dir.path(), &format!("deck{:02}.ydk", i), body.as_bytes());
        }

        let (_, single) = Orchestrator::new(DeckGraphConfig { workers: 1, ..config(dir.path()) })
            .unwrap()
            .aggregate()
            .unwrap();
        let (_, pooled) = Orchestrator::new(DeckGraphConfig { workers: 4, ..config(dir.path()) })
            .unwrap()
            .aggregate()
            .unwrap();
        assert_eq!(single, pooled);
        assert_eq!(single.deck_count(), 12);
    }

    #[test]
    fn test_invalid_utf8_keeps_readable_lines() {
        let dir = tempdir().unwrap();
        write(dir.path(), "bad.ydk", b"#created by \xff\xfe\n#main\n5\n6\n");

        let (_, agg) = Orchestrator::new(config(dir.path())).unwrap().aggregate().unwrap();
        assert_eq!(agg.deck_count(), 1);
        assert_eq!(agg.card_count(), 2);
    }

    #[test]
    fn test_cards_before_any_marker_are_dropped() {
        let dir = tempdir().unwrap();
        write(dir.path(), "orphans.ydk", b"7\n8\n#main\n9\n");

        let (_, agg) = Orchestrator::new(config(dir.path())).unwrap().aggregate().unwrap();
        assert!(agg.card_stats("7").is_none());
        assert_eq!(agg.card_stats("9").unwrap().total, 1);
    }
}

// =============================================================================
// Discovery
// =============================================================================

mod discovery {
    use super::*;

    #[test]
    fn test_empty_directory_gives_empty_graph() {
        let dir = tempdir().unwrap();
        let output = Orchestrator::new(config(dir.path()))
            .unwrap()
            .run_with_catalog(&InMemoryCatalog::empty())
            .unwrap();
        assert_eq!(output.deck_files, 0);
        assert_eq!(output.graph.node_count(), 0);
        assert_eq!(output.graph.edge_count(), 0);
    }

    #[test]
    fn test_recursive_flag() {
        let dir = tempdir().unwrap();
        write(dir.path(), "top.ydk", b"#main\n1\n");
        fs::create_dir(dir.path().join("season")).unwrap();
        write(&dir.path().join("season"), "inner.ydk", b"#main\n2\n");

        let flat = Orchestrator::new(config(dir.path())).unwrap().aggregate().unwrap();
        assert_eq!(flat.0, 1);

        let deep = Orchestrator::new(DeckGraphConfig { recursive: true, ..config(dir.path()) })
            .unwrap()
            .aggregate()
            .unwrap();
        assert_eq!(deep.0, 2);
        assert!(deep.1.card_stats("2").is_some());
    }
}

// =============================================================================
// Graph and rendering
// =============================================================================

mod graph {
    use super::*;

    fn corpus(dir: &Path) {
        for i in 0..5 {
            write(dir, &format!("combo{}.ydk", i), b"#main\n1\n2\n3\n");
        }
        write(dir, "rogue.ydk", b"#main\n1\n4\n!side\n5\n");
    }

    #[test]
    fn test_threshold_and_catalog_labels() {
        let dir = tempdir().unwrap();
        corpus(dir.path());
        let catalog = InMemoryCatalog::from_cards([
            CardInfo::new(1, "Pot of Greed"),
            CardInfo::new(2, "Raigeki"),
            CardInfo::new(99, "Unused Card"),
        ]);

        let config = DeckGraphConfig { edge_threshold: 5, ..config(dir.path()) };
        let output = Orchestrator::new(config).unwrap().run_with_catalog(&catalog).unwrap();

        assert_eq!(output.graph.node_count(), 5);
        assert_eq!(output.graph.edge_count(), 3);
        assert_eq!(output.graph.get_node("1").unwrap().label, "Pot of Greed");
        assert_eq!(output.graph.get_node("4").unwrap().label, "4");
        assert!(output.graph.get_node("99").is_none());
        assert_eq!(output.usage.unused, vec![CardId::new("99")]);

        let node = output.graph.get_node("1").unwrap();
        assert!(node.title.contains("Total appearances: 6"));
    }

    #[test]
    fn test_max_nodes_cap() {
        let dir = tempdir().unwrap();
        corpus(dir.path());
        let config = DeckGraphConfig { max_nodes: Some(2), ..config(dir.path()) };
        let output = Orchestrator::new(config)
            .unwrap()
            .run_with_catalog(&InMemoryCatalog::empty())
            .unwrap();

        let ids: Vec<&str> = output.graph.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(output.graph.edge_count(), 1);
    }

    #[test]
    fn test_html_output_written() {
        let dir = tempdir().unwrap();
        corpus(dir.path());
        let config = DeckGraphConfig { communities: true, ..config(dir.path()) };
        let output_path = config.output.clone();

        let output = deckgraph::run(config).unwrap();
        assert!(output.communities.is_some());

        let page = fs::read_to_string(output_path).unwrap();
        assert!(page.contains("vis.Network"));
        assert!(page.contains("Co-occurrence in decks: 5"));
    }

    #[test]
    fn test_same_seed_same_export() {
        let dir = tempdir().unwrap();
        corpus(dir.path());
        let config = DeckGraphConfig {
            communities: true,
            layout: true,
            layout_iterations: 40,
            seed: 9,
            ..config(dir.path())
        };
        let orchestrator = Orchestrator::new(config).unwrap();
        let a = orchestrator.run_with_catalog(&InMemoryCatalog::empty()).unwrap();
        let b = orchestrator.run_with_catalog(&InMemoryCatalog::empty()).unwrap();
        assert_eq!(a.export, b.export);
        assert_eq!(
            JsonRenderer::new().render(&a.export).unwrap(),
            JsonRenderer::new().render(&b.export).unwrap()
        );
    }
}

// =============================================================================
// Catalog
// =============================================================================

mod catalog {
    use super::*;

    #[test]
    fn test_offline_policy_reads_existing_cache() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.ydk", b"#main\n89631139\n");
        let cache = dir.path().join("cardinfo.json");
        write(
            dir.path(),
            "cardinfo.json",
            br#"{"data":[{"id":89631139,"name":"Blue-Eyes White Dragon"}]}"#,
        );

        let config = DeckGraphConfig {
            use_catalog: true,
            catalog_path: cache,
            fetch_policy: FetchPolicy::Offline,
            ..config(dir.path())
        };
        let output = Orchestrator::new(config).unwrap().run().unwrap();
        assert_eq!(
            output.graph.get_node("89631139").unwrap().label,
            "Blue-Eyes White Dragon"
        );
    }

    #[test]
    fn test_offline_policy_without_cache_fails() {
        let dir = tempdir().unwrap();
        let config = DeckGraphConfig {
            use_catalog: true,
            catalog_path: dir.path().join("missing.json"),
            fetch_policy: FetchPolicy::Offline,
            ..config(dir.path())
        };
        let err = Orchestrator::new(config).unwrap().run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeckGraphError>(),
            Some(DeckGraphError::CatalogUnavailable { .. })
        ));
    }
}
