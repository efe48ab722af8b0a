//! Command-line interface for the deckgraph utility
//!
//! Provides a CLI to turn a directory of YDK deck lists into a card
//! co-occurrence graph, print corpus statistics, or inspect a single deck.

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use deckgraph::catalog::{CardCatalog, UsageReport};
use deckgraph::core::logging::init_logging;
use deckgraph::graph::GraphBuilder;
use deckgraph::orchestrator::Orchestrator;
use deckgraph::{parse_deck, Database, DeckGraphConfig, FetchPolicy, OutputFormat};

/// Deckgraph - Card co-occurrence graphs from YDK deck lists
#[derive(Parser)]
#[command(name = "deckgraph")]
#[command(about = "A Rust utility to build card co-occurrence graphs from YDK deck lists")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML configuration file; command-line flags override its values
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Where the decks come from and how card names are resolved
#[derive(Args, Debug, Clone, Default)]
pub struct CorpusArgs {
    /// Directory containing .ydk files
    #[arg(short, long)]
    pub decks: Option<PathBuf>,

    /// Also scan subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Worker threads for parsing (0 = all cores)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Path of the card catalog cache
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// How the catalog cache is populated
    #[arg(long, value_enum)]
    pub fetch: Option<FetchChoice>,

    /// Do not load a catalog; label cards by id
    #[arg(long)]
    pub no_catalog: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the co-occurrence graph and write it as HTML or JSON
    Build {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Minimum number of shared decks for an edge
        #[arg(short, long)]
        threshold: Option<u64>,

        /// Keep only the most played cards
        #[arg(short, long)]
        max_nodes: Option<usize>,

        /// Seed for community detection and layout
        #[arg(long)]
        seed: Option<u64>,

        /// Colour nodes by detected community
        #[arg(long)]
        communities: bool,

        /// Precompute node positions instead of leaving it to the viewer
        #[arg(long)]
        layout: bool,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<FormatChoice>,
    },

    /// Print corpus statistics and catalog coverage
    Stats {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Number of most played cards to list
        #[arg(long, default_value_t = 20)]
        top: usize,

        /// Minimum number of shared decks counted as an edge
        #[arg(short, long)]
        threshold: Option<u64>,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Parse one deck file and print its sections as JSON
    Parse {
        /// Input deck file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

/// Catalog fetch policies
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum FetchChoice {
    /// Use the cache when present, otherwise download it
    CacheFirst,
    /// Always download a fresh catalog
    Refresh,
    /// Never download; the cache must exist
    Offline,
}

impl From<FetchChoice> for FetchPolicy {
    fn from(value: FetchChoice) -> Self {
        match value {
            FetchChoice::CacheFirst => FetchPolicy::CacheFirst,
            FetchChoice::Refresh => FetchPolicy::Refresh,
            FetchChoice::Offline => FetchPolicy::Offline,
        }
    }
}

/// Output formats
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum FormatChoice {
    Html,
    Json,
}

impl From<FormatChoice> for OutputFormat {
    fn from(value: FormatChoice) -> Self {
        match value {
            FormatChoice::Html => OutputFormat::Html,
            FormatChoice::Json => OutputFormat::Json,
        }
    }
}

/// One row of the `stats` listing
#[derive(Debug, Serialize)]
struct CardSummary {
    id: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    card_type: Option<String>,
    /// Edges touching the card at the current threshold
    degree: usize,
    total: u64,
    main: u64,
    extra: u64,
    side: u64,
}

#[derive(Debug, Serialize)]
struct StatsSummary {
    deck_files: usize,
    decks: usize,
    failed_files: usize,
    cards: usize,
    pairs: usize,
    max_pair_count: u64,
    threshold: u64,
    pairs_at_threshold: usize,
    edges: usize,
    isolated_cards: usize,
    top: Vec<CardSummary>,
    usage: UsageReport,
}

/// Main CLI application
#[derive(Default)]
pub struct DeckGraphApp;

impl DeckGraphApp {
    pub fn new() -> Self {
        Self
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level_str = std::env::var("DECKGRAPH_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var("DECKGRAPH_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Deckgraph v{}", env!("CARGO_PKG_VERSION"));
        }

        let base = self.load_config(cli.config.as_deref())?;

        match cli.command {
            Commands::Build {
                corpus,
                threshold,
                max_nodes,
                seed,
                communities,
                layout,
                output,
                format,
            } => {
                let mut config = Self::apply_corpus(base, &corpus);
                if let Some(threshold) = threshold {
                    config.edge_threshold = threshold;
                }
                if max_nodes.is_some() {
                    config.max_nodes = max_nodes;
                }
                if let Some(seed) = seed {
                    config.seed = seed;
                }
                config.communities |= communities;
                config.layout |= layout;
                if let Some(output) = output {
                    config.output = output;
                }
                if let Some(format) = format {
                    config.output_format = format.into();
                }
                self.build_command(config, cli.verbose)
            }
            Commands::Stats {
                corpus,
                top,
                threshold,
                json,
            } => {
                let mut config = Self::apply_corpus(base, &corpus);
                if let Some(threshold) = threshold {
                    config.edge_threshold = threshold;
                }
                self.stats_command(config, top, json, cli.verbose)
            }
            Commands::Parse { input } => self.parse_command(input, cli.verbose),
        }
    }

    /// Load the configuration file, or the defaults when none is given
    pub fn load_config(&self, path: Option<&Path>) -> Result<DeckGraphConfig> {
        match path {
            Some(path) => {
                let config = DeckGraphConfig::load(path)?;
                debug!(path = %path.display(), "Loaded configuration file");
                Ok(config)
            }
            None => Ok(DeckGraphConfig::default()),
        }
    }

    fn apply_corpus(mut config: DeckGraphConfig, corpus: &CorpusArgs) -> DeckGraphConfig {
        if let Some(decks) = &corpus.decks {
            config.deck_dir = decks.clone();
        }
        config.recursive |= corpus.recursive;
        if let Some(workers) = corpus.workers {
            config.workers = workers;
        }
        if let Some(catalog) = &corpus.catalog {
            config.catalog_path = catalog.clone();
        }
        if let Some(fetch) = corpus.fetch {
            config.fetch_policy = fetch.into();
        }
        if corpus.no_catalog {
            config.use_catalog = false;
        }
        config
    }

    /// Handle the build command
    fn build_command(&self, config: DeckGraphConfig, verbose: bool) -> Result<()> {
        let destination = config.output.clone();
        let orchestrator = Orchestrator::new(config)?;
        let output = orchestrator.run()?;
        let rendered = orchestrator.render(&output)?;
        self.write_output(Some(destination.clone()), &rendered)?;

        if verbose {
            eprintln!(
                "Processed {} deck files ({} unreadable)",
                output.deck_files,
                output.aggregation.failed_files()
            );
            eprintln!(
                "Graph: {} cards, {} edges",
                output.export.node_count(),
                output.export.edge_count()
            );
            if let Some(communities) = &output.communities {
                eprintln!(
                    "Communities: {} (modularity {:.3}, largest {} cards)",
                    communities.count,
                    communities.modularity,
                    communities.sizes().into_iter().max().unwrap_or(0)
                );
            }
            eprintln!(
                "{} catalog cards never played",
                output.usage.unused_count()
            );
        }
        if destination.to_string_lossy() != "-" {
            eprintln!("Graph saved to {}", destination.display());
        }
        Ok(())
    }

    /// Handle the stats command
    fn stats_command(&self, config: DeckGraphConfig, top: usize, json: bool, verbose: bool) -> Result<()> {
        let orchestrator = Orchestrator::new(config)?;
        let catalog = orchestrator.load_catalog()?;
        let (deck_files, aggregation) = orchestrator.aggregate()?;
        let usage = UsageReport::new(&catalog, &aggregation);
        let graph = GraphBuilder::from_config(orchestrator.config()).build(&aggregation, &catalog)?;

        if verbose {
            eprintln!("Aggregated {} deck files", deck_files);
        }

        let top: Vec<CardSummary> = aggregation
            .most_played()
            .into_iter()
            .take(top)
            .map(|(id, stats)| CardSummary {
                id: id.to_string(),
                name: catalog.name(id.as_str()).unwrap_or(id.as_str()).to_string(),
                card_type: catalog
                    .get(id.as_str())
                    .and_then(|card| card.card_type())
                    .map(str::to_string),
                degree: graph.degree(id.as_str()),
                total: stats.total,
                main: stats.main,
                extra: stats.extra,
                side: stats.side,
            })
            .collect();

        let summary = StatsSummary {
            deck_files,
            decks: aggregation.deck_count(),
            failed_files: aggregation.failed_files(),
            cards: aggregation.card_count(),
            pairs: aggregation.co_occurrence().len(),
            max_pair_count: aggregation.co_occurrence().max_count(),
            threshold: orchestrator.config().edge_threshold,
            pairs_at_threshold: aggregation
                .co_occurrence()
                .count_at_least(orchestrator.config().edge_threshold),
            edges: graph.edge_count(),
            isolated_cards: graph.isolated_nodes().len(),
            top,
            usage,
        };

        if json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print!("{}", format_stats(&summary));
        }
        Ok(())
    }

    /// Handle the parse command
    fn parse_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let deck = parse_deck(&content);
        self.write_output(None, &serde_json::to_string_pretty(&deck)?)
    }

    /// Read input from file or stdin
    ///
    /// Invalid UTF-8 is replaced rather than rejected, like deck files read
    /// during aggregation.
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        let bytes = match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e))?,
            _ => {
                let mut bytes = Vec::new();
                io::stdin().read_to_end(&mut bytes)?;
                bytes
            }
        };
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        let stdout_content = if content.is_empty() || content.ends_with('\n') {
            content.to_string()
        } else {
            format!("{}\n", content)
        };

        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                print!("{}", stdout_content);
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}

fn format_stats(summary: &StatsSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Decks: {} ({} files, {} unreadable)\n",
        summary.decks, summary.deck_files, summary.failed_files
    ));
    out.push_str(&format!(
        "Distinct cards: {}  Card pairs: {}  Most shared pair: {} decks\n",
        summary.cards, summary.pairs, summary.max_pair_count
    ));
    out.push_str(&format!(
        "Threshold {}: {} pairs, {} edges in graph, {} isolated cards\n",
        summary.threshold, summary.pairs_at_threshold, summary.edges, summary.isolated_cards
    ));
    if !summary.top.is_empty() {
        out.push_str("\nMost played:\n");
        for (rank, card) in summary.top.iter().enumerate() {
            out.push_str(&format!(
                "{:>4}. {:<40} {:>6}  (main {}, extra {}, side {}, degree {})\n",
                rank + 1,
                card.name,
                card.total,
                card.main,
                card.extra,
                card.side,
                card.degree
            ));
        }
    }
    out.push_str(&format!(
        "\nCatalog: {} cards, {} never played, {} played but unknown\n",
        summary.usage.catalog_size,
        summary.usage.unused_count(),
        summary.usage.unknown.len()
    ));
    out
}
