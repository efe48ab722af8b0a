//! Pipeline orchestrator
//!
//! Runs one full pass over a deck corpus:
//! Catalog → Discover → Aggregate → Build → (Partition) → (Layout) → Export → Render
//!
//! The catalog is loaded before any deck is read and is only borrowed
//! afterwards, so the aggregation workers never see a partially loaded one.

use anyhow::{Context, Result};
use std::fs;
use tracing::{debug, info, span, warn, Level};

use crate::aggregate::{Aggregation, AggregationEngine};
use crate::catalog::{CardCatalog, CatalogLoader, HttpCatalogSource, InMemoryCatalog, UsageReport};
use crate::core::{Database, DeckGraphConfig, LayoutAlgorithm};
use crate::deck::discover_deck_files;
use crate::graph::{CardGraph, CommunityAssignment, ForceLayout, GraphBuilder, LayoutResult, Louvain};
use crate::render::{render_export, GraphExport};

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Number of deck files discovered
    pub deck_files: usize,
    pub aggregation: Aggregation,
    pub graph: CardGraph,
    pub communities: Option<CommunityAssignment>,
    pub layout: Option<LayoutResult>,
    pub export: GraphExport,
    pub usage: UsageReport,
}

/// Coordinates the pipeline stages for a configuration
pub struct Orchestrator {
    config: DeckGraphConfig,
}

impl Orchestrator {
    /// Create an orchestrator; the configuration is validated up front
    pub fn new(config: DeckGraphConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DeckGraphConfig {
        &self.config
    }

    /// Load the card catalog according to the configured fetch policy
    ///
    /// With the catalog disabled an empty one is returned and every label
    /// falls back to the raw card id.
    pub fn load_catalog(&self) -> Result<InMemoryCatalog> {
        if !self.config.use_catalog {
            debug!("Catalog disabled, labels fall back to card ids");
            return Ok(InMemoryCatalog::empty());
        }
        let source = HttpCatalogSource::new(self.config.catalog_url.clone())?;
        let loader = CatalogLoader::new(
            self.config.catalog_path.clone(),
            self.config.fetch_policy,
            Box::new(source),
        );
        Ok(loader.load()?)
    }

    /// Discover and aggregate every deck file under the deck directory
    pub fn aggregate(&self) -> Result<(usize, Aggregation)> {
        let files = discover_deck_files(&self.config.deck_dir, self.config.recursive)
            .with_context(|| format!("cannot scan {}", self.config.deck_dir.display()))?;
        if files.is_empty() {
            warn!(dir = %self.config.deck_dir.display(), "No deck files found");
        }
        let aggregation = AggregationEngine::with_workers(self.config.workers).aggregate_files(&files)?;
        Ok((files.len(), aggregation))
    }

    /// Run every stage, loading the catalog first
    pub fn run(&self) -> Result<PipelineOutput> {
        let catalog = self.load_catalog()?;
        self.run_with_catalog(&catalog)
    }

    /// Run every stage against an already loaded catalog
    pub fn run_with_catalog(&self, catalog: &dyn CardCatalog) -> Result<PipelineOutput> {
        let run_span = span!(
            Level::INFO,
            "run_pipeline",
            deck_dir = %self.config.deck_dir.display(),
            threshold = self.config.edge_threshold
        );
        let _enter = run_span.enter();

        info!("Starting deck graph pipeline");

        let (deck_files, aggregation) = {
            let aggregate_span = span!(Level::DEBUG, "pipeline_aggregate");
            let _enter = aggregate_span.enter();
            self.aggregate()?
        };

        let usage = UsageReport::new(catalog, &aggregation);
        if !usage.unknown.is_empty() {
            debug!(unknown = usage.unknown.len(), "Played cards missing from the catalog");
        }

        let graph = {
            let build_span = span!(Level::DEBUG, "pipeline_build");
            let _enter = build_span.enter();
            GraphBuilder::from_config(&self.config).build(&aggregation, catalog)?
        };

        let mut export = GraphExport::from_graph(&graph);

        let communities = if self.config.communities {
            let partition_span = span!(Level::DEBUG, "pipeline_partition");
            let _enter = partition_span.enter();
            let assignment = Louvain::from_config(&self.config).detect(&graph)?;
            export = export.with_communities(&assignment)?;
            Some(assignment)
        } else {
            None
        };

        let layout = if self.config.layout {
            let layout_span = span!(Level::DEBUG, "pipeline_layout");
            let _enter = layout_span.enter();
            let result = ForceLayout::from_config(&self.config).layout(&graph)?;
            export = export.with_layout(&result)?;
            Some(result)
        } else {
            None
        };

        info!(
            decks = aggregation.deck_count(),
            failed = aggregation.failed_files(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Pipeline completed successfully"
        );

        Ok(PipelineOutput {
            deck_files,
            aggregation,
            graph,
            communities,
            layout,
            export,
            usage,
        })
    }

    /// Render the export in the configured output format
    pub fn render(&self, output: &PipelineOutput) -> Result<String> {
        let render_span = span!(Level::DEBUG, "pipeline_render", format = %self.config.output_format);
        let _enter = render_span.enter();
        render_export(&output.export, &self.config)
    }

    /// Render and write the artifact to the configured output path
    pub fn write(&self, output: &PipelineOutput) -> Result<()> {
        let rendered = self.render(output)?;
        fs::write(&self.config.output, rendered)
            .with_context(|| format!("cannot write {}", self.config.output.display()))?;
        info!(path = %self.config.output.display(), "Graph written");
        Ok(())
    }
}
