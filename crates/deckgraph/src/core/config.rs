//! Pipeline configuration
//!
//! Every knob of a run lives in [`DeckGraphConfig`]. Values can come from a
//! TOML file, where any omitted key falls back to its default, and callers
//! (the CLI) override individual fields afterwards.
//!
//! ```toml
//! deck_dir = "decks"
//! edge_threshold = 25
//! max_nodes = 300
//! communities = true
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::DeckGraphError;

/// Public card database queried when the local cache is missing
pub const DEFAULT_CATALOG_URL: &str = "https://db.ygoprodeck.com/api/v7/cardinfo.php";

/// Page title used when none is configured
pub const DEFAULT_TITLE: &str = "Deck co-occurrence graph";

/// How the card catalog cache is populated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchPolicy {
    /// Load the cache file if present, otherwise download and persist it
    #[default]
    CacheFirst,
    /// Always download and overwrite the cache file
    Refresh,
    /// Never touch the network; a missing cache file is an error
    Offline,
}

impl fmt::Display for FetchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchPolicy::CacheFirst => write!(f, "cache-first"),
            FetchPolicy::Refresh => write!(f, "refresh"),
            FetchPolicy::Offline => write!(f, "offline"),
        }
    }
}

impl FromStr for FetchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cache-first" | "cache_first" => Ok(FetchPolicy::CacheFirst),
            "refresh" => Ok(FetchPolicy::Refresh),
            "offline" => Ok(FetchPolicy::Offline),
            _ => Err(format!("Unknown fetch policy: {}", s)),
        }
    }
}

/// Output artifact format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Standalone interactive HTML page
    #[default]
    Html,
    /// Raw graph export as JSON
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Html => write!(f, "html"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Configuration for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckGraphConfig {
    /// Local JSON cache of the card catalog
    pub catalog_path: PathBuf,
    pub catalog_url: String,
    pub fetch_policy: FetchPolicy,
    /// Skip the catalog entirely; labels fall back to raw ids
    pub use_catalog: bool,
    /// Directory holding `.ydk` files
    pub deck_dir: PathBuf,
    /// Descend into subdirectories of `deck_dir`
    pub recursive: bool,
    /// Minimum co-occurrence count for an edge to be drawn
    pub edge_threshold: u64,
    /// Keep only the most played cards
    pub max_nodes: Option<usize>,
    /// Worker threads for parsing; 0 uses all available cores
    pub workers: usize,
    /// Seed for community detection and layout
    pub seed: u64,
    pub communities: bool,
    pub layout: bool,
    pub layout_iterations: usize,
    pub community_passes: usize,
    /// Cap on node sweeps within one community pass
    pub community_sweeps: usize,
    pub min_node_size: f64,
    pub max_node_size: f64,
    pub output: PathBuf,
    pub output_format: OutputFormat,
    /// Page title of the HTML output
    pub title: String,
}

impl Default for DeckGraphConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("cardinfo.json"),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            fetch_policy: FetchPolicy::CacheFirst,
            use_catalog: true,
            deck_dir: PathBuf::from("."),
            recursive: false,
            edge_threshold: 30,
            max_nodes: None,
            workers: 0,
            seed: 42,
            communities: false,
            layout: false,
            layout_iterations: 300,
            community_passes: 10,
            community_sweeps: 100,
            min_node_size: 10.0,
            max_node_size: 60.0,
            output: PathBuf::from("deck_graph.html"),
            output_format: OutputFormat::Html,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl DeckGraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(input: &str) -> Result<Self, DeckGraphError> {
        let config: Self =
            toml::from_str(input).map_err(|e| DeckGraphError::config_error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, DeckGraphError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DeckGraphError::config_error(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), DeckGraphError> {
        if self.max_nodes == Some(0) {
            return Err(DeckGraphError::config_error(
                "max_nodes must be at least 1".to_string(),
            ));
        }
        if self.community_passes == 0 {
            return Err(DeckGraphError::config_error(
                "community_passes must be at least 1".to_string(),
            ));
        }
        if self.community_sweeps == 0 {
            return Err(DeckGraphError::config_error(
                "community_sweeps must be at least 1".to_string(),
            ));
        }
        if !(self.min_node_size.is_finite() && self.max_node_size.is_finite())
            || self.min_node_size <= 0.0
            || self.min_node_size > self.max_node_size
        {
            return Err(DeckGraphError::config_error(format!(
                "invalid node size range {}..{}",
                self.min_node_size, self.max_node_size
            )));
        }
        if self.use_catalog && self.catalog_url.trim().is_empty() {
            return Err(DeckGraphError::config_error(
                "catalog_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
