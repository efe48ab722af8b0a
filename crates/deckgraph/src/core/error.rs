//! Core error types for deck graph processing
//!
//! This module defines the error types shared by the catalog, configuration,
//! graph and rendering stages of the pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Core error types for deck graph processing
#[derive(Error, Debug)]
pub enum DeckGraphError {
    #[error("Catalog request failed: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("Catalog request to {url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Catalog decode error: {message}")]
    CatalogDecode { message: String },

    #[error("Catalog cache not found at {path} and fetching is disabled")]
    CatalogUnavailable { path: PathBuf },

    #[error("Config error: {message}")]
    ConfigError { message: String },

    #[error("Worker pool error: {message}")]
    WorkerPool { message: String },

    #[error("Community detection error: {message}")]
    CommunityError { message: String },

    #[error("Layout error: {message}")]
    LayoutError { message: String },

    #[error("Render error: {message}")]
    RenderError { message: String },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl DeckGraphError {
    /// Create a new catalog decode error
    pub fn catalog_decode(message: String) -> Self {
        Self::CatalogDecode { message }
    }

    /// Create a new config error
    pub fn config_error(message: String) -> Self {
        Self::ConfigError { message }
    }

    /// Create a new worker pool error
    pub fn worker_pool(message: String) -> Self {
        Self::WorkerPool { message }
    }

    /// Create a new community detection error
    pub fn community_error(message: String) -> Self {
        Self::CommunityError { message }
    }

    /// Create a new layout error
    pub fn layout_error(message: String) -> Self {
        Self::LayoutError { message }
    }

    /// Create a new render error
    pub fn render_error(message: String) -> Self {
        Self::RenderError { message }
    }
}

impl From<serde_json::Error> for DeckGraphError {
    fn from(e: serde_json::Error) -> Self {
        DeckGraphError::CatalogDecode {
            message: e.to_string(),
        }
    }
}
