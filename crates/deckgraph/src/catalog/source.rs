//! Catalog sources
//!
//! A source produces the raw catalog document. The HTTP source talks to the
//! public card database; tests and offline tools can plug in their own.

use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::core::DeckGraphError;

/// Where a fresh copy of the catalog document comes from
pub trait CatalogSource: Send + Sync {
    /// Retrieve the whole document as JSON
    fn fetch(&self) -> Result<serde_json::Value, DeckGraphError>;

    /// Human readable origin, used in logs
    fn describe(&self) -> String;
}

/// Fetches the catalog document over HTTP with a single GET
///
/// Failures are returned as-is; there is no retry.
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    url: String,
    client: Client,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>) -> Result<Self, DeckGraphError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("deckgraph/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl CatalogSource for HttpCatalogSource {
    fn fetch(&self) -> Result<serde_json::Value, DeckGraphError> {
        info!(url = %self.url, "Downloading card catalog");
        let response = self.client.get(&self.url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeckGraphError::HttpStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let document: serde_json::Value = response.json()?;
        debug!(url = %self.url, "Card catalog downloaded");
        Ok(document)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
