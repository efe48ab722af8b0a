//! On-disk catalog cache
//!
//! The catalog is loaded once before aggregation starts. Depending on the
//! [`FetchPolicy`] the cache file is read, refreshed from the source, or
//! required to exist already.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, span, Level};

use super::source::CatalogSource;
use super::{CardCatalog, CatalogDocument, InMemoryCatalog};
use crate::core::{DeckGraphError, FetchPolicy};

/// Loads the catalog from a cache file, fetching it when the policy allows
pub struct CatalogLoader {
    path: PathBuf,
    policy: FetchPolicy,
    source: Box<dyn CatalogSource>,
}

impl CatalogLoader {
    pub fn new(path: impl Into<PathBuf>, policy: FetchPolicy, source: Box<dyn CatalogSource>) -> Self {
        Self {
            path: path.into(),
            policy,
            source,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> FetchPolicy {
        self.policy
    }

    /// Produce the catalog according to the fetch policy
    ///
    /// A failed fetch is fatal: the error is returned and no stale cache is
    /// substituted. Only [`FetchPolicy::Offline`] is allowed to skip the
    /// network, and it requires the cache file to exist.
    pub fn load(&self) -> Result<InMemoryCatalog, DeckGraphError> {
        let load_span = span!(
            Level::INFO,
            "load_catalog",
            path = %self.path.display(),
            policy = %self.policy
        );
        let _enter = load_span.enter();

        let cached = self.path.is_file();
        let catalog = match (self.policy, cached) {
            (FetchPolicy::CacheFirst, true) | (FetchPolicy::Offline, true) => {
                info!("Loading card catalog from local cache");
                self.read_cache()?
            }
            (FetchPolicy::Offline, false) => {
                return Err(DeckGraphError::CatalogUnavailable {
                    path: self.path.clone(),
                });
            }
            (FetchPolicy::CacheFirst, false) | (FetchPolicy::Refresh, _) => self.fetch_and_store()?,
        };

        info!(cards = catalog.len(), "Card catalog ready");
        Ok(catalog)
    }

    fn read_cache(&self) -> Result<InMemoryCatalog, DeckGraphError> {
        let content = fs::read_to_string(&self.path)?;
        let document: CatalogDocument = serde_json::from_str(&content).map_err(|e| {
            DeckGraphError::catalog_decode(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(InMemoryCatalog::from_document(document))
    }

    fn fetch_and_store(&self) -> Result<InMemoryCatalog, DeckGraphError> {
        debug!(source = %self.source.describe(), "Fetching card catalog");
        let value = self.source.fetch()?;
        let document: CatalogDocument = serde_json::from_value(value.clone())?;

        write_atomic(&self.path, &serde_json::to_vec_pretty(&value)?)?;
        debug!(path = %self.path.display(), "Card catalog cached");

        Ok(InMemoryCatalog::from_document(document))
    }
}

/// Write through a sibling temp file so a crash never leaves a torn cache
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DeckGraphError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
