//! Core renderer trait for graph output
//!
//! This trait defines the interface for turning an exported graph into an
//! output artifact (JSON, HTML, ...).

use anyhow::Result;

/// Core trait for renderers
///
/// Renderers are the presentation boundary of the pipeline. Failures are
/// returned to the caller as-is.
///
/// # Example
/// ```
/// use deckgraph::core::Renderer;
/// use deckgraph::render::{GraphExport, JsonRenderer};
///
/// let export = GraphExport::default();
/// let json = JsonRenderer::new().render(&export).unwrap();
/// assert!(json.contains("\"nodes\""));
/// ```
pub trait Renderer<T>: Send + Sync {
    /// The output type of this renderer
    type Output;

    /// Render the input into the output format
    fn render(&self, input: &T) -> Result<Self::Output>;

    /// Get the name of this renderer
    fn name(&self) -> &'static str;

    /// Get the version of this renderer
    fn version(&self) -> &'static str;

    /// Get the supported output format
    fn format(&self) -> &'static str;
}
