//! JSON output
//!
//! The export is written as-is, so consumers see the same shape the HTML
//! page embeds.

use anyhow::Result;
use tracing::{info, span, Level};

use super::GraphExport;
use crate::core::Renderer;

/// Serializes a [`GraphExport`] as JSON
#[derive(Debug, Clone, Copy)]
pub struct JsonRenderer {
    pretty: bool,
}

impl JsonRenderer {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Single-line output
    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer<GraphExport> for JsonRenderer {
    type Output = String;

    fn render(&self, export: &GraphExport) -> Result<String> {
        let render_span = span!(
            Level::INFO,
            "render_json",
            node_count = export.node_count(),
            edge_count = export.edge_count()
        );
        let _enter = render_span.enter();

        let output = if self.pretty {
            serde_json::to_string_pretty(export)?
        } else {
            serde_json::to_string(export)?
        };
        info!(output_len = output.len(), "JSON rendering completed");
        Ok(output)
    }

    fn name(&self) -> &'static str {
        "json"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn format(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ExportEdge, ExportNode};

    fn export() -> GraphExport {
        let node = |id: &str| ExportNode {
            id: id.to_string(),
            label: id.to_string(),
            title: String::new(),
            size: 10.0,
            total: 1,
            color: None,
            community: None,
            x: None,
            y: None,
        };
        GraphExport {
            nodes: vec![node("1"), node("2")],
            edges: vec![ExportEdge {
                source: "1".to_string(),
                target: "2".to_string(),
                weight: 30,
                title: "Co-occurrence in decks: 30".to_string(),
                color: None,
            }],
            communities: None,
        }
    }

    #[test]
    fn test_pretty_output_parses_back() {
        let output = JsonRenderer::new().render(&export()).unwrap();
        assert!(output.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["edges"][0]["weight"], 30);
        assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_compact_output() {
        let output = JsonRenderer::compact().render(&export()).unwrap();
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_empty_export() {
        let output = JsonRenderer::new().render(&GraphExport::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(value["nodes"].as_array().unwrap().is_empty());
    }
}
