//! Output renderers
//!
//! Both renderers consume a [`GraphExport`]; the choice between them is
//! driven by [`OutputFormat`](crate::core::OutputFormat).

mod export;
mod html;
mod json;

pub use export::{community_color, ExportEdge, ExportNode, GraphExport, COMMUNITY_COLORS, CROSS_COMMUNITY_COLOR};
pub use html::HtmlRenderer;
pub use json::JsonRenderer;

use anyhow::Result;

use crate::core::{DeckGraphConfig, OutputFormat, Renderer};

/// Render an export in the configured format
pub fn render_export(export: &GraphExport, config: &DeckGraphConfig) -> Result<String> {
    match config.output_format {
        OutputFormat::Html => HtmlRenderer::new().with_title(&config.title).render(export),
        OutputFormat::Json => JsonRenderer::new().render(export),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_export_follows_config() {
        let mut config = DeckGraphConfig {
            title: "Regional top cut".to_string(),
            ..DeckGraphConfig::default()
        };
        let page = render_export(&GraphExport::default(), &config).unwrap();
        assert!(page.contains("<title>Regional top cut</title>"));

        config.output_format = OutputFormat::Json;
        let json = render_export(&GraphExport::default(), &config).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["nodes"], serde_json::json!([]));
    }
}
