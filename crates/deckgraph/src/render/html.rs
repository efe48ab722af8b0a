//! Standalone HTML page for interactive viewing
//!
//! The page embeds the export as JSON and draws it with vis-network on a
//! dark canvas. Tooltips are the HTML titles built by the graph stage. When
//! layout coordinates are present the nodes are pinned and physics starts
//! disabled; otherwise the viewer's own simulation places them.

use anyhow::Result;
use tracing::{info, span, Level};

use super::GraphExport;
use crate::core::{escape_html, Renderer, DEFAULT_TITLE};

const VIS_NETWORK_URL: &str = "https://unpkg.com/vis-network/standalone/umd/vis-network.min.js";

const TEMPLATE: &str = r##"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>__TITLE__</title>
<script src="__SCRIPT__"></script>
<style>
  html, body { margin: 0; background: #222222; color: #ffffff; font-family: sans-serif; }
  #graph { width: 100%; height: 800px; background: #222222; }
  #config { padding: 8px; }
</style>
</head>
<body>
<div id="graph"></div>
<div id="config"></div>
<script>
  const graph = __GRAPH__;
  const pinned = __PINNED__;
  function tooltip(html) {
    const element = document.createElement("div");
    element.innerHTML = html;
    return element;
  }
  const nodes = new vis.DataSet(graph.nodes.map(n => ({
    id: n.id,
    label: n.label,
    title: tooltip(n.title),
    size: n.size,
    color: n.color,
    x: n.x,
    y: n.y,
    fixed: pinned
  })));
  const edges = new vis.DataSet(graph.edges.map(e => ({
    from: e.source,
    to: e.target,
    value: e.weight,
    title: e.title,
    color: e.color
  })));
  const options = {
    nodes: { shape: "dot", font: { color: "#ffffff" } },
    edges: { smooth: false },
    physics: { enabled: !pinned },
    configure: { enabled: true, filter: "physics", container: document.getElementById("config") }
  };
  new vis.Network(document.getElementById("graph"), { nodes, edges }, options);
</script>
</body>
</html>
"##;

/// Renders a [`GraphExport`] as a self-contained HTML page
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    title: String,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer<GraphExport> for HtmlRenderer {
    type Output = String;

    fn render(&self, export: &GraphExport) -> Result<String> {
        let render_span = span!(
            Level::INFO,
            "render_html",
            node_count = export.node_count(),
            edge_count = export.edge_count()
        );
        let _enter = render_span.enter();

        // "</" inside the embedded JSON would close the script element
        let graph = serde_json::to_string(export)?.replace("</", "<\\/");
        let pinned = if export.has_positions() { "true" } else { "false" };

        let output = TEMPLATE
            .replace("__TITLE__", &escape_html(&self.title))
            .replace("__SCRIPT__", VIS_NETWORK_URL)
            .replace("__PINNED__", pinned)
            .replace("__GRAPH__", &graph);

        info!(output_len = output.len(), "HTML rendering completed");
        Ok(output)
    }

    fn name(&self) -> &'static str {
        "vis-network"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn format(&self) -> &'static str {
        "html"
    }
}
