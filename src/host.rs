//! Entry points for the page that embeds a graph view.
//!
//! A host either calls [`render_call_graph`] directly or posts one typed
//! message to the window, e.g.
//! `{"type": "renderGraph", "text": "=== FUNCTION CALL GRAPH ===\n..."}`.

use serde::Deserialize;
use wasm_bindgen::prelude::*;

use crate::config::GraphConfig;
use crate::error::MessageError;
use crate::graph::{CallGraph, graph_from_payload, sample_graph};
use crate::{RenderHandle, render};

/// A message posted by the host page.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostMessage {
	RenderGraph {
		#[serde(default)]
		text: Option<String>,
		#[serde(default, rename = "graphData")]
		graph_data: Option<WireGraph>,
	},
	/// The host found no call-graph file.
	NoData,
}

/// Prebuilt graph in the `{nodes, links}` shape.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct WireGraph {
	pub nodes: Vec<WireNode>,
	#[serde(default)]
	pub links: Vec<WireLink>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct WireNode {
	pub id: String,
	#[serde(default)]
	pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct WireLink {
	pub source: String,
	pub target: String,
}

impl HostMessage {
	pub fn from_json(json: &str) -> Result<Self, MessageError> {
		Ok(serde_json::from_str(json)?)
	}

	/// The graph this message asks for. Prebuilt data wins over text.
	pub fn into_graph(self) -> CallGraph {
		match self {
			Self::RenderGraph {
				graph_data: Some(data),
				..
			} => data.into_graph(),
			Self::RenderGraph { text, .. } => graph_from_payload(text.as_deref()),
			Self::NoData => sample_graph(),
		}
	}
}

impl WireGraph {
	pub fn into_graph(self) -> CallGraph {
		let mut graph = CallGraph::new();
		for node in &self.nodes {
			graph.add_labeled_node(&node.id, node.label.as_deref().unwrap_or(&node.id));
		}
		for link in &self.links {
			graph.add_edge(&link.source, &link.target);
		}
		graph
	}
}

/// A mounted graph view, as seen from JavaScript.
#[wasm_bindgen]
pub struct GraphView {
	handle: Option<RenderHandle>,
}

#[wasm_bindgen]
impl GraphView {
	/// Stop the simulation, detach listeners and remove the view.
	pub fn teardown(&mut self) {
		if let Some(handle) = self.handle.take() {
			handle.teardown();
		}
	}
}

/// Parse `text` and render it into the element with id `mount_id`.
///
/// Missing text draws the sample graph. `config_json` may override any
/// subset of [`GraphConfig`].
#[wasm_bindgen]
pub fn render_call_graph(
	mount_id: &str,
	text: Option<String>,
	config_json: Option<String>,
) -> Result<GraphView, JsValue> {
	let config = parse_config(config_json.as_deref()).map_err(|err| JsValue::from_str(&err))?;
	let graph = graph_from_payload(text.as_deref());
	let handle = render(mount_id, Some(graph), config).map_err(|err| JsValue::from_str(&err.to_string()))?;
	Ok(GraphView {
		handle: Some(handle),
	})
}

/// Decode and check a partial config; `None` gives the defaults.
fn parse_config(json: Option<&str>) -> Result<GraphConfig, String> {
	let Some(json) = json else {
		return Ok(GraphConfig::default());
	};
	let config = serde_json::from_str::<GraphConfig>(json)
		.map_err(|err| format!("invalid graph config: {err}"))?;
	config.validate().map_err(|err| err.to_string())?;
	Ok(config)
}
