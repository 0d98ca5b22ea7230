//! Call-graph data model, text parser and size governance.

mod limit;
mod model;
mod parser;
mod sample;

pub use limit::{LimitReport, limit_graph};
pub use model::{CallEdge, CallGraph, FunctionNode};
pub use parser::{SECTION_MARKER, parse};
pub use sample::sample_graph;

/// Resolve a host payload into a graph.
///
/// Absent or blank text means the host had nothing to show, so the fixed
/// sample graph is drawn instead of failing.
pub fn graph_from_payload(text: Option<&str>) -> CallGraph {
	match text {
		Some(text) if !text.trim().is_empty() => parse(text),
		_ => {
			log::info!("No call-graph payload available, using sample graph");
			sample_graph()
		}
	}
}
