use super::model::CallGraph;

/// Line that opens the machine-readable part of a call-graph report.
pub const SECTION_MARKER: &str = "=== FUNCTION CALL GRAPH ===";

const ARROW: &str = "-->";
const ELIDED: &str = "...";

/// Parse `source --> target, target, ...` lines following [`SECTION_MARKER`].
///
/// Text before the marker is ignored and a missing marker yields an empty
/// graph. Lines without an arrow are skipped, as are target tokens that
/// contain `...` (the producer elided the rest of the list).
pub fn parse(text: &str) -> CallGraph {
	let mut graph = CallGraph::new();
	let Some(start) = text.find(SECTION_MARKER) else {
		log::debug!("Call-graph section marker not found");
		return graph;
	};

	for line in text[start + SECTION_MARKER.len()..].lines() {
		let Some((lhs, rhs)) = line.split_once(ARROW) else {
			continue;
		};
		let source = lhs.trim();
		if source.is_empty() {
			continue;
		}
		graph.add_node(source);

		for target in rhs.split(',').map(str::trim) {
			if target.is_empty() || target.contains(ELIDED) {
				continue;
			}
			graph.add_edge(source, target);
		}
	}

	log::debug!(
		"Parsed call graph: {} nodes, {} edges",
		graph.node_count(),
		graph.edge_count()
	);
	graph
}
