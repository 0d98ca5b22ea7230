use super::model::CallGraph;

const SAMPLE_EDGES: &[(&str, &str)] = &[
	("main.py::main", "config.py::load_config"),
	("main.py::main", "app.py::run"),
	("app.py::run", "app.py::handle_request"),
	("app.py::run", "db.py::connect"),
	("app.py::handle_request", "utils.py::format_response"),
];

/// Graph drawn when the host has no payload: six nodes, five edges.
pub fn sample_graph() -> CallGraph {
	let mut graph = CallGraph::new();
	for (source, target) in SAMPLE_EDGES {
		graph.add_edge(source, target);
	}
	graph
}
