use std::collections::HashMap;

/// A function in the call graph, identified by `file::function`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionNode {
	pub id: String,
	pub label: String,
}

/// A directed call from `source` to `target`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallEdge {
	pub source: String,
	pub target: String,
}

/// Nodes in first-seen order plus the edge list.
///
/// Every edge endpoint is a registered node: [`CallGraph::add_edge`]
/// registers both ends before recording the edge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallGraph {
	nodes: Vec<FunctionNode>,
	edges: Vec<CallEdge>,
	index: HashMap<String, usize>,
}

impl CallGraph {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register `id` with itself as label. Returns the existing index when
	/// the id was already seen.
	pub fn add_node(&mut self, id: &str) -> usize {
		self.add_labeled_node(id, id)
	}

	/// Register `id` with an explicit label; the first label wins.
	pub fn add_labeled_node(&mut self, id: &str, label: &str) -> usize {
		if let Some(&idx) = self.index.get(id) {
			return idx;
		}
		let idx = self.nodes.len();
		self.nodes.push(FunctionNode {
			id: id.to_string(),
			label: label.to_string(),
		});
		self.index.insert(id.to_string(), idx);
		idx
	}

	pub fn add_edge(&mut self, source: &str, target: &str) {
		self.add_node(source);
		self.add_node(target);
		self.edges.push(CallEdge {
			source: source.to_string(),
			target: target.to_string(),
		});
	}

	pub fn nodes(&self) -> &[FunctionNode] {
		&self.nodes
	}

	pub fn edges(&self) -> &[CallEdge] {
		&self.edges
	}

	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Edges as `(source_index, target_index)` pairs.
	pub fn edge_indices(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
		self.edges
			.iter()
			.filter_map(|e| Some((self.index_of(&e.source)?, self.index_of(&e.target)?)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn first_label_wins() {
		let mut graph = CallGraph::new();
		graph.add_labeled_node("a.py::f", "first");
		graph.add_labeled_node("a.py::f", "second");
		assert_eq!(graph.node_count(), 1);
		assert_eq!(graph.nodes()[0].label, "first");
	}

	#[test]
	fn edges_register_endpoints_and_keep_duplicates() {
		let mut graph = CallGraph::new();
		graph.add_edge("a", "b");
		graph.add_edge("a", "b");
		graph.add_edge("b", "b");
		assert_eq!(graph.node_count(), 2);
		assert_eq!(graph.edge_count(), 3);
		assert_eq!(
			graph.edge_indices().collect::<Vec<_>>(),
			vec![(0, 1), (0, 1), (1, 1)]
		);
	}
}
